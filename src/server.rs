use crate::config::{parse_language_list, Config};
use crate::engines::{BackendInfo, OcrBackendKind, OcrOptions};
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, PipelineRequest, PipelineResult};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<Config>,
}

/// Pipeline response
#[derive(Serialize)]
pub struct PipelineResponse {
    pub text_path: PathBuf,
    pub json_path: PathBuf,
    pub result: PipelineResult,
    pub processing_time_ms: u64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub default_engine: String,
    pub engines: Vec<BackendInfo>,
    pub max_file_size_bytes: usize,
    pub tesseract_lang: String,
    pub deep_languages: Vec<String>,
    pub output_dir: PathBuf,
}

/// Build the router over an existing pipeline
pub fn router(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;

    Router::new()
        .route("/pipeline", post(handle_pipeline))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(&config)?;
    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Handle pipeline requests
async fn handle_pipeline(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PipelineResponse>, PipelineError> {
    let start = Instant::now();

    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut engine: Option<String> = None;
    let mut languages: Option<String> = None;
    let mut run_nlp = state.config.run_nlp;

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PipelineError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                content_type = field.content_type().map(|s| s.to_string());
                file_name = field.file_name().map(|s| s.to_string());
                file_data = Some(field.bytes().await.map_err(|e| {
                    PipelineError::InvalidRequest(format!("Failed to read file data: {}", e))
                })?);
            }
            "engine" => engine = Some(read_text(field).await?),
            "languages" => languages = Some(read_text(field).await?),
            "nlp" => run_nlp = parse_flag(&read_text(field).await?)?,
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let data = file_data.ok_or(PipelineError::MissingFile)?;
    if data.len() > state.config.max_file_size {
        return Err(PipelineError::ImageTooLarge {
            size: data.len(),
            max: state.config.max_file_size,
        });
    }

    let engine = engine.unwrap_or_else(|| state.config.default_engine.as_str().to_string());
    let kind = OcrBackendKind::parse(&engine)?;
    let ocr = languages_for(kind, languages.as_deref(), &state.config);

    // Keep the client's file name so artifacts are named after it
    let upload_dir = tempfile::tempdir()?;
    let upload_path =
        upload_dir
            .path()
            .join(upload_file_name(file_name.as_deref(), content_type.as_deref()));
    tokio::fs::write(&upload_path, &data).await?;

    let request = PipelineRequest::new(upload_path.to_string_lossy().to_string())
        .engine(engine)
        .options(ocr)
        .nlp(run_nlp);

    let pipeline = Arc::clone(&state.pipeline);
    let output = tokio::task::spawn_blocking(move || pipeline.run(&request))
        .await
        .map_err(|e| PipelineError::ProcessingError(format!("Pipeline task failed: {}", e)))??;
    drop(upload_dir);

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Pipeline request completed in {}ms, text length: {}",
        processing_time_ms,
        output.result.text.len()
    );

    Ok(Json(PipelineResponse {
        text_path: output.text_path,
        json_path: output.json_path,
        result: output.result,
        processing_time_ms,
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, PipelineError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| PipelineError::InvalidRequest(format!("Invalid {}: {}", name, e)))
}

fn parse_flag(value: &str) -> Result<bool, PipelineError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(PipelineError::InvalidRequest(format!(
            "nlp must be true or false, got '{}'",
            other
        ))),
    }
}

/// Language hints for the chosen backend, falling back to configured defaults
fn languages_for(kind: OcrBackendKind, languages: Option<&str>, config: &Config) -> OcrOptions {
    let mut options = OcrOptions::from(config);
    match (kind, languages.map(str::trim).filter(|l| !l.is_empty())) {
        (OcrBackendKind::Classical, Some(lang)) => options.tesseract_lang = lang.to_string(),
        (OcrBackendKind::Deep, Some(langs)) => options.deep_languages = parse_language_list(langs),
        (_, None) => {}
    }
    options
}

/// A safe local file name for an upload
fn upload_file_name(file_name: Option<&str>, content_type: Option<&str>) -> String {
    let sanitized = file_name
        .and_then(|name| std::path::Path::new(name).file_name())
        .map(|name| {
            name.to_string_lossy()
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .filter(|name| !name.trim_matches('.').is_empty());

    sanitized.unwrap_or_else(|| {
        let extension = match content_type.unwrap_or_default() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/bmp" => "bmp",
            "image/webp" => "webp",
            "image/tiff" => "tiff",
            _ => "img",
        };
        format!("upload.{}", extension)
    })
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        default_engine: state.config.default_engine.as_str().to_string(),
        engines: state.pipeline.selector().info(),
        max_file_size_bytes: state.config.max_file_size,
        tesseract_lang: state.config.tesseract_lang.clone(),
        deep_languages: state.config.deep_languages.clone(),
        output_dir: state.pipeline.output_dir().to_path_buf(),
    })
}
