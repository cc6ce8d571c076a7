use clap::{Args, Parser, Subcommand};
use snaptext::config::{
    parse_language_list, Config, DEFAULT_KEYWORD_COUNT, DEFAULT_SUMMARY_SENTENCES,
};
use snaptext::engines::{OcrBackendKind, OcrOptions};
use snaptext::pipeline::{Pipeline, PipelineRequest};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "snaptext")]
#[command(about = "Extract, summarize and tag the text in screenshots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline on one image and write the artifacts
    Run {
        /// Image to read
        #[arg(long)]
        image: String,

        /// OCR engine: "tesseract" or "easyocr"
        #[arg(long = "ocr", env = "SNAPTEXT_ENGINE", default_value = "tesseract")]
        engine: String,

        /// Skip language detection, summary, entities and keywords
        #[arg(long)]
        no_nlp: bool,
    },
    /// Serve the pipeline over HTTP
    Serve {
        /// Host address to bind to
        #[arg(long, env = "SNAPTEXT_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, env = "SNAPTEXT_PORT", default_value = "9393")]
        port: u16,

        /// Maximum upload size in bytes (default: 20MB)
        #[arg(long, env = "SNAPTEXT_MAX_FILE_SIZE", default_value = "20971520")]
        max_file_size: usize,

        /// Engine used when a request doesn't name one
        #[arg(long, env = "SNAPTEXT_ENGINE", default_value = "tesseract")]
        default_engine: String,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory receiving the .txt and .json artifacts
    #[arg(long, env = "SNAPTEXT_OUTPUT_DIR", default_value = "outputs", global = true)]
    output_dir: PathBuf,

    /// Tesseract language (e.g. "eng", "eng+deu")
    #[arg(long, env = "SNAPTEXT_TESS_LANG", default_value = "eng", global = true)]
    tess_lang: String,

    /// Comma separated language hints for the deep reader
    #[arg(long, env = "SNAPTEXT_EASY_LANGS", default_value = "en", global = true)]
    easy_langs: String,

    /// Sentences kept in the summary
    #[arg(long, env = "SNAPTEXT_SUMMARY_SENTENCES", default_value_t = DEFAULT_SUMMARY_SENTENCES, global = true)]
    summary_sentences: usize,

    /// Keywords returned per document
    #[arg(long, env = "SNAPTEXT_KEYWORDS", default_value_t = DEFAULT_KEYWORD_COUNT, global = true)]
    keywords: usize,

    /// Tesseract executable used without the in-process engine
    #[arg(long, env = "SNAPTEXT_TESSERACT_CMD", default_value = "tesseract", global = true)]
    tesseract_cmd: String,

    /// Path to tessdata directory (uses TESSDATA_PREFIX env var if not set)
    #[arg(long, env = "TESSDATA_PREFIX", global = true)]
    tessdata_path: Option<String>,
}

impl From<&CommonArgs> for Config {
    fn from(args: &CommonArgs) -> Self {
        Self {
            output_dir: args.output_dir.clone(),
            tesseract_lang: args.tess_lang.clone(),
            deep_languages: parse_language_list(&args.easy_langs),
            summary_sentences: args.summary_sentences,
            keyword_count: args.keywords,
            tesseract_cmd: args.tesseract_cmd.clone(),
            tessdata_path: args.tessdata_path.clone(),
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from(&cli.common);

    match cli.command {
        Command::Run {
            image,
            engine,
            no_nlp,
        } => {
            config.run_nlp = !no_nlp;
            let request = PipelineRequest::new(image)
                .engine(engine)
                .options(OcrOptions::from(&config))
                .nlp(config.run_nlp);

            let pipeline = Pipeline::from_config(&config)?;
            let output = tokio::task::spawn_blocking(move || pipeline.run(&request)).await??;

            println!("Saved: {}", output.text_path.display());
            println!("Saved: {}", output.json_path.display());
            Ok(())
        }
        Command::Serve {
            host,
            port,
            max_file_size,
            default_engine,
        } => {
            config.host = host;
            config.port = port;
            config.max_file_size = max_file_size;
            config.default_engine = OcrBackendKind::parse(&default_engine)?;

            tracing::info!("Starting snaptext v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Binding to {}:{}", config.host, config.port);

            snaptext::server::run(config).await
        }
    }
}
