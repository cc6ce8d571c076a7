//! Model and tessdata downloads into the user cache directory.

use crate::error::PipelineError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Root of snaptext's cache (models, tessdata)
pub fn cache_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("snaptext")
}

/// Download a file from URL to path using ureq.
///
/// The body is written to a `.part` sibling first so an interrupted download
/// never leaves a truncated file under the final name.
pub fn download_file(url: &str, path: &Path) -> Result<(), PipelineError> {
    let response = ureq::get(url).call().map_err(|e| {
        PipelineError::InitializationError(format!("Failed to download {}: {}", url, e))
    })?;

    let buffer = response.into_body().read_to_vec().map_err(|e| {
        PipelineError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let partial = path.with_extension("part");
    let mut file = File::create(&partial).map_err(|e| {
        PipelineError::InitializationError(format!("Failed to create {:?}: {}", partial, e))
    })?;
    file.write_all(&buffer).map_err(|e| {
        PipelineError::InitializationError(format!("Failed to write {:?}: {}", partial, e))
    })?;
    std::fs::rename(&partial, path)?;

    Ok(())
}

/// Ensure `filename` exists under the cache root, downloading it from `url` if not
pub fn ensure_downloaded(url: &str, filename: &str) -> Result<PathBuf, PipelineError> {
    let cache_dir = cache_root();
    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        PipelineError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let target = cache_dir.join(filename);
    if !target.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &target)?;
        tracing::info!("Downloaded {} to {:?}", filename, target);
    } else {
        tracing::info!("Using cached {:?}", target);
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_root_is_namespaced() {
        assert!(cache_root().ends_with("snaptext"));
    }
}
