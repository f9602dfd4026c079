//! Container rewriter - faststart remux for progressive playback.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use vidhost_core::AppError;

const PROCESSING_SUFFIX: &str = ".processing";

/// Rewriter output with guaranteed deletion.
///
/// Holds the path of the rewritten file and removes it on drop, so the file
/// is gone on every exit path regardless of downstream success or failure.
#[derive(Debug)]
pub struct ProcessedFile {
    path: PathBuf,
}

impl ProcessedFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ProcessedFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to remove processed file"
                );
            }
        }
    }
}

/// Rewrites a video container without re-encoding, producing a new file.
/// The input is never mutated or deleted.
#[async_trait]
pub trait ContainerRewriter: Send + Sync {
    /// Rewrite the file at `input`, returning the output file wrapped in a
    /// deletion guard. Tool failure is `ProcessingFailed`; any partial
    /// output is cleaned up before returning the error.
    async fn rewrite(&self, input: &Path) -> Result<ProcessedFile, AppError>;
}

/// `ffmpeg`-backed rewriter: copies all streams and relocates the moov atom
/// to the front of the file so playback can begin before the full download.
pub struct FfmpegRewriter {
    ffmpeg_path: String,
}

impl FfmpegRewriter {
    pub fn new(ffmpeg_path: String) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl ContainerRewriter for FfmpegRewriter {
    async fn rewrite(&self, input: &Path) -> Result<ProcessedFile, AppError> {
        let mut output_path = input.as_os_str().to_owned();
        output_path.push(PROCESSING_SUFFIX);
        let output_path = PathBuf::from(output_path);

        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| AppError::ProcessingFailed(format!("Failed to execute ffmpeg: {}", e)))?;

        // Guard the output from here on so partial files are cleaned up too.
        let processed = ProcessedFile::new(output_path);

        if !output.status.success() {
            return Err(AppError::ProcessingFailed(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        if !processed.path().exists() {
            return Err(AppError::ProcessingFailed(
                "ffmpeg reported success but produced no output file".to_string(),
            ));
        }

        tracing::info!(
            input = %input.display(),
            output = %processed.path().display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Container rewrite completed"
        );

        Ok(processed)
    }
}
