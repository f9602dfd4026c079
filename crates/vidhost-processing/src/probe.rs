//! Media inspector - stream geometry extraction and aspect classification.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

use vidhost_core::AppError;

/// Width and height of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoGeometry {
    pub width: u64,
    pub height: u64,
}

/// Closed set of aspect-ratio buckets used to namespace storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectClass {
    Wide,
    Tall,
    Other,
}

impl AspectClass {
    /// Key namespace prefix for this bucket.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Wide => "wide",
            AspectClass::Tall => "tall",
            AspectClass::Other => "other",
        }
    }

    /// Classify stream geometry into a bucket.
    ///
    /// Ratio = width/height; "wide" for [1.77, 1.79], "tall" for
    /// [0.55, 0.57], "other" for everything else including zero-valued
    /// dimensions. Never fails.
    pub fn classify(geometry: VideoGeometry) -> AspectClass {
        if geometry.width == 0 || geometry.height == 0 {
            return AspectClass::Other;
        }

        let ratio = geometry.width as f64 / geometry.height as f64;

        if (1.77..=1.79).contains(&ratio) {
            AspectClass::Wide
        } else if (0.55..=0.57).contains(&ratio) {
            AspectClass::Tall
        } else {
            AspectClass::Other
        }
    }
}

/// Extracts stream geometry from a video file.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    /// Probe the file at `path`. Tool failure or unparseable output is
    /// `InspectionFailed`; a file with no video streams probes successfully
    /// with zeroed geometry (classified "other" downstream).
    async fn probe(&self, path: &Path) -> Result<VideoGeometry, AppError>;
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    #[serde(default)]
    width: u64,
    #[serde(default)]
    height: u64,
}

/// Geometry of the first stream, zeroed when no streams are present.
fn parse_probe_output(stdout: &[u8]) -> Result<VideoGeometry, AppError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| AppError::InspectionFailed(format!("Unparseable probe output: {}", e)))?;

    Ok(probe
        .streams
        .first()
        .map(|s| VideoGeometry {
            width: s.width,
            height: s.height,
        })
        .unwrap_or_default())
}

/// `ffprobe`-backed inspector.
pub struct FfprobeInspector {
    ffprobe_path: String,
}

impl FfprobeInspector {
    pub fn new(ffprobe_path: String) -> Self {
        Self { ffprobe_path }
    }
}

#[async_trait]
impl MediaInspector for FfprobeInspector {
    async fn probe(&self, path: &Path) -> Result<VideoGeometry, AppError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .output()
            .await
            .map_err(|e| AppError::InspectionFailed(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(AppError::InspectionFailed(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let geometry = parse_probe_output(&output.stdout)?;

        tracing::info!(
            path = %path.display(),
            width = geometry.width,
            height = geometry.height,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video probe completed"
        );

        Ok(geometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_wide() {
        let class = AspectClass::classify(VideoGeometry {
            width: 1920,
            height: 1080,
        });
        assert_eq!(class, AspectClass::Wide);
        assert_eq!(class.prefix(), "wide");
    }

    #[test]
    fn test_classify_tall() {
        let class = AspectClass::classify(VideoGeometry {
            width: 1080,
            height: 1920,
        });
        assert_eq!(class, AspectClass::Tall);
        assert_eq!(class.prefix(), "tall");
    }

    #[test]
    fn test_classify_square_is_other() {
        let class = AspectClass::classify(VideoGeometry {
            width: 1,
            height: 1,
        });
        assert_eq!(class, AspectClass::Other);
    }

    #[test]
    fn test_classify_zero_dimensions_is_other() {
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 0,
                height: 1080
            }),
            AspectClass::Other
        );
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 1920,
                height: 0
            }),
            AspectClass::Other
        );
    }

    #[test]
    fn test_classify_ratio_boundaries() {
        // 1.77 and 1.79 are inclusive bounds
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 177,
                height: 100
            }),
            AspectClass::Wide
        );
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 179,
                height: 100
            }),
            AspectClass::Wide
        );
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 180,
                height: 100
            }),
            AspectClass::Other
        );
        assert_eq!(
            AspectClass::classify(VideoGeometry {
                width: 56,
                height: 100
            }),
            AspectClass::Tall
        );
    }

    #[test]
    fn test_parse_probe_output_first_stream() {
        let json = br#"{"streams":[{"width":1920,"height":1080},{"width":640,"height":480}]}"#;
        let geometry = parse_probe_output(json).unwrap();
        assert_eq!(
            geometry,
            VideoGeometry {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn test_parse_probe_output_empty_streams() {
        let geometry = parse_probe_output(br#"{"streams":[]}"#).unwrap();
        assert_eq!(geometry, VideoGeometry::default());
        assert_eq!(AspectClass::classify(geometry), AspectClass::Other);
    }

    #[test]
    fn test_parse_probe_output_missing_streams_key() {
        let geometry = parse_probe_output(br#"{}"#).unwrap();
        assert_eq!(geometry, VideoGeometry::default());
    }

    #[test]
    fn test_parse_probe_output_audio_only_stream() {
        // Audio streams carry no width/height fields
        let geometry = parse_probe_output(br#"{"streams":[{"codec_type":"audio"}]}"#).unwrap();
        assert_eq!(geometry, VideoGeometry::default());
    }

    #[test]
    fn test_parse_probe_output_malformed_is_inspection_failed() {
        let err = parse_probe_output(b"not json").unwrap_err();
        assert!(matches!(err, AppError::InspectionFailed(_)));
    }
}
