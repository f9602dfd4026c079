//! Vidhost Processing Library
//!
//! External-tool invocation for the upload pipeline: the media inspector
//! (`ffprobe`) that extracts stream geometry and classifies aspect ratio,
//! and the container rewriter (`ffmpeg`) that relocates index metadata to
//! the front of the file for progressive playback.
//!
//! Both tools sit behind narrow traits so orchestration logic can be
//! exercised with fake implementations.

pub mod probe;
pub mod rewrite;

pub use probe::{AspectClass, FfprobeInspector, MediaInspector, VideoGeometry};
pub use rewrite::{ContainerRewriter, FfmpegRewriter, ProcessedFile};
