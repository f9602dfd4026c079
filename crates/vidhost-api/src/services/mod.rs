pub mod playback;
pub mod thumbnails;
pub mod upload;
