pub mod assets;
pub mod media_delete;
pub mod thumbnail_upload;
pub mod video_upload;
pub mod videos;
