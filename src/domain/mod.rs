pub mod video;

pub use video::{ExploreBatch, VideoLink, VideoMetadata};
