//! Slidereel Core - MP4 slideshows from still images using the FFmpeg CLI
//!
//! This library plans and runs a single FFmpeg invocation that turns a folder
//! of JPEG images into a video, including:
//! - Scaling and letterboxing every image to 1920x1080
//! - Ken Burns pan/zoom motion from a fixed catalog of trajectories
//! - Chained crossfades between consecutive images
//! - A concat-demuxer path for hard cuts when fades are disabled
//! - Progress reporting relayed from the running encoder

pub mod assets;
pub mod concat;
pub mod config;
pub mod crossfade;
pub mod effects;
pub mod error;
pub mod ffmpeg_wrapper;
pub mod graph;
pub mod image_stage;
pub mod slideshow;

// Re-export commonly used types at the crate root
pub use assets::ImageSequence;
pub use concat::{ConcatManifest, build_concat_manifest};
pub use config::RenderConfig;
pub use crossfade::{CrossfadeChain, build_crossfade_graph, build_single_image_graph};
pub use effects::{KenBurnsTrajectory, select_trajectory};
pub use error::{Result, SlideshowError};
pub use ffmpeg_wrapper::{FFmpegCommand, Progress};
pub use graph::{FilterGraph, FilterStage, StreamLabel};
pub use image_stage::build_image_stage;
pub use slideshow::{RenderMode, RenderPlan, Slideshow};
