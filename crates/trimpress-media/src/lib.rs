// crates/trimpress-media/src/lib.rs
//
// FFmpeg-backed implementations of the two trimpress-core contracts.
// No egui dependency: results reach trimpress-ui through channels only.
//
//   MediaWorker — MediaEngine: probe in-process, trim/compress via the CLI.
//   FramePlayer — PlaybackSurface: wall-clock transport plus decode threads.

pub mod cli;
pub mod decode;
pub mod paths;
pub mod player;
pub mod probe;
pub mod worker;

pub use player::FramePlayer;
pub use worker::MediaWorker;
pub use trimpress_core::media_types::{MediaResult, PlaybackFrame};
