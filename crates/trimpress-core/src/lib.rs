// crates/trimpress-core/src/lib.rs
//
// Pure state for TrimPress: the Session and its range invariant, the
// TrimController state machine, and the contracts it drives. Nothing here
// links FFmpeg or egui.

pub mod commands;
pub mod controller;
pub mod engine;
pub mod error;
pub mod helpers;
pub mod media_types;
pub mod notice;
pub mod settings;
pub mod state;
