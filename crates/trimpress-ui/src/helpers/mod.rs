// crates/trimpress-ui/src/helpers/mod.rs
//
// UI-only helpers. Anything without an egui or display meaning belongs in
// trimpress_core::helpers instead.

pub mod format;
pub mod log;
