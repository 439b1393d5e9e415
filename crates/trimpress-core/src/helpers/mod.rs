// crates/trimpress-core/src/helpers/mod.rs

pub mod clock;
pub mod encode_params;
pub mod paths;
pub mod time;
