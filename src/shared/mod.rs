//! Shared settings between a settings writer and detection workers
//!
//! The settings side is the only writer; workers snapshot the config at the
//! start of each pass so a value never changes mid-pass.

pub mod state;

pub use state::SharedSettings;
