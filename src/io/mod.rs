/// Command line interface and file processing
pub mod cli;
/// Algorithm constants and defaults
pub mod configuration;
/// Error types and context helpers
pub mod error;
/// PNG slice loading and export
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Progress display for generation runs
pub mod progress;
/// Rule file persistence
pub mod store;
