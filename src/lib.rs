// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod countdown;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod navigation;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod time_series;
pub mod words;
