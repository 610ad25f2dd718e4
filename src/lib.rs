// Library surface: the race engine, usable without a terminal.
// Rendering and CLI wiring live in the binary.
pub mod app_dirs;
pub mod config;
pub mod content;
pub mod error;
pub mod filter;
pub mod history;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod trend;
