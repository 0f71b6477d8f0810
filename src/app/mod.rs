//! Application-level entry point.

#[allow(clippy::module_inception)]
mod app;

pub use app::{App, AppError, Result};
