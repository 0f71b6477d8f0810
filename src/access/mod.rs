//! Access control for repository operations.

mod access_control;

pub use access_control::{authorize, require, Access, Operation};
