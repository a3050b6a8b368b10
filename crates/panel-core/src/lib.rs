//! `panel-core`: configuration, identifiers and persisted records shared by
//! every panel crate.

pub mod config;
pub mod error;
pub mod types;

pub use error::{PanelError, Result};
