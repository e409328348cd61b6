//! Core types, configuration, and error handling for projmap.
//!
//! This crate provides the shared foundation used by the scanner and the CLI:
//! - [`ProjmapError`]: unified error type using `thiserror` and `miette`
//! - [`ProjmapConfig`]: configuration loaded from `.projmap.toml`
//! - The project map model: [`ProjectMap`], [`FileEntities`], [`ClassEntity`]

mod config;
mod error;
mod types;

pub use config::{ProjmapConfig, ScanConfig};
pub use error::ProjmapError;
pub use types::{ClassEntity, FileEntities, Language, ParseFailure, ProjectMap};

/// A convenience `Result` type for projmap operations.
pub type Result<T> = std::result::Result<T, ProjmapError>;
