//! Configuration module for caltable
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution for the table files
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::CaltablePaths;
pub use settings::Settings;
