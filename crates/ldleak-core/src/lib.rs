//! ldleak Core
//!
//! Core types shared by the ldleak pipeline: the data model handed from the
//! header index to the selector, parser and shim generator, the error
//! taxonomy, and configuration.

pub mod config;
pub mod error;
pub mod location;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use location::Location;
pub use types::*;
