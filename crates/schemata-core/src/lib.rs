//! # schemata-core
//!
//! Core types, traits, and abstractions for the schemata content-type catalog.
//!
//! This crate provides the domain records (content types, fields, workflow
//! schemes, system-action mappings), the paging request/response shapes, the
//! error taxonomy, and the collaborator traits that storage backends and the
//! pagination layer share.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
