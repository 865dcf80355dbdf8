//! biblio Application Library
//!
//! This library provides the domain modules of the biblio book catalog service.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
