//! # Memoboard Core
//!
//! Core types, domain entities, and error definitions for Memoboard.
//! Every other crate in the workspace builds on the abstractions defined here.

pub mod domain;
pub mod error;
pub mod id;
pub mod pagination;
pub mod result;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use pagination::*;
pub use result::*;
pub use validation::*;
