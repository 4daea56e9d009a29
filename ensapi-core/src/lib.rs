//! # ENS API Core
//!
//! Core types, errors, and traits for the ENS identity API.
//!
//! This crate provides the building blocks shared by the other workspace crates:
//!
//! - **Types**: the [`ResolutionResult`] output record, the classified [`Query`]
//!   and the [`Network`] selector
//! - **Errors**: upstream failure taxonomy
//! - **Constants**: contract addresses, record keys, gateway URLs
//! - **Traits**: capability interfaces for the ENS resolver and the domain index
//!
//! ## Example
//!
//! ```rust
//! use ensapi_core::{Query, QueryKind};
//!
//! let query = Query::parse("Vitalik.ETH");
//! assert_eq!(query.kind(), QueryKind::Name);
//! assert_eq!(query.normalized(), "vitalik.eth");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{EnsApiError, Result};
pub use traits::*;
pub use types::*;
