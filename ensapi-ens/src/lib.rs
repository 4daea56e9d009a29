//! # ENS Identity Resolution
//!
//! ENS lookups over Ethereum JSON-RPC and the best-effort merge that turns a
//! name or address into one [`ResolutionResult`](ensapi_core::ResolutionResult).

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
pub mod contenthash;
mod ens;
mod resolver;

pub use ens::{EnsClient, EnsConfig};
pub use resolver::{IdentityResolver, ResolveOptions, ResolverConfig};
