//! Domain types for the ENS identity API.
//!
//! - [`Query`]: a raw path segment, normalized and classified once
//! - [`ResolutionResult`]: the merged record returned by `/ens/resolve`
//! - [`Network`]: which chain's domain index to consult

mod address;
mod network;
mod profile;
mod query;

pub use address::*;
pub use network::*;
pub use profile::*;
pub use query::*;
