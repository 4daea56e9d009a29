//! GraphQL client for the ENS subgraph.
//!
//! Lists the domains owned by an address, one endpoint per network.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod subgraph;

pub use subgraph::{SubgraphClient, SubgraphConfig};
