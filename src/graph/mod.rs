//! Subgraph Builder Module
//!
//! Turns the global adjacency and partition datasets into the slice of the
//! graph one instance is responsible for.
//!
//! ## Architecture Overview
//! The datasets are plain text: the adjacency file has one line per vertex
//! (1-based) listing its outgoing neighbors, and the partition file has one
//! owning ordinal per line. From those plus this instance's uid the builder
//! derives:
//! 1. **Owned vertices**: the vertices this instance is authoritative for.
//! 2. **Contributors**: for each owned vertex, the vertices with an edge into
//!    it, together with their out-degrees (for the `value(c)/outdegree(c)`
//!    contribution formula).
//! 3. **Boundary vertices**: contributors owned by other instances, whose
//!    values arrive over the relay instead of being computed locally.
//! 4. **Routing**: which peer ordinals need each owned vertex's updates, and
//!    the inverse map used to assemble one message per destination.
//!
//! A vertex with no outgoing edges is modeled as a self-loop (out-degree 1)
//! to avoid division by zero and rank leakage.

pub mod builder;
pub mod types;

#[cfg(test)]
mod tests;
