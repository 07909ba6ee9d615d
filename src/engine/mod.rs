//! Round Engine Module
//!
//! Drives the round-synchronized PageRank computation for one instance.
//!
//! ## Architecture Overview
//! Each round walks a fixed state sequence:
//! 1. **COMPUTING**: recompute every owned vertex from the previous round's
//!    vector (`new[v] = sum of value(c) / outdegree(c)` over contributors).
//! 2. **SENDING**: hand one update message per destination peer to the
//!    outbound local channel. The engine never touches the network itself.
//! 3. **AWAITING**: block on the inbound local channel until every boundary
//!    vertex has a value for the current round. Messages for future rounds
//!    are buffered by round number, because peers are scheduled independently
//!    and may legitimately run ahead of the local barrier.
//! 4. **MERGED**: adopt the new vector wholesale and advance the round.
//!
//! Stale or malformed arrivals are protocol violations: logged, counted, and
//! dropped so one misbehaving peer cannot deadlock an instance whose other
//! expected arrivals still complete.

pub mod engine;
pub mod types;
