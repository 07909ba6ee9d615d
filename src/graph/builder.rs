//! Dataset parsing and subgraph derivation.
//!
//! Input formats match the published datasets: the adjacency file has one
//! line per vertex (1-based) with space-separated outgoing neighbor ids and
//! an empty line standing for an implicit self-loop; the optional reverse
//! file lists incoming neighbors instead (empty line = no incoming edges);
//! the partition file has one owning ordinal per line. Any malformed line is
//! a fatal configuration error, never retried.

use super::types::{PeerUid, Subgraph, VertexId};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Parses the forward adjacency dataset.
///
/// An empty (or whitespace-only) line for vertex `v` yields the implicit
/// self-loop `[v]`, so every vertex has out-degree >= 1.
pub fn parse_adjacency(text: &str) -> Result<Vec<Vec<VertexId>>> {
    let lines: Vec<&str> = text.lines().collect();
    let vertex_count = lines.len();
    let mut adjacency = Vec::with_capacity(vertex_count);

    for (idx, line) in lines.iter().enumerate() {
        let vertex = (idx + 1) as VertexId;
        let line = line.trim();
        if line.is_empty() {
            adjacency.push(vec![vertex]);
            continue;
        }
        adjacency.push(parse_id_line(line, idx + 1, vertex_count, "adjacency")?);
    }

    Ok(adjacency)
}

/// Parses an explicit reverse-adjacency dataset.
///
/// Unlike the forward file, an empty line means "no incoming edges" rather
/// than a self-loop; self-loops are reconciled during [`build_subgraph`].
pub fn parse_reverse(text: &str) -> Result<Vec<Vec<VertexId>>> {
    let lines: Vec<&str> = text.lines().collect();
    let vertex_count = lines.len();
    let mut reverse = Vec::with_capacity(vertex_count);

    for (idx, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            reverse.push(Vec::new());
            continue;
        }
        reverse.push(parse_id_line(line, idx + 1, vertex_count, "reverse adjacency")?);
    }

    Ok(reverse)
}

/// Parses the partition dataset: one owning ordinal (1..N) per vertex line.
pub fn parse_partition(text: &str) -> Result<Vec<PeerUid>> {
    let mut partition = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let owner: PeerUid = line.trim().parse().map_err(|_| {
            Error::Configuration(format!(
                "partition line {}: invalid ordinal {:?}",
                idx + 1,
                line.trim()
            ))
        })?;
        if owner == 0 {
            return Err(Error::Configuration(format!(
                "partition line {}: ordinals are 1-based, got 0",
                idx + 1
            )));
        }
        partition.push(owner);
    }

    Ok(partition)
}

/// Derives the reverse adjacency from the forward lists.
///
/// Implicit self-loops are already present in the forward lists, so they
/// carry over: a dangling vertex ends up contributing to itself.
pub fn derive_reverse(adjacency: &[Vec<VertexId>]) -> Vec<Vec<VertexId>> {
    let mut reverse = vec![Vec::new(); adjacency.len()];
    for (idx, neighbors) in adjacency.iter().enumerate() {
        let source = (idx + 1) as VertexId;
        for &dst in neighbors {
            reverse[(dst - 1) as usize].push(source);
        }
    }
    reverse
}

/// Builds this instance's [`Subgraph`] from the global datasets.
///
/// When `reverse` is `None` it is derived from the forward lists. The
/// boundary set is the set of incoming contributors owned elsewhere; those
/// are exactly the vertices whose owners will route updates to us.
pub fn build_subgraph(
    adjacency: &[Vec<VertexId>],
    reverse: Option<&[Vec<VertexId>]>,
    partition: &[PeerUid],
    uid: PeerUid,
) -> Result<Subgraph> {
    if uid == 0 {
        return Err(Error::Configuration("uid must be 1-based".into()));
    }
    if partition.len() != adjacency.len() {
        return Err(Error::Configuration(format!(
            "partition covers {} vertices but adjacency has {}",
            partition.len(),
            adjacency.len()
        )));
    }
    if let Some(reverse) = reverse
        && reverse.len() != adjacency.len()
    {
        return Err(Error::Configuration(format!(
            "reverse adjacency covers {} vertices but adjacency has {}",
            reverse.len(),
            adjacency.len()
        )));
    }

    let derived;
    let reverse = match reverse {
        Some(r) => r,
        None => {
            derived = derive_reverse(adjacency);
            &derived
        }
    };

    let owned: BTreeSet<VertexId> = partition
        .iter()
        .enumerate()
        .filter(|&(_, &owner)| owner == uid)
        .map(|(idx, _)| (idx + 1) as VertexId)
        .collect();

    // Incoming contributors per owned vertex. A dangling vertex's implicit
    // self-loop makes it its own contributor.
    let mut contributors: HashMap<VertexId, Vec<VertexId>> = HashMap::new();
    for &v in &owned {
        let mut incoming = reverse[(v - 1) as usize].clone();
        if adjacency[(v - 1) as usize] == [v] && !incoming.contains(&v) {
            incoming.push(v);
        }
        contributors.insert(v, incoming);
    }

    let mut out_degree: HashMap<VertexId, u32> = HashMap::new();
    let mut boundary: BTreeSet<VertexId> = BTreeSet::new();
    for incoming in contributors.values() {
        for &c in incoming {
            out_degree.insert(c, adjacency[(c - 1) as usize].len() as u32);
            if !owned.contains(&c) {
                boundary.insert(c);
            }
        }
    }

    // Routing: the owner of v must push v's new value to every peer owning a
    // forward neighbor of v, because v is a contributor of that neighbor.
    let mut destinations: HashMap<VertexId, BTreeSet<PeerUid>> = HashMap::new();
    for &v in &owned {
        let dests: BTreeSet<PeerUid> = adjacency[(v - 1) as usize]
            .iter()
            .map(|&dst| partition[(dst - 1) as usize])
            .filter(|&owner| owner != uid)
            .collect();
        if !dests.is_empty() {
            destinations.insert(v, dests);
        }
    }

    let mut routing: BTreeMap<PeerUid, Vec<VertexId>> = BTreeMap::new();
    for &v in &owned {
        if let Some(dests) = destinations.get(&v) {
            for &dest in dests {
                routing.entry(dest).or_default().push(v);
            }
        }
    }

    tracing::debug!(
        uid,
        owned = owned.len(),
        boundary = boundary.len(),
        destinations = routing.len(),
        "subgraph built"
    );

    Ok(Subgraph {
        uid,
        owned,
        contributors,
        out_degree,
        boundary,
        destinations,
        routing,
    })
}

/// Parses one space-separated line of vertex ids with range validation.
fn parse_id_line(
    line: &str,
    line_no: usize,
    vertex_count: usize,
    dataset: &str,
) -> Result<Vec<VertexId>> {
    let mut ids = Vec::new();
    for token in line.split_whitespace() {
        let id: VertexId = token.parse().map_err(|_| {
            Error::Configuration(format!(
                "{} line {}: invalid vertex id {:?}",
                dataset, line_no, token
            ))
        })?;
        if id == 0 || id as usize > vertex_count {
            return Err(Error::Configuration(format!(
                "{} line {}: vertex id {} out of range 1..={}",
                dataset, line_no, id, vertex_count
            )));
        }
        ids.push(id);
    }
    Ok(ids)
}
