use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Stable positive vertex identifier (1-based in the datasets).
pub type VertexId = u32;

/// Ordinal instance identity (1..N), derived from registration order.
pub type PeerUid = u32;

/// The slice of the graph one instance computes on, plus the routing tables
/// needed to exchange values with the owners of everything else.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// This instance's ordinal.
    pub uid: PeerUid,
    /// Vertices this instance is authoritative for.
    pub owned: BTreeSet<VertexId>,
    /// For each owned vertex, the vertices with an edge into it.
    /// A dangling vertex (implicit self-loop) contributes to itself.
    pub contributors: HashMap<VertexId, Vec<VertexId>>,
    /// Out-degree of every vertex referenced by `contributors` (owned and
    /// boundary alike). Never zero: dangling vertices count their self-loop.
    pub out_degree: HashMap<VertexId, u32>,
    /// Contributors owned by other instances. Their values are received each
    /// round, never computed locally.
    pub boundary: BTreeSet<VertexId>,
    /// Owned vertex -> peer ordinals that need its updated value.
    pub destinations: HashMap<VertexId, BTreeSet<PeerUid>>,
    /// Destination ordinal -> owned vertices it needs. Inverse of
    /// `destinations`, used to assemble one message per (round, destination).
    pub routing: BTreeMap<PeerUid, Vec<VertexId>>,
}

impl Subgraph {
    /// Number of vertices this instance computes each round.
    pub fn owned_count(&self) -> usize {
        self.owned.len()
    }

    /// Number of vertices whose values must arrive before a round can merge.
    pub fn boundary_count(&self) -> usize {
        self.boundary.len()
    }
}
