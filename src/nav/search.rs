//! Per-search bookkeeping.
//!
//! Every search call allocates its own [`SearchState`], so two searches in
//! the same tick (or on different threads sharing one `&NavGraph`) never
//! see each other's costs or back-pointers.

use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;

use super::config::NavConfig;
use super::types::NodeId;

/// Step budget and per-step cost shared by all searches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchLimits {
    pub max_search_size: usize,
    pub step_cost: f32,
}

impl From<&NavConfig> for SearchLimits {
    fn from(config: &NavConfig) -> Self {
        Self {
            max_search_size: config.max_search_size,
            step_cost: config.step_cost,
        }
    }
}

/// Transient per-node values. `value` and `rank` mean whatever the running
/// search says: the A* estimate and hop count for path searches, the
/// heuristic score and steps from source for best-first searches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchRecord {
    pub value: f32,
    pub rank: u32,
    pub previous: Option<NodeId>,
    pub next: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub struct SearchState {
    visited: FixedBitSet,
    records: FxHashMap<NodeId, SearchRecord>,
}

impl SearchState {
    pub fn new(node_count: usize, max_search_size: usize) -> Self {
        // Each expansion touches at most eight neighbors.
        let expected = node_count.min(max_search_size.saturating_mul(8).saturating_add(1));
        Self {
            visited: FixedBitSet::with_capacity(node_count),
            records: FxHashMap::with_capacity_and_hasher(expected, Default::default()),
        }
    }

    /// Mark `id` visited with its initial record. Returns `false` (and
    /// leaves the existing record alone) if it was already visited.
    pub fn visit(&mut self, id: NodeId, record: SearchRecord) -> bool {
        if self.visited.put(id.index()) {
            return false;
        }
        self.records.insert(id, record);
        true
    }

    #[inline]
    pub fn is_visited(&self, id: NodeId) -> bool {
        self.visited.contains(id.index())
    }

    pub fn record(&self, id: NodeId) -> Option<&SearchRecord> {
        self.records.get(&id)
    }

    pub fn record_mut(&mut self, id: NodeId) -> Option<&mut SearchRecord> {
        self.records.get_mut(&id)
    }

    pub fn visited_count(&self) -> usize {
        self.records.len()
    }

    /// Walk `previous` pointers from `from` back to the search source,
    /// yielding `from` first.
    pub fn previous_chain(&self, from: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(from), move |id| self.record(*id).and_then(|r| r.previous))
    }
}
