use core::cmp::Ordering;

use crate::graph::NodeId;

#[derive(Clone, Copy, Debug)]
struct Entry {
    node: NodeId,
    key: f64,
    tie: f64,
}

impl Entry {
    fn precedes(&self, other: &Entry) -> bool {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.tie.total_cmp(&other.tie))
            .then_with(|| self.node.cmp(&other.node))
            == Ordering::Less
    }
}

/// Binary min-heap keyed by node id, with in-place key updates.
///
/// Entries order by `key`, then `tie`, then node id.
#[derive(Clone, Debug, Default)]
pub struct IndexedHeap {
    entries: Vec<Entry>,
    slots: Vec<Option<usize>>,
}

impl IndexedHeap {
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            entries: Vec::with_capacity(nodes.min(1024)),
            slots: vec![None; nodes],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        matches!(self.slots.get(node), Some(Some(_)))
    }

    pub fn key_of(&self, node: NodeId) -> Option<f64> {
        let slot = (*self.slots.get(node)?)?;
        Some(self.entries[slot].key)
    }

    /// Inserts `node`, or moves it to its new place if already queued.
    pub fn push_or_update(&mut self, node: NodeId, key: f64, tie: f64) {
        if node >= self.slots.len() {
            self.slots.resize(node + 1, None);
        }
        let entry = Entry { node, key, tie };
        match self.slots[node] {
            Some(slot) => {
                let previous = self.entries[slot];
                self.entries[slot] = entry;
                if entry.precedes(&previous) {
                    self.sift_up(slot);
                } else {
                    self.sift_down(slot);
                }
            }
            None => {
                self.entries.push(entry);
                let slot = self.entries.len() - 1;
                self.slots[node] = Some(slot);
                self.sift_up(slot);
            }
        }
    }

    pub fn peek(&self) -> Option<(NodeId, f64)> {
        self.entries.first().map(|entry| (entry.node, entry.key))
    }

    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        if self.entries.is_empty() {
            return None;
        }
        let top = self.entries.swap_remove(0);
        self.slots[top.node] = None;
        if let Some(moved) = self.entries.first() {
            self.slots[moved.node] = Some(0);
            self.sift_down(0);
        }
        Some((top.node, top.key))
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.entries[slot].precedes(&self.entries[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.entries.len();
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut best = slot;
            if left < len && self.entries[left].precedes(&self.entries[best]) {
                best = left;
            }
            if right < len && self.entries[right].precedes(&self.entries[best]) {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.entries.swap(a, b);
        self.slots[self.entries[a].node] = Some(a);
        self.slots[self.entries[b].node] = Some(b);
    }
}
