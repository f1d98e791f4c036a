use std::hash::Hash;

use nohash_hasher::{IntMap, IsEnabled};

struct Entry<K, P> {
    key: K,
    priority: P,
}

/// Binary min-heap with a side index from key to heap slot. The index makes it possible to lower
/// the priority of an element that is already enqueued in O(log n), which is what Dijkstra needs
/// whenever it finds a shorter tentative distance.
///
/// Every key is contained at most once.
pub struct IndexedMinQueue<K, P>
where
    K: Copy + Eq + Hash + IsEnabled,
    P: Ord + Copy,
{
    heap: Vec<Entry<K, P>>,
    positions: IntMap<K, usize>,
}

impl<K, P> Default for IndexedMinQueue<K, P>
where
    K: Copy + Eq + Hash + IsEnabled,
    P: Ord + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> IndexedMinQueue<K, P>
where
    K: Copy + Eq + Hash + IsEnabled,
    P: Ord + Copy,
{
    pub fn new() -> Self {
        IndexedMinQueue {
            heap: Vec::new(),
            positions: IntMap::default(),
        }
    }

    /// Inserts `key`. Returns false and leaves the queue unchanged if `key` is already enqueued.
    pub fn push(&mut self, key: K, priority: P) -> bool {
        if self.positions.contains_key(&key) {
            return false;
        }
        let pos = self.heap.len();
        self.heap.push(Entry { key, priority });
        self.positions.insert(key, pos);
        self.sift_up(pos);
        true
    }

    /// Removes and returns the element with the smallest priority.
    pub fn pop(&mut self) -> Option<(K, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.positions.remove(&entry.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((entry.key, entry.priority))
    }

    pub fn peek(&self) -> Option<(K, P)> {
        self.heap.first().map(|e| (e.key, e.priority))
    }

    /// Lowers the priority of an enqueued key and restores the heap order. Returns false if the
    /// key is not enqueued or if `priority` is larger than the current one; the queue is left
    /// unchanged in that case.
    pub fn decrease_key(&mut self, key: K, priority: P) -> bool {
        let Some(&pos) = self.positions.get(&key) else {
            return false;
        };
        if priority > self.heap[pos].priority {
            return false;
        }
        self.heap[pos].priority = priority;
        self.sift_up(pos);
        true
    }

    pub fn get_priority(&self, key: &K) -> Option<P> {
        self.positions.get(key).map(|&pos| self.heap[pos].priority)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].priority >= self.heap[parent].priority {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * pos + 1;
            let right = left + 1;
            let mut smallest = pos;
            if left < len && self.heap[left].priority < self.heap[smallest].priority {
                smallest = left;
            }
            if right < len && self.heap[right].priority < self.heap[smallest].priority {
                smallest = right;
            }
            if smallest == pos {
                break;
            }
            self.swap(pos, smallest);
            pos = smallest;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.positions.insert(self.heap[a].key, a);
        self.positions.insert(self.heap[b].key, b);
    }
}
