// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Event queue of the sweep: a binary min-heap addressed through stable
// handles.
//
// Loading happens in two phases. Before `init` inserts only append; `init`
// then heapifies everything bottom-up in O(n). Afterwards insert, extract
// and delete are O(log n). Handles index a slot table that records each
// key's current heap position, so they survive any amount of heap motion;
// released slots are recycled through a free list.

use crate::error::{reserve, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PqHandle(u32);

impl PqHandle {
    pub const INVALID: PqHandle = PqHandle(u32::MAX);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

const VACANT: usize = usize::MAX;

#[derive(Debug, Clone)]
struct Slot<K> {
    key: K,
    /// Position in `heap`, or `VACANT` for a released slot.
    pos: usize,
}

#[derive(Debug, Clone)]
pub struct PriorityQ<K> {
    heap: Vec<PqHandle>,
    slots: Vec<Slot<K>>,
    free: Vec<PqHandle>,
    ordered: bool,
}

impl<K: Copy> Default for PriorityQ<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> PriorityQ<K> {
    pub fn new() -> Self {
        PriorityQ {
            heap: Vec::new(),
            slots: Vec::new(),
            free: Vec::new(),
            ordered: false,
        }
    }

    pub fn with_capacity(n: usize) -> Result<Self> {
        let mut pq = Self::new();
        reserve(&mut pq.heap, n, "event queue")?;
        reserve(&mut pq.slots, n, "event queue")?;
        Ok(pq)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[cfg(test)]
    #[inline]
    pub(crate) fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn contains(&self, handle: PqHandle) -> bool {
        self.slots
            .get(handle.index())
            .map_or(false, |slot| slot.pos != VACANT)
    }

    #[inline]
    fn key_at(&self, pos: usize) -> K {
        self.slots[self.heap[pos].index()].key
    }

    #[inline]
    fn place(&mut self, pos: usize, handle: PqHandle) {
        self.heap[pos] = handle;
        self.slots[handle.index()].pos = pos;
    }

    fn sift_down(&mut self, mut pos: usize, leq: &impl Fn(K, K) -> bool) {
        let moving = self.heap[pos];
        let key = self.slots[moving.index()].key;
        let len = self.heap.len();
        loop {
            let mut child = 2 * pos + 1;
            if child >= len {
                break;
            }
            if child + 1 < len && leq(self.key_at(child + 1), self.key_at(child)) {
                child += 1;
            }
            if leq(key, self.key_at(child)) {
                break;
            }
            let up = self.heap[child];
            self.place(pos, up);
            pos = child;
        }
        self.place(pos, moving);
    }

    fn sift_up(&mut self, mut pos: usize, leq: &impl Fn(K, K) -> bool) {
        let moving = self.heap[pos];
        let key = self.slots[moving.index()].key;
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if leq(self.key_at(parent), key) {
                break;
            }
            let down = self.heap[parent];
            self.place(pos, down);
            pos = parent;
        }
        self.place(pos, moving);
    }

    /// Heapifies everything inserted so far and switches to ordered mode.
    pub fn init(&mut self, leq: impl Fn(K, K) -> bool) {
        for pos in (0..self.heap.len() / 2).rev() {
            self.sift_down(pos, &leq);
        }
        self.ordered = true;
    }

    pub fn insert(&mut self, key: K, leq: impl Fn(K, K) -> bool) -> Result<PqHandle> {
        let pos = self.heap.len();
        let handle = match self.free.pop() {
            Some(h) => {
                self.slots[h.index()] = Slot { key, pos };
                h
            }
            None => {
                reserve(&mut self.slots, 1, "event queue")?;
                self.slots.push(Slot { key, pos });
                PqHandle(self.slots.len() as u32 - 1)
            }
        };
        reserve(&mut self.heap, 1, "event queue")?;
        self.heap.push(handle);
        if self.ordered {
            self.sift_up(pos, &leq);
        }
        Ok(handle)
    }

    /// Smallest key. Only meaningful once the queue is ordered.
    pub fn minimum(&self) -> Option<K> {
        debug_assert!(self.ordered || self.heap.len() <= 1);
        self.heap.first().map(|h| self.slots[h.index()].key)
    }

    pub fn extract_min(&mut self, leq: impl Fn(K, K) -> bool) -> Option<K> {
        debug_assert!(self.ordered || self.heap.len() <= 1);
        let min = *self.heap.first()?;
        self.remove_at(0, &leq);
        Some(self.slots[min.index()].key)
    }

    /// Removes the entry behind `handle`. Stale handles are ignored.
    pub fn delete(&mut self, handle: PqHandle, leq: impl Fn(K, K) -> bool) {
        if !self.contains(handle) {
            return;
        }
        let pos = self.slots[handle.index()].pos;
        self.remove_at(pos, &leq);
    }

    fn remove_at(&mut self, pos: usize, leq: &impl Fn(K, K) -> bool) {
        let gone = self.heap[pos];
        let last = self.heap.len() - 1;
        if pos != last {
            let tail = self.heap[last];
            self.place(pos, tail);
        }
        self.heap.pop();

        if pos < self.heap.len() && self.ordered {
            let parent_is_greater = pos > 0 && !leq(self.key_at((pos - 1) / 2), self.key_at(pos));
            if parent_is_greater {
                self.sift_up(pos, leq);
            } else {
                self.sift_down(pos, leq);
            }
        }

        self.slots[gone.index()].pos = VACANT;
        self.free.push(gone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    /// Ties broken by a serial number, as the sweep does with vertex ids.
    type Key = (i32, u32);

    fn leq(a: Key, b: Key) -> bool {
        a <= b
    }

    #[test]
    fn empty_queue() {
        let mut pq: PriorityQ<Key> = PriorityQ::new();
        pq.init(leq);
        assert!(pq.is_empty());
        assert_eq!(pq.minimum(), None);
        assert_eq!(pq.extract_min(leq), None);
    }

    #[test]
    fn bulk_load_then_drain_in_order() {
        let mut pq = PriorityQ::new();
        for (serial, v) in [5, 3, 8, 1, 9, 2, 7].into_iter().enumerate() {
            pq.insert((v, serial as u32), leq).unwrap();
        }
        assert!(!pq.is_ordered());
        pq.init(leq);
        let drained: Vec<i32> = std::iter::from_fn(|| pq.extract_min(leq)).map(|k| k.0).collect();
        assert_eq!(drained, vec![1, 2, 3, 5, 7, 8, 9]);
    }

    #[test]
    fn delete_by_handle_survives_heap_motion() {
        let mut pq = PriorityQ::new();
        let handles: Vec<PqHandle> = (0..20)
            .map(|i| pq.insert(((i * 7) % 20, i as u32), leq).unwrap())
            .collect();
        pq.init(leq);
        pq.insert((-1, 100), leq).unwrap();
        for h in handles.iter().step_by(2) {
            pq.delete(*h, leq);
        }
        assert!(!pq.contains(handles[0]));
        assert!(pq.contains(handles[1]));
        assert_eq!(pq.extract_min(leq), Some((-1, 100)));
        let rest: Vec<Key> = std::iter::from_fn(|| pq.extract_min(leq)).collect();
        assert_eq!(rest.len(), 10);
        assert!(rest.iter().all(|k| k.1 % 2 == 1));
        assert!(rest.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn released_handles_are_recycled() {
        let mut pq = PriorityQ::new();
        pq.init(leq);
        let a = pq.insert((1, 0), leq).unwrap();
        pq.delete(a, leq);
        let b = pq.insert((2, 1), leq).unwrap();
        assert_eq!(a, b);
        assert_eq!(pq.minimum(), Some((2, 1)));
    }

    #[test]
    fn random_operations_match_a_sorted_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut pq = PriorityQ::new();
        let mut model = BTreeSet::new();
        let mut live: Vec<(PqHandle, Key)> = Vec::new();
        let mut serial = 0u32;

        for _ in 0..500 {
            let key = (rng.gen_range(0..1000), serial);
            serial += 1;
            live.push((pq.insert(key, leq).unwrap(), key));
            model.insert(key);
        }
        pq.init(leq);

        let mut last_extracted: Option<Key> = None;
        for _ in 0..3000 {
            match rng.gen_range(0..3) {
                0 => {
                    // New events never precede the one just extracted.
                    let floor = last_extracted.map_or(0, |k| k.0);
                    let key = (rng.gen_range(floor..floor + 1000), serial);
                    serial += 1;
                    live.push((pq.insert(key, leq).unwrap(), key));
                    model.insert(key);
                }
                1 if !live.is_empty() => {
                    let (h, key) = live.swap_remove(rng.gen_range(0..live.len()));
                    pq.delete(h, leq);
                    model.remove(&key);
                }
                _ => {
                    let got = pq.extract_min(leq);
                    let want = model.iter().next().copied();
                    assert_eq!(got, want);
                    if let Some(k) = got {
                        model.remove(&k);
                        live.retain(|&(_, lk)| lk != k);
                        if let Some(prev) = last_extracted {
                            assert!(prev <= k, "extracted {k:?} after {prev:?}");
                        }
                        last_extracted = Some(k);
                    }
                }
            }
            assert_eq!(pq.len(), model.len());
        }
    }
}
