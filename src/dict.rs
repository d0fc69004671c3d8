// Copyright 2025 Lars Brubaker
// License: SGI Free Software License B (MIT-compatible)
//
// Ordered doubly linked list holding the active regions of the sweep.
//
// The ordering predicate is supplied per call rather than stored, because it
// depends on the sweep position at the time of the call. The list is never
// re-sorted: insertion walks from a nearby hint, and ordering is only
// trusted between neighbours.

use crate::error::{reserve, Result};

/// Stable handle of a list node. The head node closes the ring and carries no
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const HEAD: NodeId = NodeId(0);
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Node<K> {
    key: Option<K>,
    next: NodeId,
    prev: NodeId,
}

#[derive(Debug, Clone)]
pub struct Dict<K> {
    nodes: Vec<Node<K>>,
    free: Vec<NodeId>,
    len: usize,
}

impl<K: Copy> Default for Dict<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy> Dict<K> {
    pub fn new() -> Self {
        Dict {
            nodes: vec![Node {
                key: None,
                next: NodeId::HEAD,
                prev: NodeId::HEAD,
            }],
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `key` at its place counting back from the tail.
    pub fn insert(&mut self, key: K, leq: impl FnMut(K, K) -> bool) -> Result<NodeId> {
        self.insert_before(NodeId::HEAD, key, leq)
    }

    /// Inserts `key` before `hint`, first stepping backwards over every node
    /// whose key is not `leq` the new one.
    pub fn insert_before(
        &mut self,
        hint: NodeId,
        key: K,
        mut leq: impl FnMut(K, K) -> bool,
    ) -> Result<NodeId> {
        let mut at = hint;
        loop {
            at = self.pred(at);
            match self.key(at) {
                Some(k) if !leq(k, key) => continue,
                _ => break,
            }
        }

        let node = self.alloc()?;
        let next = self.succ(at);
        self.nodes[node.index()] = Node {
            key: Some(key),
            next,
            prev: at,
        };
        self.nodes[at.index()].next = node;
        self.nodes[next.index()].prev = node;
        self.len += 1;
        Ok(node)
    }

    fn alloc(&mut self) -> Result<NodeId> {
        if let Some(node) = self.free.pop() {
            return Ok(node);
        }
        reserve(&mut self.nodes, 1, "active region list")?;
        self.nodes.push(Node {
            key: None,
            next: NodeId::INVALID,
            prev: NodeId::INVALID,
        });
        Ok(NodeId(self.nodes.len() as u32 - 1))
    }

    pub fn delete(&mut self, node: NodeId) {
        debug_assert!(node != NodeId::HEAD, "the head node cannot be deleted");
        let Node { next, prev, .. } = self.nodes[node.index()];
        self.nodes[next.index()].prev = prev;
        self.nodes[prev.index()].next = next;
        self.nodes[node.index()] = Node {
            key: None,
            next: NodeId::INVALID,
            prev: NodeId::INVALID,
        };
        self.free.push(node);
        self.len -= 1;
    }

    /// First node from the front for which `at_or_after(key)` holds, or the
    /// head if there is none.
    pub fn search(&self, mut at_or_after: impl FnMut(K) -> bool) -> NodeId {
        let mut node = NodeId::HEAD;
        loop {
            node = self.succ(node);
            match self.key(node) {
                Some(k) if !at_or_after(k) => continue,
                _ => return node,
            }
        }
    }

    #[inline]
    pub fn key(&self, node: NodeId) -> Option<K> {
        self.nodes[node.index()].key
    }

    #[inline]
    pub fn min(&self) -> NodeId {
        self.succ(NodeId::HEAD)
    }

    #[inline]
    pub fn max(&self) -> NodeId {
        self.pred(NodeId::HEAD)
    }

    #[inline]
    pub fn succ(&self, node: NodeId) -> NodeId {
        self.nodes[node.index()].next
    }

    #[inline]
    pub fn pred(&self, node: NodeId) -> NodeId {
        self.nodes[node.index()].prev
    }

    /// Keys in list order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        let mut node = self.min();
        std::iter::from_fn(move || {
            let key = self.key(node)?;
            node = self.succ(node);
            Some(key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn leq(a: i32, b: i32) -> bool {
        a <= b
    }

    fn assert_sorted(d: &Dict<i32>) {
        let keys: Vec<i32> = d.keys().collect();
        assert!(keys.windows(2).all(|w| leq(w[0], w[1])), "out of order: {keys:?}");
        assert_eq!(keys.len(), d.len());
    }

    #[test]
    fn empty_list_is_just_the_head() {
        let d: Dict<i32> = Dict::new();
        assert_eq!(d.min(), NodeId::HEAD);
        assert_eq!(d.max(), NodeId::HEAD);
        assert_eq!(d.key(NodeId::HEAD), None);
        assert!(d.is_empty());
    }

    #[test]
    fn insert_keeps_order() {
        let mut d = Dict::new();
        for k in [5, 1, 4, 2, 3] {
            d.insert(k, leq).unwrap();
        }
        assert_eq!(d.keys().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
        assert_eq!(d.key(d.max()), Some(5));
    }

    #[test]
    fn insert_before_hint_walks_back() {
        let mut d = Dict::new();
        let n10 = d.insert(10, leq).unwrap();
        d.insert(20, leq).unwrap();
        let n5 = d.insert_before(n10, 5, leq).unwrap();
        let n15 = d.insert_before(d.max(), 15, leq).unwrap();
        assert_eq!(d.succ(n5), n10);
        assert_eq!(d.pred(n15), n10);
        assert_sorted(&d);
    }

    #[test]
    fn search_finds_first_key_at_or_after() {
        let mut d = Dict::new();
        for k in [10, 20, 30] {
            d.insert(k, leq).unwrap();
        }
        assert_eq!(d.key(d.search(|k| 15 <= k)), Some(20));
        assert_eq!(d.key(d.search(|k| 10 <= k)), Some(10));
        assert_eq!(d.search(|k| 31 <= k), NodeId::HEAD);
    }

    #[test]
    fn deleted_nodes_are_unlinked_and_reused() {
        let mut d = Dict::new();
        d.insert(1, leq).unwrap();
        let n2 = d.insert(2, leq).unwrap();
        d.insert(3, leq).unwrap();
        d.delete(n2);
        assert_eq!(d.keys().collect::<Vec<_>>(), vec![1, 3]);
        let again = d.insert(2, leq).unwrap();
        assert_eq!(again, n2);
        assert_sorted(&d);
    }

    #[test]
    fn random_inserts_and_deletes_stay_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut d = Dict::new();
        let mut live: Vec<NodeId> = Vec::new();
        for _ in 0..2000 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let key = rng.gen_range(-100..100);
                let hint = if live.is_empty() {
                    NodeId::HEAD
                } else {
                    // Any hint after the true position works.
                    d.search(|k| key < k)
                };
                live.push(d.insert_before(hint, key, leq).unwrap());
            } else {
                let victim = live.swap_remove(rng.gen_range(0..live.len()));
                d.delete(victim);
            }
            assert_sorted(&d);
        }
    }
}
