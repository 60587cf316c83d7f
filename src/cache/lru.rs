//! LRU Recency Module
//!
//! Doubly linked recency list for LRU eviction, stored in a `Vec` arena with
//! index links so every operation is O(1) without unsafe code.
//!
//! Each node owns its key and payload, so a cache that keeps its entries in
//! the nodes cannot hold an entry that is missing from the recency order.

/// Null link
const NIL: usize = usize::MAX;

/// Handle to a node in a [`RecencyList`].
///
/// Handles are reused after removal; holding one past `remove` is a bug in
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node<K, T> {
    slot: Option<(K, T)>,
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct RecencyList<K, T> {
    nodes: Vec<Node<K, T>>,
    head: usize,
    tail: usize,
    /// Head of the free-slot chain, linked through `next`
    free: usize,
    len: usize,
}

impl<K, T> Default for RecencyList<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> RecencyList<K, T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts a new node as most recently used.
    pub fn push_front(&mut self, key: K, value: T) -> NodeId {
        let idx = if self.free != NIL {
            let idx = self.free;
            self.free = self.nodes[idx].next;
            self.nodes[idx].slot = Some((key, value));
            idx
        } else {
            self.nodes.push(Node {
                slot: Some((key, value)),
                prev: NIL,
                next: NIL,
            });
            self.nodes.len() - 1
        };
        self.link_front(idx);
        self.len += 1;
        NodeId(idx)
    }

    // == Touch ==
    /// Marks a node as recently used (moves to front).
    pub fn touch(&mut self, id: NodeId) {
        if !self.is_live(id) || self.head == id.0 {
            return;
        }
        self.unlink(id.0);
        self.link_front(id.0);
    }

    // == Remove ==
    /// Unlinks a node and returns its key and payload.
    pub fn remove(&mut self, id: NodeId) -> Option<(K, T)> {
        if !self.is_live(id) {
            return None;
        }
        self.unlink(id.0);
        let slot = self.nodes[id.0].slot.take();
        self.nodes[id.0].next = self.free;
        self.free = id.0;
        self.len -= 1;
        slot
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used node.
    ///
    /// Returns None if the list is empty.
    pub fn evict_oldest(&mut self) -> Option<(K, T)> {
        if self.tail == NIL {
            return None;
        }
        self.remove(NodeId(self.tail))
    }

    /// Returns the payload behind `id`.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slot(id.0).map(|(_, value)| value)
    }

    /// Drops every node and releases the arena.
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates from most to least recently used.
    pub fn iter(&self) -> Iter<'_, K, T> {
        Iter {
            list: self,
            current: self.head,
            remaining: self.len,
        }
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|node| node.slot.is_some())
    }

    fn slot(&self, idx: usize) -> Option<(&K, &T)> {
        self.nodes
            .get(idx)
            .and_then(|node| node.slot.as_ref())
            .map(|(key, value)| (key, value))
    }

    fn link_front(&mut self, idx: usize) {
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = self.head;
        if self.head != NIL {
            self.nodes[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.nodes[idx].prev = NIL;
        self.nodes[idx].next = NIL;
    }
}

/// Iterator over `(NodeId, &K, &T)` from most to least recently used.
pub struct Iter<'a, K, T> {
    list: &'a RecencyList<K, T>,
    current: usize,
    remaining: usize,
}

impl<'a, K, T> Iterator for Iter<'a, K, T> {
    type Item = (NodeId, &'a K, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == NIL {
            return None;
        }
        let idx = self.current;
        let node = &self.list.nodes[idx];
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        node.slot
            .as_ref()
            .map(|(key, value)| (NodeId(idx), key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
