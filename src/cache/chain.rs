//! Entry Chain Module
//!
//! Orders cache entries from oldest (head) to newest (tail).
//!
//! Entries live in a `Vec` of slots and link to each other by slot index, so
//! the chain never holds references into itself. Vacated slots are recycled
//! through a free list.

// == Entry Id ==
/// Stable handle to an entry in an [`EntryChain`].
///
/// A handle stays valid until its entry is removed; after that the slot may
/// be reused by a later insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(usize);

#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Entry Chain ==
/// Doubly-linked list of entries backed by a slot arena.
#[derive(Debug)]
pub struct EntryChain<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> Default for EntryChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntryChain<T> {
    // == Constructor ==
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Returns the number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle of the oldest entry.
    pub fn head(&self) -> Option<EntryId> {
        self.head.map(EntryId)
    }

    /// Handle of the newest entry.
    pub fn tail(&self) -> Option<EntryId> {
        self.tail.map(EntryId)
    }

    /// The oldest entry.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|idx| self.node(idx)).map(|node| &node.item)
    }

    pub fn get(&self, id: EntryId) -> Option<&T> {
        self.node(id.0).map(|node| &node.item)
    }

    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut T> {
        self.node_mut(id.0).map(|node| &mut node.item)
    }

    // == Push Back ==
    /// Appends an entry at the tail and returns its handle.
    pub fn push_back(&mut self, item: T) -> EntryId {
        let node = Node {
            item,
            prev: None,
            next: None,
        };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        self.link_back(idx);
        self.len += 1;
        EntryId(idx)
    }

    // == Move To Back ==
    /// Relinks an entry at the tail. Returns false for a stale handle.
    pub fn move_to_back(&mut self, id: EntryId) -> bool {
        if self.tail == Some(id.0) {
            return self.node(id.0).is_some();
        }
        if !self.unlink(id.0) {
            return false;
        }
        self.link_back(id.0);
        true
    }

    // == Remove ==
    /// Unlinks an entry and returns it, freeing its slot.
    pub fn remove(&mut self, id: EntryId) -> Option<T> {
        if !self.unlink(id.0) {
            return None;
        }
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.item)
    }

    /// Removes and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head?;
        self.remove(EntryId(head))
    }

    /// Drops every entry and releases the arena.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            cursor: self.head,
        }
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx).and_then(Option::as_mut)
    }

    /// Patches the neighbours of `idx` around it. The slot stays occupied.
    fn unlink(&mut self, idx: usize) -> bool {
        let (prev, next) = match self.node(idx) {
            Some(node) => (node.prev, node.next),
            None => return false,
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.node_mut(p) {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.node_mut(n) {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(idx) {
            node.prev = None;
            node.next = None;
        }
        true
    }

    fn link_back(&mut self, idx: usize) {
        let old_tail = self.tail;
        if let Some(node) = self.node_mut(idx) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(t) => {
                if let Some(node) = self.node_mut(t) {
                    node.next = Some(idx);
                }
            }
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}

// == Iterator ==
/// Oldest-to-newest iterator over an [`EntryChain`].
pub struct Iter<'a, T> {
    chain: &'a EntryChain<T>,
    cursor: Option<usize>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.chain.node(self.cursor?)?;
        self.cursor = node.next;
        Some(&node.item)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn collect(chain: &EntryChain<&'static str>) -> Vec<&'static str> {
        chain.iter().copied().collect()
    }

    #[test]
    fn test_chain_new() {
        let chain: EntryChain<u32> = EntryChain::new();
        assert!(chain.is_empty());
        assert!(chain.head().is_none());
        assert!(chain.tail().is_none());
        assert!(chain.front().is_none());
    }

    #[test]
    fn test_push_back_orders_oldest_first() {
        let mut chain = EntryChain::new();
        let a = chain.push_back("a");
        chain.push_back("b");
        let c = chain.push_back("c");

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.head(), Some(a));
        assert_eq!(chain.tail(), Some(c));
        assert_eq!(collect(&chain), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_head_to_back() {
        let mut chain = EntryChain::new();
        let a = chain.push_back("a");
        let b = chain.push_back("b");
        chain.push_back("c");

        assert!(chain.move_to_back(a));

        assert_eq!(chain.head(), Some(b));
        assert_eq!(chain.tail(), Some(a));
        assert_eq!(collect(&chain), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_middle_to_back() {
        let mut chain = EntryChain::new();
        chain.push_back("a");
        let b = chain.push_back("b");
        chain.push_back("c");

        chain.move_to_back(b);
        assert_eq!(collect(&chain), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_move_tail_is_noop() {
        let mut chain = EntryChain::new();
        chain.push_back("a");
        let b = chain.push_back("b");

        assert!(chain.move_to_back(b));
        assert_eq!(collect(&chain), vec!["a", "b"]);
    }

    #[test]
    fn test_remove_patches_neighbours() {
        let mut chain = EntryChain::new();
        let a = chain.push_back("a");
        let b = chain.push_back("b");
        let c = chain.push_back("c");

        assert_eq!(chain.remove(b), Some("b"));
        assert_eq!(collect(&chain), vec!["a", "c"]);

        assert_eq!(chain.remove(a), Some("a"));
        assert_eq!(chain.head(), Some(c));

        assert_eq!(chain.remove(c), Some("c"));
        assert!(chain.is_empty());
        assert!(chain.head().is_none());
        assert!(chain.tail().is_none());
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut chain = EntryChain::new();
        let a = chain.push_back("a");
        chain.remove(a);

        assert_eq!(chain.remove(a), None);
        assert!(!chain.move_to_back(a));
        assert!(chain.get(a).is_none());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut chain = EntryChain::new();
        let a = chain.push_back("a");
        chain.push_back("b");
        chain.remove(a);

        let c = chain.push_back("c");
        assert_eq!(c, a, "freed slot should be recycled");
        assert_eq!(collect(&chain), vec!["b", "c"]);
    }

    #[test]
    fn test_pop_front_drains_in_order() {
        let mut chain = EntryChain::new();
        chain.push_back("a");
        chain.push_back("b");
        chain.push_back("c");

        assert_eq!(chain.pop_front(), Some("a"));
        assert_eq!(chain.pop_front(), Some("b"));
        assert_eq!(chain.pop_front(), Some("c"));
        assert_eq!(chain.pop_front(), None);
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let mut chain = EntryChain::new();
        let id = chain.push_back(1);
        if let Some(item) = chain.get_mut(id) {
            *item = 2;
        }
        assert_eq!(chain.get(id), Some(&2));
    }

    #[test]
    fn test_clear() {
        let mut chain = EntryChain::new();
        chain.push_back("a");
        chain.push_back("b");
        chain.clear();

        assert!(chain.is_empty());
        assert_eq!(chain.iter().count(), 0);
    }
}
