//! Insertion-ordered storage for archive entries.
//!
//! Entries live in an arena and are linked into a doubly-linked list through
//! stable [`Slot`] handles. Every node carries a fractional order key so that
//! "does `a` come before `b`" is a single comparison, and inserting between
//! two nodes never renumbers the rest of the list.

use crate::entry::Entry;

/// Stable handle to a node in an [`OrderedIndex`]. Slots are recycled after
/// removal, so a slot must not be used once its node is gone.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct Slot(usize);

#[derive(Debug)]
struct Node {
    entry: Entry,
    prev: Option<Slot>,
    next: Option<Slot>,
    key: f64,
}

#[derive(Debug, Default)]
pub(crate) struct OrderedIndex {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<Slot>,
    tail: Option<Slot>,
    len: usize,
}

impl OrderedIndex {
    #[inline(always)]
    pub fn get(&self, slot: Slot) -> Option<&Entry> {
        self.nodes.get(slot.0)?.as_ref().map(|node| &node.entry)
    }

    #[inline(always)]
    pub fn key(&self, slot: Slot) -> f64 {
        self.node(slot).key
    }

    /// Whether `a` comes before `b` in the sequence.
    #[inline(always)]
    pub fn precedes(&self, a: Slot, b: Slot) -> bool {
        self.key(a) < self.key(b)
    }

    pub fn push_back(&mut self, entry: Entry) -> Slot {
        let slot = self.allocate(entry);
        match self.tail {
            Some(tail) => self.link_after(tail, slot),
            None => {
                self.head = Some(slot);
                self.tail = Some(slot);
            }
        }
        self.assign_key(slot);
        slot
    }

    pub fn insert_after(&mut self, anchor: Slot, entry: Entry) -> Slot {
        let slot = self.allocate(entry);
        self.link_after(anchor, slot);
        self.assign_key(slot);
        slot
    }

    pub fn insert_before(&mut self, anchor: Slot, entry: Entry) -> Slot {
        let slot = self.allocate(entry);
        self.link_before(anchor, slot);
        self.assign_key(slot);
        slot
    }

    /// Swaps the entry held at `slot`, keeping its position.
    pub fn replace(&mut self, slot: Slot, entry: Entry) -> Entry {
        std::mem::replace(&mut self.node_mut(slot).entry, entry)
    }

    pub fn remove(&mut self, slot: Slot) -> Entry {
        let node = match self.nodes[slot.0].take() {
            Some(node) => node,
            None => panic!("slot {:?} removed twice", slot),
        };

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(slot.0);
        self.len -= 1;
        node.entry
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            index: self,
            cursor: self.head,
        }
    }

    fn allocate(&mut self, entry: Entry) -> Slot {
        let node = Node {
            entry,
            prev: None,
            next: None,
            key: 0.0,
        };
        self.len += 1;

        match self.free.pop() {
            Some(i) => {
                self.nodes[i] = Some(node);
                Slot(i)
            }
            None => {
                self.nodes.push(Some(node));
                Slot(self.nodes.len() - 1)
            }
        }
    }

    fn link_after(&mut self, anchor: Slot, slot: Slot) {
        let next = self.node(anchor).next;
        {
            let node = self.node_mut(slot);
            node.prev = Some(anchor);
            node.next = next;
        }
        self.node_mut(anchor).next = Some(slot);
        match next {
            Some(next) => self.node_mut(next).prev = Some(slot),
            None => self.tail = Some(slot),
        }
    }

    fn link_before(&mut self, anchor: Slot, slot: Slot) {
        let prev = self.node(anchor).prev;
        {
            let node = self.node_mut(slot);
            node.prev = prev;
            node.next = Some(anchor);
        }
        self.node_mut(anchor).prev = Some(slot);
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(slot),
            None => self.head = Some(slot),
        }
    }

    /// Gives a freshly linked node its key. Keys are assigned exactly once,
    /// from whichever neighbors the node has at this point.
    fn assign_key(&mut self, slot: Slot) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev.map(|s| self.key(s)), node.next.map(|s| self.key(s)))
        };

        let key = match (prev, next) {
            (None, None) => 0.0,
            (Some(prev), None) => prev + 1.0,
            (None, Some(next)) => next - 1.0,
            (Some(prev), Some(next)) => {
                let mid = prev + (next - prev) / 2.0;
                if mid <= prev || mid >= next {
                    self.renumber();
                    return;
                }
                mid
            }
        };

        self.node_mut(slot).key = key;
    }

    /// Reassigns every key to consecutive integers in list order. Only
    /// needed once repeated midpoint insertion into one gap exhausts the
    /// precision of the keys.
    fn renumber(&mut self) {
        tracing::debug!("order keys exhausted, renumbering {} entries", self.len);

        let mut cursor = self.head;
        let mut key = 0.0;
        while let Some(slot) = cursor {
            let node = self.node_mut(slot);
            node.key = key;
            key += 1.0;
            cursor = node.next;
        }
    }

    #[inline(always)]
    fn node(&self, slot: Slot) -> &Node {
        match &self.nodes[slot.0] {
            Some(node) => node,
            None => panic!("stale slot {:?}", slot),
        }
    }

    #[inline(always)]
    fn node_mut(&mut self, slot: Slot) -> &mut Node {
        match &mut self.nodes[slot.0] {
            Some(node) => node,
            None => panic!("stale slot {:?}", slot),
        }
    }
}

pub(crate) struct Iter<'a> {
    index: &'a OrderedIndex,
    cursor: Option<Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Slot, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.index.node(slot);
        self.cursor = node.next;
        Some((slot, &node.entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileEntry;

    fn file(name: &str) -> Entry {
        FileEntry::new(name, "").unwrap().into()
    }

    fn names(index: &OrderedIndex) -> Vec<String> {
        index
            .iter()
            .map(|(_, e)| e.path().as_str().to_string())
            .collect()
    }

    fn assert_keys_increase(index: &OrderedIndex) {
        let keys: Vec<f64> = index.iter().map(|(slot, _)| index.key(slot)).collect();
        for pair in keys.windows(2) {
            assert!(pair[0] < pair[1], "keys out of order: {:?}", keys);
        }
    }

    #[test]
    fn push_and_insert() {
        let mut index = OrderedIndex::default();
        let a = index.push_back(file("a"));
        let c = index.push_back(file("c"));
        let b = index.insert_after(a, file("b"));
        let z = index.insert_before(a, file("z"));

        assert_eq!(names(&index), ["z", "a", "b", "c"]);
        assert!(index.precedes(z, a));
        assert!(index.precedes(a, b));
        assert!(index.precedes(b, c));
        assert_eq!(index.key(b), 0.5);
        assert_eq!(index.key(z), -1.0);
        assert_eq!(index.iter().last().map(|(slot, _)| slot), Some(c));
    }

    #[test]
    fn remove_relinks() {
        let mut index = OrderedIndex::default();
        let a = index.push_back(file("a"));
        let b = index.push_back(file("b"));
        let c = index.push_back(file("c"));

        assert_eq!(index.remove(b).path().as_str(), "b");
        assert_eq!(names(&index), ["a", "c"]);
        index.remove(a);
        index.remove(c);
        assert!(index.iter().next().is_none());
        assert_eq!(index.tail, None);

        // Recycled slots keep working.
        let d = index.push_back(file("d"));
        index.insert_before(d, file("e"));
        assert_eq!(names(&index), ["e", "d"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut index = OrderedIndex::default();
        index.push_back(file("a"));
        let b = index.push_back(file("b"));
        index.push_back(file("c"));

        let old = index.replace(b, file("B"));
        assert_eq!(old.path().as_str(), "b");
        assert_eq!(names(&index), ["a", "B", "c"]);
    }

    #[test]
    fn exhausted_gap_is_renumbered() {
        let mut index = OrderedIndex::default();
        let first = index.push_back(file("first"));
        index.push_back(file("last"));

        for i in 0..2000 {
            index.insert_after(first, file(&format!("f{}", i)));
            assert_keys_increase(&index);
        }

        assert_eq!(index.iter().count(), 2002);
        let names = names(&index);
        assert_eq!(names[0], "first");
        assert_eq!(names[1], "f1999");
        assert_eq!(names[2001], "last");
    }
}
