//! Hierarchical index over archive paths.
//!
//! Every directory, explicit or implicit, is a [`Branch`]; every file is a
//! [`Node::Leaf`]. Both point back into the [`OrderedIndex`](crate::order)
//! through [`Slot`]s.

use std::collections::BTreeMap;

use crate::order::Slot;

#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Slot),
    Branch(Branch),
}

#[derive(Debug, Default)]
pub(crate) struct Branch {
    pub(crate) children: BTreeMap<String, Node>,

    /// The slot of the directory's own entry, when the directory is explicit.
    pub(crate) marker: Option<Slot>,
}

impl Branch {
    #[inline(always)]
    fn is_vacant(&self) -> bool {
        self.children.is_empty() && self.marker.is_none()
    }
}

impl Node {
    /// Every slot at or beneath this node.
    pub fn slots(&self) -> Vec<Slot> {
        let mut out = vec![];
        self.collect_slots(&mut out);
        out
    }

    fn collect_slots(&self, out: &mut Vec<Slot>) {
        match self {
            Node::Leaf(slot) => out.push(*slot),
            Node::Branch(branch) => {
                out.extend(branch.marker);
                for child in branch.children.values() {
                    child.collect_slots(out);
                }
            }
        }
    }
}

/// Why a path can't be inserted. The payload is the number of leading
/// components that name the conflicting node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Conflict {
    /// Something already occupies the path (or a prefix of it, for files
    /// landing on a directory).
    Occupied(usize),
    /// A prefix of the path is a file, so nothing can live beneath it.
    ParentIsFile(usize),
}

#[derive(Debug)]
pub(crate) struct PathTree {
    root: Node,
}

impl Default for PathTree {
    fn default() -> Self {
        PathTree {
            root: Node::Branch(Branch::default()),
        }
    }
}

impl PathTree {
    /// Walks `components` from the root. An empty slice resolves to the
    /// root itself.
    pub fn resolve(&self, components: &[&str]) -> Option<&Node> {
        let mut node = &self.root;
        for name in components {
            node = match node {
                Node::Branch(branch) => branch.children.get(*name)?,
                Node::Leaf(_) => return None,
            };
        }
        Some(node)
    }

    /// Checks, without mutating, whether a file or directory could be
    /// inserted at `components`.
    pub fn check_insert(&self, components: &[&str], directory: bool) -> Result<(), Conflict> {
        let mut node = &self.root;
        for (depth, name) in components.iter().enumerate() {
            let branch = match node {
                Node::Branch(branch) => branch,
                Node::Leaf(_) => return Err(Conflict::ParentIsFile(depth)),
            };
            node = match branch.children.get(*name) {
                Some(child) => child,
                None => return Ok(()),
            };
        }

        match node {
            // An implicit directory only becomes explicit.
            Node::Branch(branch) if directory && branch.marker.is_none() => Ok(()),
            _ => Err(Conflict::Occupied(components.len())),
        }
    }

    /// Records `slot` at `components`, creating intermediate directories as
    /// needed. Callers run [`PathTree::check_insert`] first.
    pub fn insert(
        &mut self,
        components: &[&str],
        slot: Slot,
        directory: bool,
    ) -> Result<(), Conflict> {
        tracing::trace!("tree insert: {:?} -> {:?}", components, slot);

        let (last, parents) = match components.split_last() {
            Some(split) => split,
            None => return Err(Conflict::Occupied(0)),
        };

        let mut branch = match &mut self.root {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => return Err(Conflict::ParentIsFile(0)),
        };
        for (depth, name) in parents.iter().enumerate() {
            branch = match branch
                .children
                .entry(name.to_string())
                .or_insert_with(|| Node::Branch(Branch::default()))
            {
                Node::Branch(child) => child,
                Node::Leaf(_) => return Err(Conflict::ParentIsFile(depth + 1)),
            };
        }

        if directory {
            match branch
                .children
                .entry(last.to_string())
                .or_insert_with(|| Node::Branch(Branch::default()))
            {
                Node::Branch(child) if child.marker.is_none() => child.marker = Some(slot),
                _ => return Err(Conflict::Occupied(components.len())),
            }
        } else {
            if branch.children.contains_key(*last) {
                return Err(Conflict::Occupied(components.len()));
            }
            branch.children.insert(last.to_string(), Node::Leaf(slot));
        }

        Ok(())
    }

    /// Detaches the node at `components` with everything beneath it, then
    /// prunes implicit directories left empty.
    pub fn remove(&mut self, components: &[&str]) -> Option<Node> {
        tracing::trace!("tree remove: {:?}", components);

        match &mut self.root {
            Node::Branch(root) => remove_in(root, components),
            Node::Leaf(_) => None,
        }
    }
}

fn remove_in(branch: &mut Branch, components: &[&str]) -> Option<Node> {
    let (first, rest) = components.split_first()?;
    if rest.is_empty() {
        return branch.children.remove(*first);
    }

    let removed = match branch.children.get_mut(*first)? {
        Node::Branch(child) => remove_in(child, rest)?,
        Node::Leaf(_) => return None,
    };

    let vacant = matches!(branch.children.get(*first), Some(Node::Branch(child)) if child.is_vacant());
    if vacant {
        branch.children.remove(*first);
    }

    Some(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{DirectoryEntry, FileEntry};
    use crate::order::OrderedIndex;

    fn slots() -> (Slot, Slot, Slot) {
        let mut index = OrderedIndex::default();
        (
            index.push_back(FileEntry::new("a", "").unwrap().into()),
            index.push_back(FileEntry::new("b", "").unwrap().into()),
            index.push_back(DirectoryEntry::new("c").unwrap().into()),
        )
    }

    #[test]
    fn implicit_directories() {
        let (a, _, _) = slots();
        let mut tree = PathTree::default();
        tree.insert(&["dir", "sub", "file"], a, false).unwrap();

        match tree.resolve(&["dir", "sub"]) {
            Some(Node::Branch(branch)) => assert!(branch.marker.is_none()),
            other => panic!("expected implicit directory, got {:?}", other),
        }
        assert!(matches!(tree.resolve(&["dir", "sub", "file"]), Some(Node::Leaf(s)) if *s == a));
        assert!(tree.resolve(&["dir", "nope"]).is_none());
        assert!(tree.resolve(&["dir", "sub", "file", "deeper"]).is_none());
    }

    #[test]
    fn conflicts() {
        let (a, b, _) = slots();
        let mut tree = PathTree::default();
        tree.insert(&["foo", "bar"], a, false).unwrap();
        tree.insert(&["file"], b, false).unwrap();

        assert_eq!(tree.check_insert(&["foo"], false), Err(Conflict::Occupied(1)));
        assert_eq!(tree.check_insert(&["foo"], true), Ok(()));
        assert_eq!(tree.check_insert(&["foo", "bar"], false), Err(Conflict::Occupied(2)));
        assert_eq!(tree.check_insert(&["foo", "bar"], true), Err(Conflict::Occupied(2)));
        assert_eq!(tree.check_insert(&["file", "x"], false), Err(Conflict::ParentIsFile(1)));
        assert_eq!(tree.check_insert(&["file"], true), Err(Conflict::Occupied(1)));
        assert_eq!(tree.check_insert(&["foo", "baz"], false), Ok(()));
    }

    #[test]
    fn explicit_over_implicit() {
        let (a, _, c) = slots();
        let mut tree = PathTree::default();
        tree.insert(&["c", "file"], a, false).unwrap();
        tree.insert(&["c"], c, true).unwrap();

        match tree.resolve(&["c"]) {
            Some(Node::Branch(branch)) => assert_eq!(branch.marker, Some(c)),
            other => panic!("expected explicit directory, got {:?}", other),
        }
        assert_eq!(tree.check_insert(&["c"], true), Err(Conflict::Occupied(1)));
        assert_eq!(tree.resolve(&["c"]).unwrap().slots(), vec![c, a]);
    }

    #[test]
    fn remove_prunes_implicit_parents() {
        let (a, b, c) = slots();
        let mut tree = PathTree::default();
        tree.insert(&["x"], c, true).unwrap();
        tree.insert(&["x", "y", "z", "a"], a, false).unwrap();
        tree.insert(&["w", "b"], b, false).unwrap();

        assert!(matches!(tree.remove(&["x", "y", "z", "a"]), Some(Node::Leaf(s)) if s == a));
        assert!(tree.resolve(&["x", "y"]).is_none());
        // Explicit directories survive losing their children.
        assert!(matches!(tree.resolve(&["x"]), Some(Node::Branch(_))));

        tree.remove(&["w", "b"]);
        assert!(tree.resolve(&["w"]).is_none());
        assert!(tree.remove(&["nope"]).is_none());
    }
}
