use std::collections::VecDeque;

const ALPHABET: usize = 26;

#[derive(Default)]
struct Node {
    children: [Option<Box<Node>>; ALPHABET],
    leaf: bool,
}

/// Prefix tree over lowercase ASCII words.
///
/// An experiment in set representation kept alongside the hash-based
/// [`WordSet`](crate::words::WordSet): it deduplicates the same way and
/// supports the same draining merge, with subtree moves instead of
/// element-by-element rehashing. Not wired into the counting engine.
///
/// All traversals are explicit work-list loops rather than recursion, so
/// pathological inputs (one very long word, millions of short ones) cannot
/// exhaust the native stack during size, clear or drop.
#[derive(Default)]
pub struct Trie {
    root: Node,
}

impl Trie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a word of lowercase ASCII letters. Returns true if the word
    /// was not present before. Bytes outside `a-z` are a contract violation.
    pub fn insert(&mut self, word: &str) -> bool {
        let mut node = &mut self.root;
        for &b in word.as_bytes() {
            debug_assert!(b.is_ascii_lowercase());
            let idx = (b - b'a') as usize;
            node = node.children[idx].get_or_insert_with(Box::default);
        }
        if node.leaf {
            false
        } else {
            node.leaf = true;
            true
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        let mut node = &self.root;
        for &b in word.as_bytes() {
            debug_assert!(b.is_ascii_lowercase());
            let idx = (b - b'a') as usize;
            match &node.children[idx] {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.leaf
    }

    pub fn is_empty(&self) -> bool {
        !self.root.leaf && self.root.children.iter().all(|c| c.is_none())
    }

    /// Number of stored words; walks the whole tree.
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut queue: VecDeque<&Node> = VecDeque::new();
        queue.push_back(&self.root);
        while let Some(node) = queue.pop_front() {
            if node.leaf {
                count += 1;
            }
            queue.extend(node.children.iter().flatten().map(Box::as_ref));
        }
        count
    }

    /// Remove every word, tearing the tree down level by level.
    pub fn clear(&mut self) {
        let mut queue: VecDeque<Box<Node>> = self
            .root
            .children
            .iter_mut()
            .filter_map(Option::take)
            .collect();
        while let Some(mut node) = queue.pop_front() {
            queue.extend(node.children.iter_mut().filter_map(Option::take));
        }
        self.root.leaf = false;
    }

    /// Move every word of `other` into `self`, leaving `other` empty.
    /// Subtrees absent from `self` are relinked wholesale; overlapping
    /// paths are walked pairwise with a work list.
    pub fn merge(&mut self, other: &mut Trie) {
        if other.is_empty() {
            return;
        }
        let mut work: Vec<(&mut Node, Box<Node>)> = Vec::new();
        pair_children(&mut self.root, &mut other.root, &mut work);
        while let Some((into, mut from)) = work.pop() {
            pair_children(into, &mut from, &mut work);
        }
    }
}

/// For each child slot: move `from`'s subtree into `into` when the slot is
/// free, otherwise queue the colliding pair for a deeper pass.
fn pair_children<'t>(
    into: &'t mut Node,
    from: &mut Node,
    work: &mut Vec<(&'t mut Node, Box<Node>)>,
) {
    if from.leaf {
        into.leaf = true;
        from.leaf = false;
    }
    for (slot, taken) in into.children.iter_mut().zip(from.children.iter_mut()) {
        if let Some(subtree) = taken.take() {
            match slot {
                None => *slot = Some(subtree),
                Some(existing) => work.push((existing.as_mut(), subtree)),
            }
        }
    }
}

// Box's recursive destructor would otherwise walk the tree on the native
// stack; reuse the iterative teardown.
impl Drop for Trie {
    fn drop(&mut self) {
        self.clear();
    }
}
