use core::borrow::Borrow;
use core::cmp::Ordering;

use super::arena::Arena;
use super::handle::{Handle, Link};
use super::node::{Color, RbNode, Side};

/// The color-balanced tree backing `RbMap`.
#[derive(Clone)]
pub(crate) struct RawRbTree<K, V> {
    nodes: Arena<RbNode<K, V>>,
    root: Link,
    len: usize,
}

impl<K, V> RawRbTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn root(&self) -> Link {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &RbNode<K, V> {
        self.nodes.get(handle)
    }

    // Absent children count as black.
    #[inline]
    fn is_red(&self, link: Link) -> bool {
        link.is_some_and(|h| self.nodes.get(h).is_red())
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.nodes.get_mut(handle).color = color;
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Link {
        self.nodes.get(handle).parent
    }

    /// The side of `parent` that `child` hangs from. An absent `child` matches an
    /// empty slot.
    fn side_of(&self, parent: Handle, child: Link) -> Side {
        if self.nodes.get(parent).left == child { Side::Left } else { Side::Right }
    }

    /// Points whichever slot of `parent` held `old` (or the root) at `new`.
    fn replace_child(&mut self, parent: Link, old: Handle, new: Link) {
        match parent {
            Some(p) => {
                let side = self.side_of(p, Some(old));
                *self.nodes.get_mut(p).child_mut(side) = new;
            }
            None => self.root = new,
        }
    }

    /// Promotes the child opposite `toward` into `handle`'s position, keeping every
    /// `parent` back link and the root handle consistent.
    fn rotate(&mut self, handle: Handle, toward: Side) {
        let riser = self
            .nodes
            .get(handle)
            .child(toward.flip())
            .expect("`RawRbTree::rotate()` - rotating node has no child to promote!");
        let inner = self.nodes.get(riser).child(toward);
        let parent = self.parent(handle);

        if let Some(i) = inner {
            self.nodes.get_mut(i).parent = Some(handle);
        }
        *self.nodes.get_mut(handle).child_mut(toward.flip()) = inner;
        *self.nodes.get_mut(riser).child_mut(toward) = Some(handle);

        self.nodes.get_mut(riser).parent = parent;
        self.nodes.get_mut(handle).parent = Some(riser);
        self.replace_child(parent, handle, Some(riser));

        #[cfg(feature = "tracing")]
        tracing::trace!(?handle, ?riser, ?toward, "red-black rotation");
    }

    fn blacken_root(&mut self) {
        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Repairs a red-red violation between `node` and its parent, walking upward.
    fn insert_fixup(&mut self, mut node: Handle) {
        while let Some(parent) = self.parent(node) {
            if !self.nodes.get(parent).is_red() {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let grand = self
                .parent(parent)
                .expect("`RawRbTree::insert_fixup()` - red parent has no parent!");
            let side = self.side_of(grand, Some(parent));
            let uncle = self.nodes.get(grand).child(side.flip());

            if self.is_red(uncle) {
                #[cfg(feature = "tracing")]
                tracing::trace!(?grand, "red-black insert: recolor");

                self.set_color(parent, Color::Black);
                if let Some(u) = uncle {
                    self.set_color(u, Color::Black);
                }
                self.set_color(grand, Color::Red);
                node = grand;
                continue;
            }

            // Line up node, parent and grandparent before the final rotation.
            let mut parent = parent;
            if self.nodes.get(parent).child(side.flip()) == Some(node) {
                self.rotate(parent, side);
                parent = node;
            }
            self.set_color(grand, Color::Red);
            self.set_color(parent, Color::Black);
            self.rotate(grand, side.flip());
            break;
        }

        self.blacken_root();
    }

    /// Restores the black-height after a black node was spliced out. `node` is the
    /// child that took its place (possibly absent) and `parent` that child's parent.
    fn remove_fixup(&mut self, mut node: Link, mut parent: Link) {
        loop {
            if let Some(n) = node.filter(|&n| self.nodes.get(n).is_red()) {
                self.set_color(n, Color::Black);
                break;
            }
            let Some(p) = parent else {
                break;
            };

            let side = self.side_of(p, node);
            let mut sibling = self
                .nodes
                .get(p)
                .child(side.flip())
                .expect("`RawRbTree::remove_fixup()` - short side has no sibling!");

            if self.nodes.get(sibling).is_red() {
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.rotate(p, side);
                sibling = self
                    .nodes
                    .get(p)
                    .child(side.flip())
                    .expect("`RawRbTree::remove_fixup()` - rotation left no sibling!");
            }

            let near = self.nodes.get(sibling).child(side);
            let far = self.nodes.get(sibling).child(side.flip());

            if !self.is_red(near) && !self.is_red(far) {
                #[cfg(feature = "tracing")]
                tracing::trace!(?sibling, "red-black remove: push black up");

                self.set_color(sibling, Color::Red);
                node = Some(p);
                parent = self.parent(p);
                continue;
            }

            if !self.is_red(far) {
                let near = near.expect("`RawRbTree::remove_fixup()` - red near nephew is absent!");
                self.set_color(near, Color::Black);
                self.set_color(sibling, Color::Red);
                self.rotate(sibling, side.flip());
                sibling = self
                    .nodes
                    .get(p)
                    .child(side.flip())
                    .expect("`RawRbTree::remove_fixup()` - rotation left no sibling!");
            }

            let far = self
                .nodes
                .get(sibling)
                .child(side.flip())
                .expect("`RawRbTree::remove_fixup()` - red far nephew is absent!");
            let parent_color = self.nodes.get(p).color;
            self.set_color(sibling, parent_color);
            self.set_color(p, Color::Black);
            self.set_color(far, Color::Black);
            self.rotate(p, side);
            break;
        }

        self.blacken_root();
    }

    /// Swaps `old` for a freshly allocated node at the same position and color.
    fn replace_node(&mut self, old: Handle, key: K, value: V) -> (Handle, (K, V)) {
        let (left, right, parent, color) = {
            let node = self.nodes.get(old);
            (node.left, node.right, node.parent, node.color)
        };
        let fresh = self.nodes.alloc(RbNode {
            key,
            value,
            left,
            right,
            parent,
            color,
        });
        for child in [left, right].into_iter().flatten() {
            self.nodes.get_mut(child).parent = Some(fresh);
        }
        self.replace_child(parent, old, Some(fresh));

        let node = self.nodes.take(old);
        (fresh, (node.key, node.value))
    }

    fn swap_payload(&mut self, a: Handle, b: Handle) {
        let (a, b) = self.nodes.get_pair_mut(a, b);
        core::mem::swap(&mut a.key, &mut b.key);
        core::mem::swap(&mut a.value, &mut b.value);
    }
}

/// Where a key lives or would be attached.
enum Probe {
    Found(Handle),
    Vacant { parent: Link, side: Side },
}

impl<K: Ord, V> RawRbTree<K, V> {
    fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            side = match key.cmp(node.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return Probe::Found(handle),
            };
            parent = Some(handle);
            current = node.child(side);
        }

        Probe::Vacant { parent, side }
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.probe(key) {
            Probe::Found(handle) => Some(handle),
            Probe::Vacant { .. } => None,
        }
    }

    fn attach(&mut self, parent: Link, side: Side, key: K, value: V) -> Handle {
        let handle = self.nodes.alloc(RbNode::new(key, value, parent));
        match parent {
            Some(p) => *self.nodes.get_mut(p).child_mut(side) = Some(handle),
            None => self.root = Some(handle),
        }
        self.len += 1;
        self.insert_fixup(handle);
        handle
    }

    /// Inserts `key` unless present. Returns the node holding the key and whether it is new.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        match self.probe(&key) {
            Probe::Found(existing) => (existing, false),
            Probe::Vacant { parent, side } => (self.attach(parent, side, key, value), true),
        }
    }

    pub(crate) fn upsert(&mut self, key: K, value: V) -> (Handle, Option<(K, V)>) {
        match self.probe(&key) {
            Probe::Found(old) => {
                let (fresh, previous) = self.replace_node(old, key, value);
                (fresh, Some(previous))
            }
            Probe::Vacant { parent, side } => (self.attach(parent, side, key, value), None),
        }
    }

    pub(crate) fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        let old = self.search(&key)?;
        let (_, previous) = self.replace_node(old, key, value);
        Some(previous)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut victim = self.search(key)?;

        // Two children: trade payloads with the in-order predecessor and remove that.
        let node = self.nodes.get(victim);
        if let (Some(left), Some(_)) = (node.left, node.right) {
            let mut predecessor = left;
            while let Some(right) = self.nodes.get(predecessor).right {
                predecessor = right;
            }
            self.swap_payload(victim, predecessor);
            victim = predecessor;
        }

        let (child, parent, color) = {
            let node = self.nodes.get(victim);
            (node.left.or(node.right), node.parent, node.color)
        };
        if let Some(c) = child {
            self.nodes.get_mut(c).parent = parent;
        }
        self.replace_child(parent, victim, child);

        if color == Color::Black {
            self.remove_fixup(child, parent);
        }
        self.len -= 1;

        let node = self.nodes.take(victim);
        Some((node.key, node.value))
    }
}
