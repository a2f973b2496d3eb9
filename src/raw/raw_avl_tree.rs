use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::{Handle, Link};
use super::node::{AvlNode, Side};

/// The height-balanced tree backing `AvlMap`.
#[derive(Clone)]
pub(crate) struct RawAvlTree<K, V> {
    /// Arena owning every node reachable from `root`.
    nodes: Arena<AvlNode<K, V>>,
    root: Link,
    /// Number of live key-value pairs.
    len: usize,
}

/// One step of a root-to-node descent.
struct PathElement {
    /// Ancestor visited by the descent.
    node: Handle,
    /// Child slot of `node` the descent continued through.
    side: Side,
}

// An AVL tree over 2^32 nodes is at most ~46 levels deep.
type Path = SmallVec<[PathElement; 48]>;

impl<K, V> RawAvlTree<K, V> {
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

    pub(crate) fn node(&self, handle: Handle) -> &AvlNode<K, V> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn height(&self, link: Link) -> u8 {
        link.map_or(0, |h| self.nodes.get(h).height)
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height(node.left).max(self.height(node.right));
        self.nodes.get_mut(handle).height = height;
    }

    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height(node.left)) - i16::from(self.height(node.right))
    }

    /// Promotes the child opposite `toward` into `handle`'s position and returns it.
    ///
    /// `Side::Left` is a left rotation (the right child rises); the promoted node's
    /// inner child is re-parented to `handle`. Both cached heights are recomputed.
    fn rotate(&mut self, handle: Handle, toward: Side) -> Handle {
        let riser = self
            .nodes
            .get(handle)
            .child(toward.flip())
            .expect("`RawAvlTree::rotate()` - rotating node has no child to promote!");
        let inner = self.nodes.get(riser).child(toward);

        *self.nodes.get_mut(handle).child_mut(toward.flip()) = inner;
        *self.nodes.get_mut(riser).child_mut(toward) = Some(handle);

        self.update_height(handle);
        self.update_height(riser);

        #[cfg(feature = "tracing")]
        tracing::trace!(?handle, ?riser, ?toward, "avl rotation");

        riser
    }

    /// Restores the balance of the subtree rooted at `handle`, whose children are
    /// already balanced, and returns the subtree's new root.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let factor = self.balance_factor(handle);
        debug_assert!((-2..=2).contains(&factor), "`RawAvlTree::rebalance()` - balance factor {factor} out of range!");

        let heavy = match factor {
            -1..=1 => {
                self.update_height(handle);
                return handle;
            }
            2 => Side::Left,
            -2 => Side::Right,
            _ => unreachable!("`RawAvlTree::rebalance()` - invalid balance factor {factor}!"),
        };

        let child = self
            .nodes
            .get(handle)
            .child(heavy)
            .expect("`RawAvlTree::rebalance()` - heavy side has no child!");
        let outer = self.height(self.nodes.get(child).child(heavy));
        let inner = self.height(self.nodes.get(child).child(heavy.flip()));

        // Zig-zag: straighten the heavy child first.
        if inner > outer {
            let straightened = self.rotate(child, heavy);
            *self.nodes.get_mut(handle).child_mut(heavy) = Some(straightened);
        }
        self.rotate(handle, heavy.flip())
    }

    /// Points `parent`'s descent slot (or the root) at `child`.
    fn relink(&mut self, parent: Option<&PathElement>, child: Link) {
        match parent {
            Some(p) => *self.nodes.get_mut(p.node).child_mut(p.side) = child,
            None => self.root = child,
        }
    }

    /// Rebalances every ancestor on `path`, deepest first, up to the root.
    fn rebalance_path(&mut self, path: &[PathElement]) {
        for i in (0..path.len()).rev() {
            let node = path[i].node;
            let subtree = self.rebalance(node);
            if subtree != node {
                self.relink(i.checked_sub(1).map(|p| &path[p]), Some(subtree));
            }
        }
    }

    /// Replaces the node at the end of a descent with a freshly allocated node holding
    /// `key`/`value` at the same position, returning the old payload.
    fn replace_node(&mut self, parent: Option<&PathElement>, old: Handle, key: K, value: V) -> (Handle, (K, V)) {
        let (left, right, height) = {
            let node = self.nodes.get(old);
            (node.left, node.right, node.height)
        };
        let fresh = self.nodes.alloc(AvlNode {
            key,
            value,
            left,
            right,
            height,
        });
        self.relink(parent, Some(fresh));

        let node = self.nodes.take(old);
        (fresh, (node.key, node.value))
    }

    fn swap_payload(&mut self, a: Handle, b: Handle) {
        let (a, b) = self.nodes.get_pair_mut(a, b);
        core::mem::swap(&mut a.key, &mut b.key);
        core::mem::swap(&mut a.value, &mut b.value);
    }

    /// Follows `side` links from `start` to the end, recording the descent on `path`.
    fn extreme(&self, start: Handle, side: Side, path: &mut Path) -> Handle {
        let mut current = start;
        while let Some(next) = self.nodes.get(current).child(side) {
            path.push(PathElement { node: current, side });
            current = next;
        }
        current
    }
}

impl<K: Ord, V> RawAvlTree<K, V> {
    /// Descends toward `key`, returning the matching node (if any) and the path to it.
    fn descend<Q>(&self, key: &Q) -> (Option<Handle>, Path)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut path = Path::new();
        let mut current = self.root;

        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let side = match key.cmp(node.key.borrow()) {
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
                Ordering::Equal => return (Some(handle), path),
            };
            path.push(PathElement { node: handle, side });
            current = node.child(side);
        }

        (None, path)
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match key.cmp(node.key.borrow()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Inserts `key` unless present. Returns the node holding the key and whether it is new;
    /// an existing node is left untouched and `value` is dropped.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        let (found, path) = self.descend(&key);
        if let Some(existing) = found {
            return (existing, false);
        }

        let handle = self.nodes.alloc(AvlNode::new(key, value));
        self.relink(path.last(), Some(handle));
        self.len += 1;
        self.rebalance_path(&path);

        (handle, true)
    }

    /// Inserts or replaces. Returns the live node and the replaced payload, if any.
    pub(crate) fn upsert(&mut self, key: K, value: V) -> (Handle, Option<(K, V)>) {
        let (found, path) = self.descend(&key);
        match found {
            Some(old) => {
                let (fresh, previous) = self.replace_node(path.last(), old, key, value);
                (fresh, Some(previous))
            }
            None => {
                let handle = self.nodes.alloc(AvlNode::new(key, value));
                self.relink(path.last(), Some(handle));
                self.len += 1;
                self.rebalance_path(&path);
                (handle, None)
            }
        }
    }

    /// Replaces the node holding `key` wholesale. The structure does not change.
    pub(crate) fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        let (found, path) = self.descend(&key);
        let old = found?;
        let (_, previous) = self.replace_node(path.last(), old, key, value);
        Some(previous)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (found, mut path) = self.descend(key);
        let target = found?;

        // A node with two children trades payloads with its neighbour in the taller
        // subtree, which has at most one child and is spliced out instead.
        let (left, right) = {
            let node = self.nodes.get(target);
            (node.left, node.right)
        };
        let victim = if let (Some(l), Some(r)) = (left, right) {
            let neighbour = if self.height(left) > self.height(right) {
                path.push(PathElement {
                    node: target,
                    side: Side::Left,
                });
                self.extreme(l, Side::Right, &mut path)
            } else {
                path.push(PathElement {
                    node: target,
                    side: Side::Right,
                });
                self.extreme(r, Side::Left, &mut path)
            };
            self.swap_payload(target, neighbour);
            neighbour
        } else {
            target
        };

        let child = {
            let node = self.nodes.get(victim);
            node.left.or(node.right)
        };
        self.relink(path.last(), child);
        self.rebalance_path(&path);
        self.len -= 1;

        let node = self.nodes.take(victim);
        Some((node.key, node.value))
    }
}
