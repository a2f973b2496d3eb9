use smallvec::{SmallVec, smallvec};

use super::handle::Link;

/// Which child slot of a tree node a descent went through.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn flip(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Node color of a red-black tree.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    /// Freshly inserted nodes are red; a red node never has a red child.
    Red,
    /// Counted by the black-height, which is equal on every root-to-leaf path.
    Black,
}

// Height-balanced tree node. A leaf has height 1, an absent child counts as 0.
#[derive(Clone)]
pub(crate) struct AvlNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) height: u8,
}

// Color-balanced tree node. `parent` is a non-owning back link.
#[derive(Clone)]
pub(crate) struct RbNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) parent: Link,
    pub(crate) color: Color,
}

// Skip list node. `next[i]` is the successor on level `i`; `next.len() - 1` is the node's level.
#[derive(Clone)]
pub(crate) struct SkipNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: SmallVec<[Link; 4]>,
}

impl<K, V> AvlNode<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl<K, V> RbNode<K, V> {
    /// New nodes always start red.
    pub(crate) fn new(key: K, value: V, parent: Link) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
            color: Color::Red,
        }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self, side: Side) -> &mut Link {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

impl<K, V> SkipNode<K, V> {
    /// Creates an unlinked node present on levels `0..=level`.
    pub(crate) fn new(key: K, value: V, level: usize) -> Self {
        Self {
            key,
            value,
            next: smallvec![None; level + 1],
        }
    }

    #[inline]
    pub(crate) fn level(&self) -> usize {
        self.next.len() - 1
    }
}
