//! The contract shared by every ordered map in this crate.
//!
//! [`OrderedContainer`] is implemented identically by [`AvlMap`](crate::AvlMap),
//! [`RbMap`](crate::RbMap) and [`SkipMap`](crate::SkipMap), so code written against it
//! does not care which structure backs the index. The two trees additionally implement
//! [`TreeContainer`], exposing their root as a read-only [`TreeNode`] cursor for the
//! walks in [`traversal`](crate::traversal).

use core::borrow::Borrow;
use core::iter::FusedIterator;

/// A read-only cursor on one node of a binary search tree.
///
/// Cursors are cheap copies borrowing the tree for `'a`; they cannot relink anything.
pub trait TreeNode<'a>: Copy {
    /// Key type stored in the tree.
    type Key: 'a;
    /// Value type stored in the tree.
    type Value: 'a;

    /// The key stored in this node.
    fn key(self) -> &'a Self::Key;

    /// The value stored in this node.
    fn value(self) -> &'a Self::Value;

    /// Root of the left subtree, if any.
    fn left(self) -> Option<Self>;

    /// Root of the right subtree, if any.
    fn right(self) -> Option<Self>;

    /// The key/value pair stored in this node.
    #[inline]
    fn element(self) -> (&'a Self::Key, &'a Self::Value) {
        (self.key(), self.value())
    }
}

/// An index of unique, ordered keys mapped to values.
///
/// Elements are handed out as `(&K, &V)` while stored and as owned `(K, V)` once they
/// leave the container. Every bounded query covers `start <= key < boundary`; a `None`
/// bound is open.
///
/// # Examples
///
/// ```
/// use ordered_forest::{AvlMap, OrderedContainer, RbMap, SkipMap};
///
/// fn index<C: OrderedContainer<u32, &'static str> + Default>() -> C {
///     let mut c = C::default();
///     c.insert(3, "c");
///     c.insert(1, "a");
///     c.insert(2, "b");
///     c
/// }
///
/// let avl: AvlMap<_, _> = index();
/// let rb: RbMap<_, _> = index();
/// let skip: SkipMap<_, _> = index();
///
/// assert!(avl.iter(None, None).eq(rb.iter(None, None)));
/// assert!(rb.iter(None, None).eq(skip.iter(None, None)));
/// assert_eq!(skip.first_greater(&1), Some((&2, &"b")));
/// ```
pub trait OrderedContainer<K: Ord, V> {
    /// Ascending iterator returned by [`iter`](Self::iter).
    type Iter<'a>: Iterator<Item = (&'a K, &'a V)> + FusedIterator
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Descending iterator returned by [`iter_reverse`](Self::iter_reverse).
    type IterReverse<'a>: Iterator<Item = (&'a K, &'a V)> + FusedIterator
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// Number of live elements.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `key` if absent. Returns the stored element and whether it was inserted;
    /// an existing element is left untouched and `value` is dropped.
    fn insert(&mut self, key: K, value: V) -> ((&K, &V), bool);

    /// Inserts or overwrites. Returns the replaced element, or `None` if `key` was new.
    fn upsert(&mut self, key: K, value: V) -> Option<(K, V)>;

    /// Removes and returns the element stored under `key`.
    fn delete<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;

    /// Overwrites an existing element and returns the old one. Never inserts.
    fn update(&mut self, key: K, value: V) -> Option<(K, V)>;

    /// Looks up the element stored under `key`.
    fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;

    /// Calls `f` on every element in `[start, boundary)` in ascending order until it returns `false`.
    fn range<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool;

    /// Calls `f` on every element in `[start, boundary)` in descending order until it returns `false`.
    fn reverse<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool;

    /// Lazily yields the elements in `[start, boundary)` in ascending order.
    fn iter<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> Self::Iter<'a>;

    /// Lazily yields the elements in `[start, boundary)` in descending order.
    fn iter_reverse<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> Self::IterReverse<'a>;

    /// The greatest element whose key is `< key`.
    fn last_less<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;

    /// The greatest element whose key is `<= key`.
    fn last_less_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;

    /// The least element whose key is `> key`.
    fn first_greater<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;

    /// The least element whose key is `>= key`.
    fn first_greater_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord;
}

/// An [`OrderedContainer`] shaped as a binary search tree.
pub trait TreeContainer<K: Ord, V>: OrderedContainer<K, V> {
    /// Cursor type handed out by [`root`](Self::root).
    type Node<'a>: TreeNode<'a, Key = K, Value = V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    /// The root node, or `None` for an empty tree.
    fn root(&self) -> Option<Self::Node<'_>>;
}
