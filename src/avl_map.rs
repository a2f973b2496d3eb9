use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

use crate::container::{OrderedContainer, TreeContainer, TreeNode};
use crate::raw::{Handle, RawAvlTree};
use crate::traversal;

mod capacity;

/// An ordered map based on a height-balanced ([AVL]) binary search tree.
///
/// Every node caches the height of its subtree; after each insertion or removal the
/// ancestors of the edited node are revisited bottom-up and rotated wherever the two
/// subtree heights differ by two. The tree is therefore never deeper than about
/// `1.44 * log2(n)`, which makes it the shallowest of the three maps in this crate and
/// a good fit for lookup-heavy indexes.
///
/// Keys are unique. [`insert`](Self::insert) never overwrites; use
/// [`upsert`](Self::upsert) or [`update`](Self::update) to replace a stored value.
///
/// It is a logic error for a key to be modified in such a way that the key's ordering relative to
/// any other key, as determined by the [`Ord`] trait, changes while it is in the map.
///
/// # Examples
///
/// ```
/// use ordered_forest::AvlMap;
///
/// let mut prices = AvlMap::new();
/// prices.insert("pear", 3);
/// prices.insert("apple", 2);
/// prices.insert("fig", 7);
///
/// // Duplicate inserts keep the first value.
/// let ((_, price), inserted) = prices.insert("apple", 9);
/// assert_eq!((*price, inserted), (2, false));
///
/// // Everything from "b" up to, but not including, "p".
/// let middle: Vec<_> = prices.iter(Some(&"b"), Some(&"p")).map(|(k, _)| *k).collect();
/// assert_eq!(middle, ["fig"]);
///
/// assert_eq!(prices.first_greater(&"fig"), Some((&"pear", &3)));
/// assert_eq!(prices.delete(&"pear"), Some(("pear", 3)));
/// assert_eq!(prices.len(), 2);
/// ```
///
/// [AVL]: https://en.wikipedia.org/wiki/AVL_tree
#[derive(Clone)]
pub struct AvlMap<K, V> {
    raw: RawAvlTree<K, V>,
}

/// An ascending iterator over a bounded slice of an [`AvlMap`].
pub type Iter<'a, K, V> = traversal::Iter<'a, Node<'a, K, V>>;

/// A descending iterator over a bounded slice of an [`AvlMap`].
pub type IterReverse<'a, K, V> = traversal::IterReverse<'a, Node<'a, K, V>>;

/// A read-only cursor on one node of an [`AvlMap`].
///
/// Obtained from [`AvlMap::root`] and walked with the [`TreeNode`] methods or the
/// functions in [`traversal`].
pub struct Node<'a, K, V> {
    tree: &'a RawAvlTree<K, V>,
    handle: Handle,
}

impl<'a, K, V> Node<'a, K, V> {
    fn new(tree: &'a RawAvlTree<K, V>, handle: Handle) -> Self {
        Node { tree, handle }
    }

    /// Height of the subtree rooted here; a leaf has height 1.
    #[must_use]
    pub fn height(self) -> usize {
        usize::from(self.tree.node(self.handle).height)
    }
}

impl<K, V> Clone for Node<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Node<'_, K, V> {}

impl<'a, K: 'a, V: 'a> TreeNode<'a> for Node<'a, K, V> {
    type Key = K;
    type Value = V;

    #[inline]
    fn key(self) -> &'a K {
        &self.tree.node(self.handle).key
    }

    #[inline]
    fn value(self) -> &'a V {
        &self.tree.node(self.handle).value
    }

    #[inline]
    fn left(self) -> Option<Self> {
        self.tree.node(self.handle).left.map(|h| Node::new(self.tree, h))
    }

    #[inline]
    fn right(self) -> Option<Self> {
        self.tree.node(self.handle).right.map(|h| Node::new(self.tree, h))
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Node<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.tree.node(self.handle);
        f.debug_struct("Node")
            .field("key", &node.key)
            .field("value", &node.value)
            .field("height", &node.height)
            .finish()
    }
}

impl<K, V> AvlMap<K, V> {
    /// Makes a new, empty `AvlMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> AvlMap<K, V> {
        AvlMap { raw: RawAvlTree::new() }
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Clears the map, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Height of the tree: 0 when empty, 1 for a single element.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let map: AvlMap<u32, ()> = (0..1000).map(|k| (k, ())).collect();
    /// assert!(map.height() <= 14);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.raw.height(self.raw.root()))
    }

    /// The root node, or `None` when the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::{AvlMap, TreeNode, traversal};
    ///
    /// let map = AvlMap::from([(2, 'b'), (1, 'a'), (3, 'c')]);
    /// assert_eq!(map.root().map(|n| *n.key()), Some(2));
    ///
    /// let mut post = Vec::new();
    /// traversal::post_order(map.root(), |n| {
    ///     post.push(*n.key());
    ///     true
    /// });
    /// assert_eq!(post, [1, 3, 2]);
    /// ```
    #[must_use]
    pub fn root(&self) -> Option<Node<'_, K, V>> {
        self.raw.root().map(|h| Node::new(&self.raw, h))
    }

    #[inline]
    fn element(&self, handle: Handle) -> (&K, &V) {
        let node = self.raw.node(handle);
        (&node.key, &node.value)
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns the element now stored under `key` and whether it was freshly inserted.
    /// When the key already exists the stored element is left untouched and `value`
    /// is dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.insert(37, "a"), ((&37, &"a"), true));
    /// assert_eq!(map.insert(37, "b"), ((&37, &"a"), false));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> ((&K, &V), bool) {
        let (handle, inserted) = self.raw.insert(key, value);
        (self.element(handle), inserted)
    }

    /// Inserts `key` with `value`, replacing any element already stored under the key.
    ///
    /// Returns the replaced element, or `None` if the key was new.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.upsert(37, "a"), None);
    /// assert_eq!(map.upsert(37, "b"), Some((37, "a")));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// ```
    pub fn upsert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.raw.upsert(key, value).1
    }

    /// Replaces the element stored under `key` and returns the old one.
    ///
    /// Does nothing and returns `None` if the key is absent.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// assert_eq!(map.update(1, "a"), None);
    /// assert!(map.is_empty());
    ///
    /// map.insert(1, "a");
    /// assert_eq!(map.update(1, "b"), Some((1, "a")));
    /// ```
    pub fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.raw.update(key, value)
    }

    /// Removes the element stored under `key` and hands it back.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.delete(&1), Some((1, "a")));
    /// assert_eq!(map.delete(&1), None);
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the element stored under `key`.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|h| self.element(h))
    }

    /// Returns a reference to the value stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let mut map = AvlMap::new();
    /// map.insert(String::from("a"), 1);
    /// assert_eq!(map.get("a"), Some(&1));
    /// assert_eq!(map.get("b"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).map(|(_, v)| v)
    }

    /// Returns `true` if the map holds an element for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).is_some()
    }

    /// Returns the element with the minimum key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        traversal::first(self.root()).map(TreeNode::element)
    }

    /// Returns the element with the maximum key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        traversal::last(self.root()).map(TreeNode::element)
    }

    /// Calls `f` on each element in `[start, boundary)` in ascending order, stopping
    /// as soon as `f` returns `false`. A `None` bound is open.
    ///
    /// # Complexity
    ///
    /// O(visited + log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let map: AvlMap<i32, ()> = (0..10).map(|k| (k, ())).collect();
    ///
    /// let mut seen = Vec::new();
    /// map.range(Some(&3), Some(&8), |k, _| {
    ///     seen.push(*k);
    ///     *k < 5
    /// });
    /// assert_eq!(seen, [3, 4, 5]);
    /// ```
    pub fn range<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        traversal::range(self.root(), start, boundary, f);
    }

    /// Calls `f` on each element in `[start, boundary)` in descending order, stopping
    /// as soon as `f` returns `false`.
    ///
    /// # Complexity
    ///
    /// O(visited + log n)
    pub fn reverse<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        traversal::reverse(self.root(), start, boundary, f);
    }

    /// Gets an ascending iterator over the elements in `[start, boundary)`.
    ///
    /// The iterator borrows the map, so the map cannot change while it is alive.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::AvlMap;
    ///
    /// let map = AvlMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let mut it = map.iter(Some(&2), None);
    /// assert_eq!(it.next(), Some((&2, &"b")));
    /// assert_eq!(it.next(), Some((&3, &"c")));
    /// assert_eq!(it.next(), None);
    /// ```
    pub fn iter<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> Iter<'a, K, V> {
        traversal::Iter::new(self.root(), start, boundary)
    }

    /// Gets a descending iterator over the elements in `[start, boundary)`.
    pub fn iter_reverse<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> IterReverse<'a, K, V> {
        traversal::IterReverse::new(self.root(), start, boundary)
    }

    /// Returns the element with the greatest key strictly less than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn last_less<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        traversal::last_less(self.root(), key).map(TreeNode::element)
    }

    /// Returns the element with the greatest key less than or equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn last_less_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        traversal::last_less_or_equal(self.root(), key).map(TreeNode::element)
    }

    /// Returns the element with the least key strictly greater than `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn first_greater<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        traversal::first_greater(self.root(), key).map(TreeNode::element)
    }

    /// Returns the element with the least key greater than or equal to `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn first_greater_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        traversal::first_greater_or_equal(self.root(), key).map(TreeNode::element)
    }
}

impl<K: Ord, V> OrderedContainer<K, V> for AvlMap<K, V> {
    type Iter<'a>
        = Iter<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    type IterReverse<'a>
        = IterReverse<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn len(&self) -> usize {
        self.len()
    }

    fn insert(&mut self, key: K, value: V) -> ((&K, &V), bool) {
        self.insert(key, value)
    }

    fn upsert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.upsert(key, value)
    }

    fn delete<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.delete(key)
    }

    fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.update(key, value)
    }

    fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key)
    }

    fn range<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.range(start, boundary, f);
    }

    fn reverse<F>(&self, start: Option<&K>, boundary: Option<&K>, f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.reverse(start, boundary, f);
    }

    fn iter<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> Iter<'a, K, V> {
        self.iter(start, boundary)
    }

    fn iter_reverse<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> IterReverse<'a, K, V> {
        self.iter_reverse(start, boundary)
    }

    fn last_less<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.last_less(key)
    }

    fn last_less_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.last_less_or_equal(key)
    }

    fn first_greater<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.first_greater(key)
    }

    fn first_greater_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.first_greater_or_equal(key)
    }
}

impl<K: Ord, V> TreeContainer<K, V> for AvlMap<K, V> {
    type Node<'a>
        = Node<'a, K, V>
    where
        Self: 'a,
        K: 'a,
        V: 'a;

    fn root(&self) -> Option<Node<'_, K, V>> {
        self.root()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for AvlMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter(None, None).eq(other.iter(None, None))
    }
}

impl<K: Ord, V: Eq> Eq for AvlMap<K, V> {}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for AvlMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter(None, None)).finish()
    }
}

impl<K, V> Default for AvlMap<K, V> {
    fn default() -> Self {
        AvlMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AvlMap::new();
        map.extend(iter);
        map
    }
}

/// Later pairs overwrite earlier ones with the same key.
impl<K: Ord, V> Extend<(K, V)> for AvlMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.upsert(k, v);
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a AvlMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter(None, None)
    }
}

impl<K, Q, V> Index<&Q> for AvlMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
