use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::container::OrderedContainer;
use crate::raw::{Handle, Link, RawSkipList};

mod options;

pub use options::Options;

/// An ordered map based on a [skip list].
///
/// Elements sit on a sorted bottom list; each element is also linked into a random number
/// of "express" levels above it, each level skipping roughly half of the one below. The
/// level of an element is drawn once when it is inserted (a run of fair coin flips, capped
/// by [`Options::with_max_level`]) and never changes, so no mutation ever rebalances
/// anything: inserts and removals only splice links at the levels the element occupies.
/// Searches take O(log n) expected time.
///
/// Ascending walks follow the bottom list directly. The list keeps no back links, so each
/// step of a descending walk is a fresh O(log n) search for the previous key.
///
/// # Examples
///
/// ```
/// use ordered_forest::SkipMap;
/// use ordered_forest::skip_map::Options;
///
/// // A fixed seed makes the level layout reproducible.
/// let mut latency = SkipMap::with_options(Options::new().with_seed(42));
/// for (ms, route) in [(12, "/login"), (3, "/health"), (250, "/report"), (40, "/search")] {
///     latency.insert(ms, route);
/// }
///
/// let slow: Vec<_> = latency.iter(Some(&30), None).map(|(_, route)| *route).collect();
/// assert_eq!(slow, ["/search", "/report"]);
///
/// assert_eq!(latency.last_less_or_equal(&100), Some((&40, &"/search")));
/// assert_eq!(latency.first_greater(&250), None);
/// ```
///
/// [skip list]: https://en.wikipedia.org/wiki/Skip_list
#[derive(Clone)]
pub struct SkipMap<K, V> {
    raw: RawSkipList<K, V>,
}

/// An ascending iterator over a bounded slice of a [`SkipMap`].
pub struct Iter<'a, K, V> {
    list: &'a RawSkipList<K, V>,
    next: Link,
    boundary: Option<&'a K>,
}

/// A descending iterator over a bounded slice of a [`SkipMap`].
pub struct IterReverse<'a, K, V> {
    list: &'a RawSkipList<K, V>,
    next: Link,
    start: Option<&'a K>,
}

impl<K, V> SkipMap<K, V> {
    /// Makes a new, empty `SkipMap` with default [`Options`].
    ///
    /// The level generator is seeded from the operating system.
    #[must_use]
    pub fn new() -> SkipMap<K, V> {
        SkipMap::with_options(Options::new())
    }

    /// Makes a new, empty `SkipMap` configured by `opts`.
    #[must_use]
    pub fn with_options(opts: Options) -> SkipMap<K, V> {
        let rng = match opts.seed() {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        SkipMap {
            raw: RawSkipList::new(opts.max_level(), rng, opts.capacity()),
        }
    }

    /// Makes a new, empty `SkipMap` with room for at least `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> SkipMap<K, V> {
        SkipMap::with_options(Options::new().with_capacity(capacity))
    }

    /// Returns how many elements the map can hold before its node storage reallocates.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the number of elements in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Highest level currently holding an element; 0 for an empty map.
    #[must_use]
    pub fn level(&self) -> usize {
        self.raw.level()
    }

    /// The level cap this map was built with.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.raw.max_level()
    }

    /// Clears the map, removing all elements. The level generator keeps its state.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    #[inline]
    fn element(&self, handle: Handle) -> (&K, &V) {
        let node = self.raw.node(handle);
        (&node.key, &node.value)
    }
}

impl<K: Ord, V> SkipMap<K, V> {
    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns the element now stored under `key` and whether it was freshly inserted.
    /// A duplicate key leaves the stored element and the list's levels untouched.
    ///
    /// # Complexity
    ///
    /// O(log n) expected
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::SkipMap;
    ///
    /// let mut map = SkipMap::new();
    /// assert_eq!(map.insert(37, "a"), ((&37, &"a"), true));
    /// assert_eq!(map.insert(37, "b"), ((&37, &"a"), false));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> ((&K, &V), bool) {
        let (handle, inserted) = self.raw.insert(key, value);
        (self.element(handle), inserted)
    }

    /// Inserts `key` with `value`, replacing any element already stored under the key.
    ///
    /// The replacement is a fresh node linked at exactly the levels the old one occupied.
    /// Returns the replaced element, or `None` if the key was new.
    pub fn upsert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.raw.upsert(key, value).1
    }

    /// Replaces the element stored under `key` and returns the old one.
    ///
    /// Does nothing and returns `None` if the key is absent.
    pub fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.raw.update(key, value)
    }

    /// Removes the element stored under `key` and hands it back.
    ///
    /// # Complexity
    ///
    /// O(log n) expected
    pub fn delete<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Returns the element stored under `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(key).map(|h| self.element(h))
    }

    /// Returns a reference to the value stored under `key`.
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
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|h| self.element(h))
    }

    /// Returns the element with the maximum key.
    ///
    /// # Complexity
    ///
    /// O(log n) expected
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|h| self.element(h))
    }

    /// Calls `f` on each element in `[start, boundary)` in ascending order, stopping
    /// as soon as `f` returns `false`.
    pub fn range<F>(&self, start: Option<&K>, boundary: Option<&K>, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut link = match start {
            Some(start) => self.raw.first_greater_or_equal(start),
            None => self.raw.first(),
        };
        while let Some(handle) = link {
            let node = self.raw.node(handle);
            if boundary.is_some_and(|b| node.key >= *b) || !f(&node.key, &node.value) {
                return;
            }
            link = self.raw.next(handle);
        }
    }

    /// Calls `f` on each element in `[start, boundary)` in descending order, stopping
    /// as soon as `f` returns `false`.
    ///
    /// # Complexity
    ///
    /// O(log n) expected per visited element.
    pub fn reverse<F>(&self, start: Option<&K>, boundary: Option<&K>, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let mut link = match boundary {
            Some(boundary) => self.raw.last_less(boundary),
            None => self.raw.last(),
        };
        while let Some(handle) = link {
            let node = self.raw.node(handle);
            if start.is_some_and(|s| node.key < *s) || !f(&node.key, &node.value) {
                return;
            }
            link = self.raw.last_less(&node.key);
        }
    }

    /// Gets an ascending iterator over the elements in `[start, boundary)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::SkipMap;
    ///
    /// let map = SkipMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let keys: Vec<_> = map.iter(None, Some(&3)).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn iter<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> Iter<'a, K, V> {
        let next = match start {
            Some(start) => self.raw.first_greater_or_equal(start),
            None => self.raw.first(),
        };
        Iter {
            list: &self.raw,
            next,
            boundary,
        }
    }

    /// Gets a descending iterator over the elements in `[start, boundary)`.
    ///
    /// # Complexity
    ///
    /// O(log n) expected per step.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_forest::SkipMap;
    ///
    /// let map = SkipMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let keys: Vec<_> = map.iter_reverse(Some(&2), None).map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [3, 2]);
    /// ```
    pub fn iter_reverse<'a>(&'a self, start: Option<&'a K>, boundary: Option<&'a K>) -> IterReverse<'a, K, V> {
        let next = match boundary {
            Some(boundary) => self.raw.last_less(boundary),
            None => self.raw.last(),
        };
        IterReverse {
            list: &self.raw,
            next,
            start,
        }
    }

    /// Returns the element with the greatest key strictly less than `key`.
    pub fn last_less<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.last_less(key).map(|h| self.element(h))
    }

    /// Returns the element with the greatest key less than or equal to `key`.
    pub fn last_less_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.last_less_or_equal(key).map(|h| self.element(h))
    }

    /// Returns the element with the least key strictly greater than `key`.
    pub fn first_greater<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.first_greater(key).map(|h| self.element(h))
    }

    /// Returns the element with the least key greater than or equal to `key`.
    pub fn first_greater_or_equal<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.first_greater_or_equal(key).map(|h| self.element(h))
    }
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        let node = self.list.node(handle);
        if self.boundary.is_some_and(|b| node.key >= *b) {
            self.next = None;
            return None;
        }
        self.next = self.list.next(handle);
        Some((&node.key, &node.value))
    }
}

impl<K: Ord, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            list: self.list,
            next: self.next,
            boundary: self.boundary,
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K: Ord, V> Iterator for IterReverse<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        let node = self.list.node(handle);
        if self.start.is_some_and(|s| node.key < *s) {
            self.next = None;
            return None;
        }
        self.next = self.list.last_less(&node.key);
        Some((&node.key, &node.value))
    }
}

impl<K: Ord, V> FusedIterator for IterReverse<'_, K, V> {}

impl<K, V> Clone for IterReverse<'_, K, V> {
    fn clone(&self) -> Self {
        IterReverse {
            list: self.list,
            next: self.next,
            start: self.start,
        }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for IterReverse<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K: Ord, V> OrderedContainer<K, V> for SkipMap<K, V> {
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

impl<K: Ord, V: PartialEq> PartialEq for SkipMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter(None, None).eq(other.iter(None, None))
    }
}

impl<K: Ord, V: Eq> Eq for SkipMap<K, V> {}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for SkipMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter(None, None)).finish()
    }
}

impl<K, V> Default for SkipMap<K, V> {
    fn default() -> Self {
        SkipMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SkipMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = SkipMap::new();
        map.extend(iter);
        map
    }
}

/// Later pairs overwrite earlier ones with the same key.
impl<K: Ord, V> Extend<(K, V)> for SkipMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.upsert(k, v);
        }
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a SkipMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter(None, None)
    }
}

impl<K, Q, V> Index<&Q> for SkipMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for SkipMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
