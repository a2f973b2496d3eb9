//! Stack-driven walks and boundary searches over any binary search tree.
//!
//! Every function here takes an optional root [`TreeNode`] cursor, so the same code serves
//! [`AvlMap`](crate::AvlMap), [`RbMap`](crate::RbMap) and any other tree exposing
//! [`TreeContainer::root`](crate::TreeContainer::root). None of them recurse; the deepest
//! stack they keep is one entry per tree level.
//!
//! Bounded walks cover `start <= key < boundary`. Subtrees lying wholly outside the bounds
//! are never entered.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use crate::container::TreeNode;

// Balanced trees below 2^32 nodes stay inline.
type Stack<N> = SmallVec<[N; 48]>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

/// Pushes the in-bound spine of `link` onto `stack`, nearest-first for `direction`.
fn fill<'a, N>(stack: &mut Stack<N>, mut link: Option<N>, start: Option<&N::Key>, boundary: Option<&N::Key>, direction: Direction)
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
    while let Some(node) = link {
        if start.is_some_and(|s| node.key() < s) {
            link = node.right();
            continue;
        }
        if boundary.is_some_and(|b| node.key() >= b) {
            link = node.left();
            continue;
        }
        stack.push(node);
        link = match direction {
            Direction::Forward => node.left(),
            Direction::Reverse => node.right(),
        };
    }
}

/// Calls `f` on every element in `[start, boundary)` in ascending order until it returns `false`.
///
/// # Complexity
///
/// O(visited + log n)
pub fn range<'a, N, F>(root: Option<N>, start: Option<&N::Key>, boundary: Option<&N::Key>, mut f: F)
where
    N: TreeNode<'a>,
    N::Key: Ord,
    F: FnMut(&'a N::Key, &'a N::Value) -> bool,
{
    let mut stack = Stack::new();
    fill(&mut stack, root, start, boundary, Direction::Forward);
    while let Some(node) = stack.pop() {
        if !f(node.key(), node.value()) {
            return;
        }
        fill(&mut stack, node.right(), start, boundary, Direction::Forward);
    }
}

/// Calls `f` on every element in `[start, boundary)` in descending order until it returns `false`.
///
/// # Complexity
///
/// O(visited + log n)
pub fn reverse<'a, N, F>(root: Option<N>, start: Option<&N::Key>, boundary: Option<&N::Key>, mut f: F)
where
    N: TreeNode<'a>,
    N::Key: Ord,
    F: FnMut(&'a N::Key, &'a N::Value) -> bool,
{
    let mut stack = Stack::new();
    fill(&mut stack, root, start, boundary, Direction::Reverse);
    while let Some(node) = stack.pop() {
        if !f(node.key(), node.value()) {
            return;
        }
        fill(&mut stack, node.left(), start, boundary, Direction::Reverse);
    }
}

/// A lazy ascending walk over `[start, boundary)`.
///
/// Created by [`Iter::new`] or a tree map's `iter` method.
pub struct Iter<'a, N: TreeNode<'a>> {
    stack: Stack<N>,
    start: Option<&'a N::Key>,
    boundary: Option<&'a N::Key>,
}

impl<'a, N> Iter<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
    /// Positions a new iterator on the least in-bound node below `root`.
    pub fn new(root: Option<N>, start: Option<&'a N::Key>, boundary: Option<&'a N::Key>) -> Self {
        let mut stack = Stack::new();
        fill(&mut stack, root, start, boundary, Direction::Forward);
        Iter { stack, start, boundary }
    }
}

impl<'a, N> Iterator for Iter<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
    type Item = (&'a N::Key, &'a N::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        fill(&mut self.stack, node.right(), self.start, self.boundary, Direction::Forward);
        Some(node.element())
    }
}

impl<'a, N> FusedIterator for Iter<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
}

impl<'a, N: TreeNode<'a>> Clone for Iter<'a, N> {
    fn clone(&self) -> Self {
        Iter {
            stack: self.stack.clone(),
            start: self.start,
            boundary: self.boundary,
        }
    }
}

impl<'a, N: TreeNode<'a>> fmt::Debug for Iter<'a, N>
where
    N::Key: fmt::Debug,
    N::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stack.iter().rev().map(|n| n.element())).finish()
    }
}

/// A lazy descending walk over `[start, boundary)`.
///
/// Created by [`IterReverse::new`] or a tree map's `iter_reverse` method.
pub struct IterReverse<'a, N: TreeNode<'a>> {
    stack: Stack<N>,
    start: Option<&'a N::Key>,
    boundary: Option<&'a N::Key>,
}

impl<'a, N> IterReverse<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
    /// Positions a new iterator on the greatest in-bound node below `root`.
    pub fn new(root: Option<N>, start: Option<&'a N::Key>, boundary: Option<&'a N::Key>) -> Self {
        let mut stack = Stack::new();
        fill(&mut stack, root, start, boundary, Direction::Reverse);
        IterReverse { stack, start, boundary }
    }
}

impl<'a, N> Iterator for IterReverse<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
    type Item = (&'a N::Key, &'a N::Value);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        fill(&mut self.stack, node.left(), self.start, self.boundary, Direction::Reverse);
        Some(node.element())
    }
}

impl<'a, N> FusedIterator for IterReverse<'a, N>
where
    N: TreeNode<'a>,
    N::Key: Ord,
{
}

impl<'a, N: TreeNode<'a>> Clone for IterReverse<'a, N> {
    fn clone(&self) -> Self {
        IterReverse {
            stack: self.stack.clone(),
            start: self.start,
            boundary: self.boundary,
        }
    }
}

impl<'a, N: TreeNode<'a>> fmt::Debug for IterReverse<'a, N>
where
    N::Key: fmt::Debug,
    N::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.stack.iter().rev().map(|n| n.element())).finish()
    }
}

/// Visits nodes left, middle, right until `f` returns `false`.
pub fn in_order<'a, N, F>(root: Option<N>, mut f: F)
where
    N: TreeNode<'a>,
    F: FnMut(N) -> bool,
{
    let mut stack: Stack<N> = Stack::new();
    let mut link = root;
    loop {
        while let Some(node) = link {
            stack.push(node);
            link = node.left();
        }
        let Some(node) = stack.pop() else {
            return;
        };
        if !f(node) {
            return;
        }
        link = node.right();
    }
}

/// Visits nodes middle, left, right until `f` returns `false`.
pub fn pre_order<'a, N, F>(root: Option<N>, mut f: F)
where
    N: TreeNode<'a>,
    F: FnMut(N) -> bool,
{
    let mut stack: Stack<N> = Stack::new();
    let mut link = root;
    loop {
        while let Some(node) = link {
            if !f(node) {
                return;
            }
            stack.push(node);
            link = node.left();
        }
        let Some(node) = stack.pop() else {
            return;
        };
        link = node.right();
    }
}

/// Visits nodes left, right, middle until `f` returns `false`.
pub fn post_order<'a, N, F>(root: Option<N>, mut f: F)
where
    N: TreeNode<'a>,
    F: FnMut(N) -> bool,
{
    // The flag marks nodes whose right subtree has already been pushed.
    let mut stack: SmallVec<[(N, bool); 48]> = SmallVec::new();
    let mut link = root;
    loop {
        while let Some(node) = link {
            stack.push((node, false));
            link = node.left();
        }
        let Some((node, expanded)) = stack.pop() else {
            return;
        };
        if expanded {
            if !f(node) {
                return;
            }
        } else {
            stack.push((node, true));
            link = node.right();
        }
    }
}

/// Visits nodes right, middle, left until `f` returns `false`.
pub fn reverse_order<'a, N, F>(root: Option<N>, mut f: F)
where
    N: TreeNode<'a>,
    F: FnMut(N) -> bool,
{
    let mut stack: Stack<N> = Stack::new();
    let mut link = root;
    loop {
        while let Some(node) = link {
            stack.push(node);
            link = node.right();
        }
        let Some(node) = stack.pop() else {
            return;
        };
        if !f(node) {
            return;
        }
        link = node.left();
    }
}

/// The leftmost node.
pub fn first<'a, N: TreeNode<'a>>(root: Option<N>) -> Option<N> {
    let mut node = root?;
    while let Some(left) = node.left() {
        node = left;
    }
    Some(node)
}

/// The rightmost node.
pub fn last<'a, N: TreeNode<'a>>(root: Option<N>) -> Option<N> {
    let mut node = root?;
    while let Some(right) = node.right() {
        node = right;
    }
    Some(node)
}

/// The node with the greatest key `< key`.
///
/// # Complexity
///
/// O(height)
pub fn last_less<'a, N, Q>(root: Option<N>, key: &Q) -> Option<N>
where
    N: TreeNode<'a>,
    N::Key: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut best = None;
    let mut link = root;
    while let Some(node) = link {
        if key.cmp(node.key().borrow()) == Ordering::Greater {
            best = Some(node);
            link = node.right();
        } else {
            link = node.left();
        }
    }
    best
}

/// The node with the greatest key `<= key`.
///
/// # Complexity
///
/// O(height)
pub fn last_less_or_equal<'a, N, Q>(root: Option<N>, key: &Q) -> Option<N>
where
    N: TreeNode<'a>,
    N::Key: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut best = None;
    let mut link = root;
    while let Some(node) = link {
        match key.cmp(node.key().borrow()) {
            Ordering::Equal => return Some(node),
            Ordering::Greater => {
                best = Some(node);
                link = node.right();
            }
            Ordering::Less => link = node.left(),
        }
    }
    best
}

/// The node with the least key `> key`.
///
/// # Complexity
///
/// O(height)
pub fn first_greater<'a, N, Q>(root: Option<N>, key: &Q) -> Option<N>
where
    N: TreeNode<'a>,
    N::Key: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut best = None;
    let mut link = root;
    while let Some(node) = link {
        if key.cmp(node.key().borrow()) == Ordering::Less {
            best = Some(node);
            link = node.left();
        } else {
            link = node.right();
        }
    }
    best
}

/// The node with the least key `>= key`.
///
/// # Complexity
///
/// O(height)
pub fn first_greater_or_equal<'a, N, Q>(root: Option<N>, key: &Q) -> Option<N>
where
    N: TreeNode<'a>,
    N::Key: Borrow<Q>,
    Q: ?Sized + Ord,
{
    let mut best = None;
    let mut link = root;
    while let Some(node) = link {
        match key.cmp(node.key().borrow()) {
            Ordering::Equal => return Some(node),
            Ordering::Less => {
                best = Some(node);
                link = node.left();
            }
            Ordering::Greater => link = node.right(),
        }
    }
    best
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    /// Heap-indexed static tree: slot `i` has children `2i + 1` and `2i + 2`.
    #[derive(Clone, Copy)]
    struct Slot<'a> {
        keys: &'a [Option<i32>],
        index: usize,
    }

    impl<'a> Slot<'a> {
        fn at(keys: &'a [Option<i32>], index: usize) -> Option<Self> {
            keys.get(index).copied().flatten().map(|_| Slot { keys, index })
        }
    }

    impl<'a> TreeNode<'a> for Slot<'a> {
        type Key = i32;
        type Value = i32;

        fn key(self) -> &'a i32 {
            self.keys[self.index].as_ref().unwrap()
        }

        fn value(self) -> &'a i32 {
            self.key()
        }

        fn left(self) -> Option<Self> {
            Slot::at(self.keys, 2 * self.index + 1)
        }

        fn right(self) -> Option<Self> {
            Slot::at(self.keys, 2 * self.index + 2)
        }
    }

    //         40
    //      20      60
    //    10  30  50  70
    const TREE: [Option<i32>; 7] = [Some(40), Some(20), Some(60), Some(10), Some(30), Some(50), Some(70)];

    fn keys<'a>(it: impl Iterator<Item = (&'a i32, &'a i32)>) -> Vec<i32> {
        it.map(|(k, _)| *k).collect()
    }

    fn key(node: Option<Slot<'_>>) -> Option<i32> {
        node.map(|n| *n.key())
    }

    fn collect(visit: impl FnOnce(&mut dyn FnMut(Slot<'_>) -> bool)) -> Vec<i32> {
        let mut out = Vec::new();
        visit(&mut |n| {
            out.push(*n.key());
            true
        });
        out
    }

    #[test]
    fn walk_orders() {
        let root = Slot::at(&TREE, 0);
        assert_eq!(collect(|f| in_order(root, f)), [10, 20, 30, 40, 50, 60, 70]);
        assert_eq!(collect(|f| pre_order(root, f)), [40, 20, 10, 30, 60, 50, 70]);
        assert_eq!(collect(|f| post_order(root, f)), [10, 30, 20, 50, 70, 60, 40]);
        assert_eq!(collect(|f| reverse_order(root, f)), [70, 60, 50, 40, 30, 20, 10]);
    }

    #[test]
    fn walks_stop_early() {
        let root = Slot::at(&TREE, 0);
        let mut seen = Vec::new();
        post_order(root, |n| {
            seen.push(*n.key());
            seen.len() < 3
        });
        assert_eq!(seen, [10, 30, 20]);

        let mut seen = Vec::new();
        range(root, Some(&15), None, |k, _| {
            seen.push(*k);
            *k < 40
        });
        assert_eq!(seen, [20, 30, 40]);
    }

    #[test]
    fn empty_tree() {
        let root: Option<Slot<'_>> = None;
        assert!(collect(|f| in_order(root, f)).is_empty());
        assert_eq!(Iter::new(root, None, None).count(), 0);
        assert!(first(root).is_none());
        assert!(last_less(root, &5).is_none());
    }

    #[test]
    fn bounded_iterators() {
        let root = Slot::at(&TREE, 0);

        assert_eq!(keys(Iter::new(root, Some(&20), Some(&60))), [20, 30, 40, 50]);
        assert_eq!(keys(IterReverse::new(root, Some(&20), Some(&60))), [50, 40, 30, 20]);
        assert_eq!(keys(Iter::new(root, Some(&45), None)), [50, 60, 70]);
        assert_eq!(keys(IterReverse::new(root, None, Some(&45))), [40, 30, 20, 10]);
        assert!(keys(Iter::new(root, Some(&60), Some(&60))).is_empty());
        assert!(keys(Iter::new(root, Some(&65), Some(&27))).is_empty());
    }

    #[test]
    fn iterator_is_fused() {
        let root = Slot::at(&TREE, 0);
        let mut it = Iter::new(root, Some(&70), None);
        assert_eq!(it.next(), Some((&70, &70)));
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn boundary_queries() {
        let root = Slot::at(&TREE, 0);

        assert_eq!(key(last_less(root, &10)), None);
        assert_eq!(key(last_less(root, &41)), Some(40));
        assert_eq!(key(last_less_or_equal(root, &30)), Some(30));
        assert_eq!(key(last_less_or_equal(root, &9)), None);
        assert_eq!(key(first_greater(root, &30)), Some(40));
        assert_eq!(key(first_greater(root, &70)), None);
        assert_eq!(key(first_greater_or_equal(root, &55)), Some(60));
        assert_eq!(key(first_greater_or_equal(root, &71)), None);
        assert_eq!(key(first(root)), Some(10));
        assert_eq!(key(last(root)), Some(70));
    }

    proptest! {
        #[test]
        fn range_matches_filter(start in proptest::option::of(0i32..80), boundary in proptest::option::of(0i32..80)) {
            let root = Slot::at(&TREE, 0);
            let expected: Vec<i32> = (1..=7)
                .map(|k| k * 10)
                .filter(|k| start.is_none_or(|s| *k >= s) && boundary.is_none_or(|b| *k < b))
                .collect();

            let mut visited = Vec::new();
            range(root, start.as_ref(), boundary.as_ref(), |k, _| {
                visited.push(*k);
                true
            });
            prop_assert_eq!(&visited, &expected);

            let forward: Vec<i32> = Iter::new(root, start.as_ref(), boundary.as_ref()).map(|(k, _)| *k).collect();
            prop_assert_eq!(&forward, &expected);

            let mut backward = Vec::new();
            reverse(root, start.as_ref(), boundary.as_ref(), |k, _| {
                backward.push(*k);
                true
            });
            backward.reverse();
            prop_assert_eq!(&backward, &expected);

            let mut lazy_backward: Vec<i32> =
                IterReverse::new(root, start.as_ref(), boundary.as_ref()).map(|(k, _)| *k).collect();
            lazy_backward.reverse();
            prop_assert_eq!(&lazy_backward, &expected);
        }
    }
}
