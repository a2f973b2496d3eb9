use alloc::vec;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;

use rand::RngCore;
use rand::rngs::SmallRng;
use smallvec::{SmallVec, smallvec};

use super::arena::Arena;
use super::handle::{Handle, Link};
use super::node::SkipNode;

/// Highest level a node may reach; towers hold at most `MAX_LEVEL + 1` links.
pub(crate) const MAX_LEVEL: usize = 31;

/// Per-level predecessors of a key. `None` stands for the head tower.
type Predecessors = SmallVec<[Link; MAX_LEVEL + 1]>;

/// The leveled probabilistic list backing `SkipMap`.
#[derive(Clone)]
pub(crate) struct RawSkipList<K, V> {
    nodes: Arena<SkipNode<K, V>>,
    head: Vec<Link>,
    // Highest level that currently holds a node, 0 when empty.
    level: usize,
    lens: Vec<usize>,
    max_level: usize,
    rng: SmallRng,
}

impl<K, V> RawSkipList<K, V> {
    /// `max_level` must already be clamped to `1..=MAX_LEVEL`.
    pub(crate) fn new(max_level: usize, rng: SmallRng, capacity: usize) -> Self {
        debug_assert!((1..=MAX_LEVEL).contains(&max_level), "`RawSkipList::new()` - `max_level` out of range!");
        Self {
            nodes: Arena::with_capacity(capacity),
            head: vec![None; max_level + 1],
            level: 0,
            lens: vec![0; max_level + 1],
            max_level,
            rng,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.lens[0]
    }

    pub(crate) fn level(&self) -> usize {
        self.level
    }

    pub(crate) fn max_level(&self) -> usize {
        self.max_level
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.head.fill(None);
        self.lens.fill(0);
        self.level = 0;
    }

    pub(crate) fn node(&self, handle: Handle) -> &SkipNode<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) fn first(&self) -> Link {
        self.head[0]
    }

    pub(crate) fn last(&self) -> Link {
        let mut current: Link = None;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next_of(current, level) {
                current = Some(next);
            }
        }
        current
    }

    /// The successor of `handle` on the bottom level.
    #[inline]
    pub(crate) fn next(&self, handle: Handle) -> Link {
        self.nodes.get(handle).next[0]
    }

    #[inline]
    fn next_of(&self, pred: Link, level: usize) -> Link {
        match pred {
            Some(p) => self.nodes.get(p).next[level],
            None => self.head[level],
        }
    }

    #[inline]
    fn set_next(&mut self, pred: Link, level: usize, link: Link) {
        match pred {
            Some(p) => self.nodes.get_mut(p).next[level] = link,
            None => self.head[level] = link,
        }
    }

    // Consecutive fair coin flips, read off the low bits of one draw.
    fn random_level(&mut self) -> usize {
        (self.rng.next_u32().trailing_ones() as usize).min(self.max_level)
    }

    /// Hooks a fresh node in after `preds`, raising the tracked top level when needed.
    fn link_new(&mut self, preds: &Predecessors, key: K, value: V) -> Handle {
        let level = self.random_level();
        if level > self.level {
            #[cfg(feature = "tracing")]
            tracing::trace!(from = self.level, to = level, "skip list level raised");
            self.level = level;
        }

        let handle = self.nodes.alloc(SkipNode::new(key, value, level));
        for (i, &pred) in preds.iter().enumerate().take(level + 1) {
            let next = self.next_of(pred, i);
            self.nodes.get_mut(handle).next[i] = next;
            self.set_next(pred, i, Some(handle));
            self.lens[i] += 1;
        }
        handle
    }

    /// Puts a fresh node with `old`'s tower in every slot that pointed at `old`.
    fn replace_node(&mut self, preds: &Predecessors, old: Handle, key: K, value: V) -> (Handle, (K, V)) {
        let next = self.nodes.get(old).next.clone();
        let level = next.len() - 1;
        let fresh = self.nodes.alloc(SkipNode { key, value, next });
        for (i, &pred) in preds.iter().enumerate().take(level + 1) {
            self.set_next(pred, i, Some(fresh));
        }

        let node = self.nodes.take(old);
        (fresh, (node.key, node.value))
    }
}

impl<K: Ord, V> RawSkipList<K, V> {
    /// Descends from the top level, stopping on each level before the first key that
    /// is not below `key` (or, when `inclusive`, not at or below it).
    fn walk<Q>(&self, key: &Q, inclusive: bool, mut preds: Option<&mut Predecessors>) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current: Link = None;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next_of(current, level) {
                match key.cmp(self.nodes.get(next).key.borrow()) {
                    Ordering::Greater => current = Some(next),
                    Ordering::Equal if inclusive => current = Some(next),
                    _ => break,
                }
            }
            if let Some(preds) = preds.as_deref_mut() {
                preds[level] = current;
            }
        }
        current
    }

    /// Collects the predecessors of `key` on every level and the node holding it, if any.
    fn locate<Q>(&self, key: &Q) -> (Predecessors, Option<Handle>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut preds: Predecessors = smallvec![None; self.max_level + 1];
        let before = self.walk(key, false, Some(&mut preds));
        let found = self.next_of(before, 0).filter(|&h| key.cmp(self.nodes.get(h).key.borrow()) == Ordering::Equal);
        (preds, found)
    }

    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let before = self.walk(key, false, None);
        self.next_of(before, 0).filter(|&h| key.cmp(self.nodes.get(h).key.borrow()) == Ordering::Equal)
    }

    pub(crate) fn last_less<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.walk(key, false, None)
    }

    pub(crate) fn last_less_or_equal<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.walk(key, true, None)
    }

    pub(crate) fn first_greater<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let before = self.walk(key, true, None);
        self.next_of(before, 0)
    }

    pub(crate) fn first_greater_or_equal<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let before = self.walk(key, false, None);
        self.next_of(before, 0)
    }

    /// Inserts `key` unless present. Returns the node holding the key and whether it is new.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, bool) {
        let (preds, found) = self.locate(&key);
        match found {
            Some(existing) => (existing, false),
            None => (self.link_new(&preds, key, value), true),
        }
    }

    pub(crate) fn upsert(&mut self, key: K, value: V) -> (Handle, Option<(K, V)>) {
        let (preds, found) = self.locate(&key);
        match found {
            Some(old) => {
                let (fresh, previous) = self.replace_node(&preds, old, key, value);
                (fresh, Some(previous))
            }
            None => (self.link_new(&preds, key, value), None),
        }
    }

    pub(crate) fn update(&mut self, key: K, value: V) -> Option<(K, V)> {
        let (preds, found) = self.locate(&key);
        let (_, previous) = self.replace_node(&preds, found?, key, value);
        Some(previous)
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (preds, found) = self.locate(key);
        let victim = found?;

        let level = self.nodes.get(victim).level();
        for (i, &pred) in preds.iter().enumerate().take(level + 1) {
            let next = self.nodes.get(victim).next[i];
            self.set_next(pred, i, next);
            self.lens[i] -= 1;
        }

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(to = self.level, "skip list level lowered");
        }

        let node = self.nodes.take(victim);
        Some((node.key, node.value))
    }
}
