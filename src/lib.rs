//! Interchangeable ordered maps for Rust.
//!
//! This crate provides three self-balancing ordered key/value indexes that all implement
//! one contract, [`OrderedContainer`]:
//!
//! - [`AvlMap`] - a height-balanced binary search tree
//! - [`RbMap`] - a red-black binary search tree
//! - [`SkipMap`] - a skip list with randomized levels
//!
//! Each keeps its keys unique and sorted and offers point lookup, bounded range walks in
//! either direction, and the four nearest-neighbor queries `last_less`,
//! `last_less_or_equal`, `first_greater` and `first_greater_or_equal`, all in O(log n)
//! (expected, for the skip list).
//!
//! # Example
//!
//! ```
//! use ordered_forest::{AvlMap, OrderedContainer, RbMap, SkipMap};
//!
//! fn nearest<C: OrderedContainer<u32, &'static str>>(index: &C, at: u32) -> Option<&'static str> {
//!     index.last_less_or_equal(&at).map(|(_, name)| *name)
//! }
//!
//! let stations = [(0, "depot"), (12, "mill"), (30, "bridge"), (47, "harbor")];
//!
//! let avl: AvlMap<_, _> = stations.into_iter().collect();
//! let rb: RbMap<_, _> = stations.into_iter().collect();
//! let skip: SkipMap<_, _> = stations.into_iter().collect();
//!
//! assert_eq!(nearest(&avl, 31), Some("bridge"));
//! assert_eq!(nearest(&rb, 31), Some("bridge"));
//! assert_eq!(nearest(&skip, 31), Some("bridge"));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **Arena storage** - Nodes of each map live in one slot arena and link to each other
//!   by index, so rotations and splices never juggle owning pointers
//! - **Shared traversal kernel** - The [`traversal`] module walks any [`TreeNode`] without
//!   recursion: bounded iterators, pre/in/post/reverse-order visits and boundary searches
//! - **`tracing`** (optional feature) - Emits `trace` events for rotations, red-black
//!   fixup cases and skip-list level changes
//!
//! # Element ownership
//!
//! Stored elements are lent out as `(&K, &V)`. Removing or replacing an element hands the
//! old key and value back by value, detached from the structure. Iterators borrow their
//! map, so the map cannot be mutated while one is alive.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod raw;

pub mod avl_map;
pub mod container;
pub mod rb_map;
pub mod skip_map;
pub mod traversal;

pub use avl_map::AvlMap;
pub use container::{OrderedContainer, TreeContainer, TreeNode};
pub use rb_map::RbMap;
pub use skip_map::SkipMap;
