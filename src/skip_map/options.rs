use crate::raw::MAX_LEVEL;

/// Construction options for a [`SkipMap`](super::SkipMap).
///
/// # Examples
///
/// ```
/// use ordered_forest::skip_map::{Options, SkipMap};
///
/// let opts = Options::new().with_max_level(12).with_seed(7).with_capacity(1024);
/// let map: SkipMap<u64, u64> = SkipMap::with_options(opts);
/// assert_eq!(map.max_level(), 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    max_level: usize,
    seed: Option<u64>,
    capacity: usize,
}

impl Default for Options {
    #[inline]
    fn default() -> Options {
        Options::new()
    }
}

impl Options {
    /// Creates a new set of options with the default values.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_level: MAX_LEVEL,
            seed: None,
            capacity: 0,
        }
    }

    /// Sets the highest level a node may be promoted to.
    ///
    /// Values are clamped to `1..=31`. A list with level cap `L` stays logarithmic up
    /// to roughly `2^L` elements.
    ///
    /// The default is `31`.
    ///
    /// ## Example
    ///
    /// ```
    /// use ordered_forest::skip_map::Options;
    ///
    /// assert_eq!(Options::new().with_max_level(0).max_level(), 1);
    /// assert_eq!(Options::new().with_max_level(64).max_level(), 31);
    /// ```
    #[inline]
    #[must_use]
    pub const fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = if max_level < 1 {
            1
        } else if max_level > MAX_LEVEL {
            MAX_LEVEL
        } else {
            max_level
        };
        self
    }

    /// Seeds the level generator, making the shape of the list reproducible.
    ///
    /// By default the generator is seeded from the operating system.
    #[inline]
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Preallocates node storage for `capacity` elements.
    ///
    /// The default is `0`.
    #[inline]
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns the level cap.
    #[inline]
    #[must_use]
    pub const fn max_level(&self) -> usize {
        self.max_level
    }

    /// Returns the seed, if one was set.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Returns the preallocated capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
