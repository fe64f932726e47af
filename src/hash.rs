//! DJB2 digest and the `Hashable` key capability.
//!
//! The cache buckets keys with a deterministic, seedless digest so that the
//! same key always lands in the same chain across runs. The digest is computed
//! once per entry (see [`Entry`](crate::ds::Entry)) and cached.
//!
//! ## Algorithm
//!
//! ```text
//!   acc = 5381
//!   for b in bytes:
//!       acc = acc * 33 + b        (wrapping u64)
//! ```
//!
//! ## Key Components
//!
//! - [`djb2`]: digest of a byte slice.
//! - [`Hashable`]: key capability used by the table (`digest()`), paired with `Eq`.
//! - [`Djb2Hasher`] / [`BuildDjb2`]: `std::hash::Hasher` adapter over the same fold.
//! - [`HashedKey`]: adapts any `Hash + Eq` type to [`Hashable`].
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::hash::{djb2, Hashable, DJB2_SEED};
//!
//! assert_eq!(djb2(b""), DJB2_SEED);
//! assert_eq!("abc".digest(), String::from("abc").digest());
//! ```

use std::borrow::Cow;
use std::hash::{BuildHasherDefault, Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

/// Initial accumulator value; also the digest of empty input.
pub const DJB2_SEED: u64 = 5381;

/// Folds `bytes` into `acc` using the DJB2 step (`acc * 33 + b`).
#[inline]
fn fold(acc: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(acc, |acc, &b| (acc << 5).wrapping_add(acc).wrapping_add(u64::from(b)))
}

/// Returns the DJB2 digest of `bytes`.
///
/// # Example
///
/// ```
/// use lrukit::hash::djb2;
///
/// // 5381 * 33 + 'a'
/// assert_eq!(djb2(b"a"), 5381 * 33 + 97);
/// ```
#[inline]
pub fn djb2(bytes: &[u8]) -> u64 {
    fold(DJB2_SEED, bytes)
}

/// Key capability: a stable digest used to pick a bucket.
///
/// Implementations must agree with `Eq`: equal keys produce equal digests.
/// Borrowed and owned forms of the same text (`str`/`String`) hash identically
/// so that lookups can be made with either.
pub trait Hashable {
    /// Returns the bucketing digest for this key.
    fn digest(&self) -> u64;
}

impl<T: Hashable + ?Sized> Hashable for &T {
    #[inline]
    fn digest(&self) -> u64 {
        (**self).digest()
    }
}

impl Hashable for [u8] {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self)
    }
}

impl Hashable for Vec<u8> {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self)
    }
}

impl Hashable for str {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for String {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for Box<str> {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for Arc<str> {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for Rc<str> {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for Cow<'_, str> {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(self.as_bytes())
    }
}

impl Hashable for char {
    #[inline]
    fn digest(&self) -> u64 {
        let mut buf = [0u8; 4];
        djb2(self.encode_utf8(&mut buf).as_bytes())
    }
}

impl Hashable for bool {
    #[inline]
    fn digest(&self) -> u64 {
        djb2(&[u8::from(*self)])
    }
}

macro_rules! impl_hashable_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Hashable for $ty {
                #[inline]
                fn digest(&self) -> u64 {
                    djb2(&self.to_le_bytes())
                }
            }
        )*
    };
}

impl_hashable_for_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// `Hasher` that folds every written byte with DJB2.
///
/// Integer writes go through `Hasher`'s default byte encoding, so the result
/// for a given type matches `djb2` over the bytes that type's `Hash` impl emits.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher {
    state: u64,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Self { state: DJB2_SEED }
    }
}

impl Hasher for Djb2Hasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.state = fold(self.state, bytes);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// `BuildHasher` producing [`Djb2Hasher`]s.
pub type BuildDjb2 = BuildHasherDefault<Djb2Hasher>;

/// Adapts any `Hash + Eq` type into a [`Hashable`] key.
///
/// # Example
///
/// ```
/// use lrukit::LruCache;
/// use lrukit::hash::HashedKey;
///
/// #[derive(Debug, PartialEq, Eq, Hash)]
/// struct PageId { file: u32, page: u32 }
///
/// let mut cache = LruCache::new(4);
/// cache.set(HashedKey(PageId { file: 1, page: 7 }), "page");
/// assert!(cache.contains(&HashedKey(PageId { file: 1, page: 7 })));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HashedKey<T>(pub T);

impl<T> HashedKey<T> {
    /// Returns the wrapped key.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Hash> Hashable for HashedKey<T> {
    #[inline]
    fn digest(&self) -> u64 {
        let mut hasher = Djb2Hasher::default();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}
