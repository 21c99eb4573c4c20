use std::{
    any::Any,
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
    iter, mem, slice,
};

use log::{debug, trace};

use crate::StoreError;

/// Smallest slot-array length; shrinking never goes below it
pub const MIN_SLOTS: usize = 10;

/// Upper population density as `(numerator, denominator)`.
/// Crossing it on insert doubles the slot array.
const MAX_DENSITY: (usize, usize) = (7, 10);

/// Lower population density as `(numerator, denominator)`.
/// Falling below it on delete halves the slot array.
const MIN_DENSITY: (usize, usize) = (2, 10);

/// Reason attached to `StoreError::InvalidArgument` by `KeyValueStore::from_any`
const ACCEPTED_SHAPES: &str = "expected nothing, a key-value pair or a sequence of key-value pairs";

/// One addressable position of the slot array
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// No pair lives here
    Empty,
    /// Exactly one pair
    Single((K, V)),
    /// Pairs whose keys collided on this index; always holds two or more
    Chain(Vec<(K, V)>),
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<K, V> Slot<K, V> {
    /// Pairs held by the slot, in chain order
    fn entries(&self) -> &[(K, V)] {
        match self {
            Self::Empty => &[],
            Self::Single(pair) => slice::from_ref(pair),
            Self::Chain(chain) => chain,
        }
    }

    /// Mutable view of the pairs held by the slot
    fn entries_mut(&mut self) -> &mut [(K, V)] {
        match self {
            Self::Empty => &mut [],
            Self::Single(pair) => slice::from_mut(pair),
            Self::Chain(chain) => chain,
        }
    }

    /// Consumes the slot, yielding every pair it held
    fn into_entries(self) -> impl Iterator<Item = (K, V)> {
        let (single, chain) = match self {
            Self::Empty => (None, Vec::new()),
            Self::Single(pair) => (Some(pair), Vec::new()),
            Self::Chain(chain) => (None, chain),
        };
        single.into_iter().chain(chain)
    }

    /// Rebuilds a slot from what is left of a chain, collapsing it below two pairs
    fn from_chain(mut chain: Vec<(K, V)>) -> Self {
        if chain.len() > 1 {
            return Self::Chain(chain);
        }
        chain.pop().map_or(Self::Empty, Self::Single)
    }
}

impl<K: Eq, V> Slot<K, V> {
    /// Puts a pair into the slot, returning the value it overwrote.
    /// `None` means the key is new to the slot.
    fn put(&mut self, key: K, value: V) -> Option<V> {
        let (next, displaced) = match mem::take(self) {
            Self::Empty => (Self::Single((key, value)), None),
            Self::Single((existing, old)) if existing == key => {
                (Self::Single((key, value)), Some(old))
            }
            // First collision on this index
            Self::Single(pair) => (Self::Chain(vec![pair, (key, value)]), None),
            Self::Chain(mut chain) => {
                let displaced = match chain.iter_mut().find(|(existing, _)| *existing == key) {
                    Some((_, old)) => Some(mem::replace(old, value)),
                    None => {
                        chain.push((key, value));
                        None
                    }
                };
                (Self::Chain(chain), displaced)
            }
        };
        *self = next;
        displaced
    }

    /// Takes the pair stored under `key` out of the slot.
    /// The slot is left untouched when the key is absent.
    fn take<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match mem::take(self) {
            Self::Empty => None,
            Self::Single(pair) if pair.0.borrow() == key => Some(pair),
            occupied @ Self::Single(_) => {
                *self = occupied;
                None
            }
            Self::Chain(mut chain) => {
                let taken = chain
                    .iter()
                    .position(|(existing, _)| existing.borrow() == key)
                    .map(|at| chain.remove(at));
                *self = Self::from_chain(chain);
                taken
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for Slot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("None"),
            Self::Single((key, value)) => write!(f, "({key:?}, {value:?})"),
            Self::Chain(chain) => {
                f.write_str("[")?;
                for (at, (key, value)) in chain.iter().enumerate() {
                    if at > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({key:?}, {value:?})")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Index of `key` in a slot array of `slot_count` slots
#[allow(clippy::cast_possible_truncation)]
fn slot_index<Q: Hash + ?Sized>(key: &Q, slot_count: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    // The remainder is below `slot_count`, so narrowing back to `usize` is lossless
    hasher.finish().checked_rem(slot_count as u64).unwrap_or_default() as usize
}

/// Puts a pair into the slot array without touching any count
fn place<K: Hash + Eq, V>(slots: &mut [Slot<K, V>], key: K, value: V) -> Option<V> {
    let index = slot_index(&key, slots.len());
    slots.get_mut(index)?.put(key, value)
}

/// A fresh slot array of `slot_count` empty slots
fn empty_slots<K, V>(slot_count: usize) -> Vec<Slot<K, V>> {
    iter::repeat_with(Slot::default).take(slot_count).collect()
}

/// Whether `count` entries over `slot_count` slots exceed `MAX_DENSITY`
fn above_max_density(count: usize, slot_count: usize) -> bool {
    count.saturating_mul(MAX_DENSITY.1) > slot_count.saturating_mul(MAX_DENSITY.0)
}

/// Whether `count` entries over `slot_count` slots fall below `MIN_DENSITY`
fn below_min_density(count: usize, slot_count: usize) -> bool {
    count.saturating_mul(MIN_DENSITY.1) < slot_count.saturating_mul(MIN_DENSITY.0)
}

/// A key-value store built on an array of slots with separate chaining.
///
/// Keys that land on the same slot are kept together in a chain inside that slot.
/// The slot array doubles once the population density passes 0.7 and halves once
/// it drops under 0.2, never going below `MIN_SLOTS` slots.
///
/// Note: This store is not thread-safe. Concurrent mutation must be serialised by the caller.
#[derive(Debug, Clone)]
pub struct KeyValueStore<K, V> {
    /// The slot array; its length never drops below `MIN_SLOTS`
    slots: Vec<Slot<K, V>>,
    /// Number of distinct keys currently stored
    count: usize,
}

impl<K, V> Default for KeyValueStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyValueStore<K, V> {
    /// Creates an empty store with `MIN_SLOTS` slots
    #[must_use]
    pub fn new() -> Self {
        Self::with_slots(MIN_SLOTS)
    }

    /// Creates an empty store with exactly `slot_count` slots
    fn with_slots(slot_count: usize) -> Self {
        trace!("allocating key-value store with {slot_count} slots");
        Self { slots: empty_slots(slot_count), count: 0 }
    }

    /// Returns the number of distinct keys in the store
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the store holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the current length of the slot array
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the current population density, entries per slot
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn population_density(&self) -> f64 {
        self.count as f64 / self.slots.len() as f64
    }

    /// Returns the number of pairs in the most crowded slot
    #[must_use]
    pub fn longest_chain(&self) -> usize {
        self.slots.iter().map(|slot| slot.entries().len()).max().unwrap_or_default()
    }

    /// Returns an iterator over the key-value pairs in slot order
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter(), entries: slice::Iter::default() }
    }

    /// Returns an iterator over the keys in slot order
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in slot order
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Removes every pair and shrinks the slot array back to `MIN_SLOTS`
    pub fn clear(&mut self) {
        self.slots = empty_slots(MIN_SLOTS);
        self.count = 0;
    }
}

impl<K, V> KeyValueStore<K, V>
where
    K: Hash + Eq,
{
    /// Creates a store from a sequence of pairs.
    ///
    /// The slot array starts at twice the number of pairs (at least `MIN_SLOTS`).
    /// Pairs are applied in order, so a later duplicate key overwrites an earlier one.
    #[must_use]
    pub fn from_pairs(pairs: Vec<(K, V)>) -> Self {
        let mut store = Self::with_slots(pairs.len().saturating_mul(2).max(MIN_SLOTS));
        store.extend(pairs);
        store
    }

    /// Creates a store from a dynamically typed argument.
    ///
    /// Accepts `()` for an empty store, a single `(K, V)` pair, or a `Vec<(K, V)>`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidArgument` for any other argument type.
    pub fn from_any(arg: Box<dyn Any>) -> Result<Self, StoreError>
    where
        K: 'static,
        V: 'static,
    {
        if arg.is::<()>() {
            return Ok(Self::new());
        }
        let arg = match arg.downcast::<(K, V)>() {
            Ok(pair) => return Ok(Self::from(*pair)),
            Err(other) => other,
        };
        arg.downcast::<Vec<(K, V)>>()
            .map(|pairs| Self::from_pairs(*pairs))
            .map_err(|_| StoreError::InvalidArgument(ACCEPTED_SHAPES))
    }

    /// The slot `key` addresses in the current slot array
    fn slot<Q: Hash + ?Sized>(&self, key: &Q) -> Option<&Slot<K, V>> {
        self.slots.get(slot_index(key, self.slots.len()))
    }

    /// Retrieves the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is absent.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.slot(key) {
            Some(Slot::Single((existing, value))) if existing.borrow() == key => Ok(value),
            Some(Slot::Chain(chain)) => chain
                .iter()
                .find(|(existing, _)| existing.borrow() == key)
                .map(|(_, value)| value)
                .ok_or(StoreError::NotFound),
            None | Some(Slot::Empty | Slot::Single(_)) => Err(StoreError::NotFound),
        }
    }

    /// Retrieves a mutable reference to the value stored under `key`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is absent.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = slot_index(key, self.slots.len());
        self.slots
            .get_mut(index)
            .and_then(|slot| {
                slot.entries_mut().iter_mut().find(|(existing, _)| existing.borrow() == key)
            })
            .map(|(_, value)| value)
            .ok_or(StoreError::NotFound)
    }

    /// Returns true if `key` is present
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_ok()
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// A new key that pushes the population density past 0.7 doubles the slot array
    /// before this returns.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let displaced = place(&mut self.slots, key, value);

        if displaced.is_none() {
            self.count = self.count.saturating_add(1);
            if above_max_density(self.count, self.slots.len()) {
                self.resize(self.slots.len().saturating_mul(2));
            }
        }

        displaced
    }

    /// Removes `key`, returning the stored key and value.
    ///
    /// A removal that drops the population density under 0.2 halves the slot array
    /// before this returns, unless it is already at `MIN_SLOTS`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is absent; the store is left unchanged.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V), StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = slot_index(key, self.slots.len());
        let pair = self
            .slots
            .get_mut(index)
            .and_then(|slot| slot.take(key))
            .ok_or(StoreError::NotFound)?;

        self.count = self.count.saturating_sub(1);
        let slot_count = self.slots.len();
        if slot_count > MIN_SLOTS && below_min_density(self.count, slot_count) {
            self.resize((slot_count / 2).max(MIN_SLOTS));
        }

        Ok(pair)
    }

    /// Removes `key` from the store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is absent.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<(), StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|_| ())
    }

    /// Removes `key` from the store and returns its value
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key is absent; the store is left unchanged.
    pub fn pop<Q>(&mut self, key: &Q) -> Result<V, StoreError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Moves every pair into a new slot array of `slot_count` slots.
    /// The count is already correct and is left alone.
    fn resize(&mut self, slot_count: usize) {
        debug!(
            "resizing slot array from {} to {} slots ({} entries)",
            self.slots.len(),
            slot_count,
            self.count
        );

        let mut slots = empty_slots(slot_count);
        for (key, value) in mem::take(&mut self.slots).into_iter().flat_map(Slot::into_entries) {
            place(&mut slots, key, value);
        }

        self.slots = slots;
    }
}

impl<K: Hash + Eq, V> From<(K, V)> for KeyValueStore<K, V> {
    fn from(pair: (K, V)) -> Self {
        Self::from_pairs(vec![pair])
    }
}

impl<K: Hash + Eq, V> From<Vec<(K, V)>> for KeyValueStore<K, V> {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for KeyValueStore<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter.into_iter().collect())
    }
}

impl<K: Hash + Eq, V> Extend<(K, V)> for KeyValueStore<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

/// Renders the raw slot array, e.g. `[None, ("a", 1), [("b", 2), ("c", 3)]]`.
/// Meant for diagnostics; the format is not stable.
impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for KeyValueStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (at, slot) in self.slots.iter().enumerate() {
            if at > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{slot}")?;
        }
        f.write_str("]")
    }
}

impl<'a, K, V> IntoIterator for &'a KeyValueStore<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the key-value pairs of the store
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Slots not visited yet
    slots: slice::Iter<'a, Slot<K, V>>,
    /// Remaining pairs of the slot being visited
    entries: slice::Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.entries.next() {
                return Some((key, value));
            }
            self.entries = self.slots.next()?.entries().iter();
        }
    }
}

/// Iterator over the keys of the store
#[derive(Debug, Clone)]
pub struct Keys<'a, K, V> {
    /// Underlying pair iterator
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Iterator over the values of the store
#[derive(Debug, Clone)]
pub struct Values<'a, K, V> {
    /// Underlying pair iterator
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}
