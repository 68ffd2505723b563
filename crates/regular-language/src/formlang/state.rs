//! State handles and state sets shared by every automaton representation.

use fixedbitset::FixedBitSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A state handle. Handles are dense: an automaton with `n` states owns
/// exactly the handles `0..n`.
pub type StateId = u32;

/// A set of state handles backed by a growable bit set.
///
/// Equality and hashing look only at membership, never at the capacity of
/// the underlying bit set, so two sets discovered along different paths
/// compare equal whenever they hold the same states.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    /// Create a new empty state set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty state set with room for `capacity` handles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a state set containing a single state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state. Returns `true` if it was not already present.
    pub fn insert(&mut self, state: StateId) -> bool {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        !self.bits.put(idx)
    }

    /// Check if the set contains a state.
    pub fn contains(&self, state: StateId) -> bool {
        let idx = state as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    /// Remove a state from the set.
    pub fn remove(&mut self, state: StateId) {
        let idx = state as usize;
        if idx < self.bits.len() {
            self.bits.set(idx, false);
        }
    }

    /// Check if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Get the number of states in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over all states in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// The smallest state in the set.
    pub fn first(&self) -> Option<StateId> {
        self.iter().next()
    }

    /// Union this set with another, modifying self in place.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Check if this set intersects with another.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits.intersection(&other.bits).next().is_some()
    }

    /// Create a new set that is the intersection of this set and another.
    pub fn intersection(&self, other: &StateSet) -> StateSet {
        self.bits
            .intersection(&other.bits)
            .map(|i| i as StateId)
            .collect()
    }

    /// Create a new set with the states of `self` that are not in `other`.
    pub fn difference(&self, other: &StateSet) -> StateSet {
        self.bits
            .difference(&other.bits)
            .map(|i| i as StateId)
            .collect()
    }

    /// Rewrite every handle through `mapping`, dropping the ones that map to
    /// `None`.
    pub fn remap(&self, mapping: &[Option<StateId>]) -> StateSet {
        self.iter()
            .filter_map(|state| mapping[state as usize])
            .collect()
    }

    /// Remove every state, keeping the capacity.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// The members as a sorted vector.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for member in self.iter() {
            member.hash(state);
        }
        self.len().hash(state);
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, iter: I) {
        for state in iter {
            self.insert(state);
        }
    }
}
