use std::cmp;
use std::fmt;

/// Causal ordering between two vector clocks.
///
/// `Concurrent` means each clock has seen an event the other has not. There is
/// no causal order between the two histories; callers must apply their own
/// tie-break (here: the leader's serialization order decides, and election
/// state sync keeps the first candidate found).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CausalOrdering {
    Equal,
    After,
    Before,
    Concurrent,
}

/// A per-node event counter array. Slot index == node id. Every clock in a
/// cluster has one slot per member, and a node only ever increments its own
/// slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VectorClock {
    slots: Vec<u64>,
}

impl VectorClock {
    pub fn new(size: usize) -> Self {
        VectorClock { slots: vec![0; size] }
    }

    pub fn from_slots(slots: Vec<u64>) -> Self {
        VectorClock { slots }
    }

    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Record a local event. Out-of-range indices are a no-op.
    pub fn tick(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot += 1;
        }
    }

    /// Componentwise max over the shared slots. Commutative, idempotent and
    /// associative, so duplicate or out-of-order delivery is harmless.
    pub fn merge(&mut self, other: &VectorClock) {
        for (mine, theirs) in self.slots.iter_mut().zip(other.slots.iter()) {
            *mine = cmp::max(*mine, *theirs);
        }
    }

    /// Unconditional overwrite of the shared slots. Only for authoritative
    /// full-state sync, never for incremental causal receipt.
    pub fn copy_from(&mut self, other: &VectorClock) {
        for (mine, theirs) in self.slots.iter_mut().zip(other.slots.iter()) {
            *mine = *theirs;
        }
    }

    pub fn ordering(&self, other: &VectorClock) -> CausalOrdering {
        let mut any_greater = false;
        let mut any_less = false;

        for (mine, theirs) in self.slots.iter().zip(other.slots.iter()) {
            if mine > theirs {
                any_greater = true;
            } else if mine < theirs {
                any_less = true;
            }
        }

        match (any_greater, any_less) {
            (false, false) => CausalOrdering::Equal,
            (true, false) => CausalOrdering::After,
            (false, true) => CausalOrdering::Before,
            (true, true) => CausalOrdering::Concurrent,
        }
    }

    /// True iff this clock strictly happened-after `other`: at least one slot
    /// greater and none smaller. Concurrent clocks are not "newer".
    pub fn is_newer_than(&self, other: &VectorClock) -> bool {
        self.ordering(other) == CausalOrdering::After
    }
}

impl fmt::Display for VectorClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", slot)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_increments_own_slot_only() {
        let mut clock = VectorClock::new(3);
        clock.tick(1);
        clock.tick(1);
        clock.tick(2);

        assert_eq!(clock.slots(), &[0, 2, 1]);
    }

    #[test]
    fn tick_out_of_range_is_noop() {
        let mut clock = VectorClock::new(2);
        clock.tick(5);

        assert_eq!(clock.slots(), &[0, 0]);
    }

    #[test]
    fn merge_is_commutative() {
        let a = VectorClock::from_slots(vec![3, 0, 7]);
        let b = VectorClock::from_slots(vec![1, 5, 2]);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.slots(), &[3, 5, 7]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut a = VectorClock::from_slots(vec![3, 0, 7]);
        let b = VectorClock::from_slots(vec![1, 5, 2]);

        a.merge(&b);
        let once = a.clone();
        a.merge(&b);

        assert_eq!(a, once);
    }

    #[test]
    fn copy_from_overwrites_even_backwards() {
        let mut a = VectorClock::from_slots(vec![9, 9, 9]);
        a.copy_from(&VectorClock::from_slots(vec![1, 2, 3]));

        assert_eq!(a.slots(), &[1, 2, 3]);
    }

    #[test]
    fn ordering_is_exclusive() {
        let base = VectorClock::from_slots(vec![2, 2, 2]);
        let after = VectorClock::from_slots(vec![2, 3, 2]);
        let concurrent = VectorClock::from_slots(vec![3, 1, 2]);

        assert_eq!(base.ordering(&base.clone()), CausalOrdering::Equal);
        assert_eq!(after.ordering(&base), CausalOrdering::After);
        assert_eq!(base.ordering(&after), CausalOrdering::Before);
        assert_eq!(base.ordering(&concurrent), CausalOrdering::Concurrent);
        assert_eq!(concurrent.ordering(&base), CausalOrdering::Concurrent);
    }

    #[test]
    fn concurrent_is_not_newer() {
        let a = VectorClock::from_slots(vec![3, 1]);
        let b = VectorClock::from_slots(vec![1, 3]);

        assert!(!a.is_newer_than(&b));
        assert!(!b.is_newer_than(&a));

        let newer = VectorClock::from_slots(vec![3, 3]);
        assert!(newer.is_newer_than(&a));
        assert!(!a.is_newer_than(&newer));
    }

    #[test]
    fn display_renders_slot_list() {
        let clock = VectorClock::from_slots(vec![1, 0, 4]);
        assert_eq!(format!("{}", clock), "[1, 0, 4]");
    }
}
