use std::fmt::Display;

use indexmap::IndexSet;

/// Default number of distinct context labels a histogram run may observe.
pub const DEFAULT_CONTEXT_CAPACITY: usize = 10;

/// Raised when one more distinct context label would exceed the registry
/// capacity. Aborts the current input file, not the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextCapacityError {
    label: String,
    capacity: usize,
}

impl ContextCapacityError {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Display for ContextCapacityError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "exceeded context limit ({}) with label \"{}\"",
            self.capacity, self.label
        )
    }
}

impl std::error::Error for ContextCapacityError {}

/// Bounded, insertion-ordered mapping from context label to a stable slot.
///
/// Slots are assigned in first-seen order and never move; the bucket arenas
/// of the histogram accumulators are indexed by them.
#[derive(Debug, Clone)]
pub struct ContextRegistry {
    labels: IndexSet<String>,
    capacity: usize,
}

impl ContextRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            labels: IndexSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the slot for `label`, allocating the next one for a label
    /// seen for the first time. Fails without side effects when the registry
    /// is full.
    pub fn resolve(
        &mut self,
        label: &str,
    ) -> Result<usize, ContextCapacityError> {
        if let Some(slot) = self.labels.get_index_of(label) {
            return Ok(slot);
        }
        if self.labels.len() >= self.capacity {
            return Err(ContextCapacityError {
                label: label.to_string(),
                capacity: self.capacity,
            });
        }
        let (slot, _) = self.labels.insert_full(label.to_string());
        Ok(slot)
    }

    pub fn get(
        &self,
        label: &str,
    ) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    pub fn label(
        &self,
        slot: usize,
    ) -> Option<&str> {
        self.labels.get_index(slot).map(String::as_str)
    }

    /// Labels in slot order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ContextRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_CAPACITY)
    }
}
