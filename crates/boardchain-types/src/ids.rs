use std::fmt::{self, Display};

/// Identity of a record within a relation. Stable for the lifetime of the
/// record; never reassigned once a row is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RecordId> for u64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

/// Position of a message or confirmation within a chain node's replay
/// history. Strictly increasing within one node's buffer.
///
/// # Examples
///
/// ```
/// use boardchain_types::MessageIndex;
///
/// let a = MessageIndex::new(4);
/// let b = a.next();
/// assert_eq!(b, MessageIndex::new(5));
/// assert!(a < b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct MessageIndex(i32);

impl MessageIndex {
    pub const ZERO: Self = Self(0);

    pub const fn new(index: i32) -> Self {
        Self(index)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Next index in sequence (current + 1).
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Previous index, saturating at zero (used for low-water-mark math
    /// where an index of 0 means "nothing observed yet").
    pub const fn prev(self) -> Self {
        if self.0 <= 0 { Self(0) } else { Self(self.0 - 1) }
    }
}

impl Display for MessageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_prev_roundtrip() {
        let i = MessageIndex::new(10);
        assert_eq!(i.next().prev(), i);
    }

    #[test]
    fn prev_saturates_at_zero() {
        assert_eq!(MessageIndex::ZERO.prev(), MessageIndex::ZERO);
    }
}
