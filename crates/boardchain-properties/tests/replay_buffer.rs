//! Invariant suite for `boardchain_replay::ReplayBuffer`: strictly
//! increasing indices, bounded length, and gap detection.

use proptest::prelude::*;

use boardchain_replay::{Indexed, MessagesAfter, ReplayBuffer};
use boardchain_types::MessageIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Item(i32);

impl Indexed for Item {
    fn message_index(&self) -> MessageIndex {
        MessageIndex::new(self.0)
    }
}

proptest! {
    #[test]
    fn accepted_indices_stay_strictly_increasing(indices in prop::collection::vec(0i32..500, 1..200)) {
        let mut buffer = ReplayBuffer::new(16);
        let mut last = None;
        for i in indices {
            let accepted = buffer.add(Item(i)).is_ok();
            let should_accept = last.is_none_or(|l| i > l);
            prop_assert_eq!(accepted, should_accept);
            if accepted {
                last = Some(i);
            }
        }
    }

    #[test]
    fn length_never_exceeds_capacity(count in 0usize..300, capacity in 1usize..32) {
        let mut buffer: ReplayBuffer<Item> = ReplayBuffer::new(capacity);
        for i in 0..count {
            buffer.add(Item(i as i32)).unwrap();
            prop_assert!(buffer.len() <= capacity);
        }
    }

    #[test]
    fn messages_after_trimmed_index_reports_incomplete_or_empty(capacity in 1usize..8, total in 0usize..40) {
        let mut buffer: ReplayBuffer<Item> = ReplayBuffer::new(capacity);
        for i in 0..total {
            buffer.add(Item(i as i32)).unwrap();
        }
        if total > capacity {
            match buffer.messages_after(MessageIndex::new(0)) {
                MessagesAfter::Incomplete(_) | MessagesAfter::NoBufferedMessages => {}
                MessagesAfter::Contiguous(_) => prop_assert!(false, "expected a gap after trimming"),
            }
        }
    }
}
