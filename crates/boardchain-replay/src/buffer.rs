use std::collections::VecDeque;

use boardchain_types::MessageIndex;

use crate::{error::ReplayError, Indexed};

/// Result of [`ReplayBuffer::messages_after`].
#[derive(Debug, PartialEq, Eq)]
pub enum MessagesAfter<'a, T> {
    /// The buffer holds an unbroken run starting at `index + 1`. May be
    /// empty if the caller's index is already the buffer's newest.
    Contiguous(Vec<&'a T>),
    /// The buffer has entries beyond `index`, but the run starting at
    /// `index + 1` is missing — some elements between what the caller has
    /// and what the buffer retains were trimmed.
    Incomplete(Vec<&'a T>),
    /// The buffer has nothing at all.
    NoBufferedMessages,
}

/// Ordered, strictly-increasing, bounded history of replicated items.
///
/// Used for both the outbound message log (trimmed once the tail confirms
/// an item) and the upstream confirmation log (trimmed once a node's
/// low-water mark advances). Both uses share this type; only the trim
/// cadence differs, and that lives in `boardchain-node`.
pub struct ReplayBuffer<T> {
    items: VecDeque<T>,
    max_len: usize,
}

impl<T: Indexed> ReplayBuffer<T> {
    pub fn new(max_len: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_len: max_len.max(1),
        }
    }

    /// Appends `item`, dropping the oldest entry if the buffer is already
    /// at capacity. Rejects items whose index does not strictly exceed the
    /// current last index.
    pub fn add(&mut self, item: T) -> Result<(), ReplayError> {
        let new_index = item.message_index();
        if let Some(last) = self.last_message_index() {
            if new_index <= last {
                return Err(ReplayError::IndexOutOfOrder { last, new: new_index });
            }
        }

        if self.items.len() == self.max_len {
            self.items.pop_front();
        }
        self.items.push_back(item);
        Ok(())
    }

    pub fn last_message_index(&self) -> Option<MessageIndex> {
        self.items.back().map(Indexed::message_index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns every item with index strictly greater than `index`, with
    /// gap detection as described on [`MessagesAfter`].
    pub fn messages_after(&self, index: MessageIndex) -> MessagesAfter<'_, T> {
        if self.items.is_empty() {
            return MessagesAfter::NoBufferedMessages;
        }

        let target = index.next();
        if let Some(pos) = self.items.iter().position(|it| it.message_index() == target) {
            return MessagesAfter::Contiguous(self.items.iter().skip(pos).collect());
        }

        // `index` itself is the newest buffered item: caller is already
        // caught up, nothing missing.
        if self.items.iter().any(|it| it.message_index() == index) {
            return MessagesAfter::Contiguous(Vec::new());
        }

        let larger: Vec<&T> = self
            .items
            .iter()
            .filter(|it| it.message_index() > index)
            .collect();

        if larger.is_empty() {
            MessagesAfter::Contiguous(Vec::new())
        } else {
            MessagesAfter::Incomplete(larger)
        }
    }

    /// Drops every element with index strictly less than `index`.
    pub fn clear_before(&mut self, index: MessageIndex) {
        while let Some(front) = self.items.front() {
            if front.message_index() < index {
                self.items.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Item(i32);

    impl Indexed for Item {
        fn message_index(&self) -> MessageIndex {
            MessageIndex::new(self.0)
        }
    }

    #[test]
    fn rejects_out_of_order() {
        let mut buf = ReplayBuffer::new(10);
        buf.add(Item(1)).unwrap();
        let err = buf.add(Item(1)).unwrap_err();
        assert_eq!(
            err,
            ReplayError::IndexOutOfOrder {
                last: MessageIndex::new(1),
                new: MessageIndex::new(1)
            }
        );
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = ReplayBuffer::new(3);
        for i in 1..=5 {
            buf.add(Item(i)).unwrap();
        }
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.last_message_index(), Some(MessageIndex::new(5)));
        match buf.messages_after(MessageIndex::new(0)) {
            MessagesAfter::Incomplete(items) => {
                assert_eq!(items.iter().map(|i| i.0).collect::<Vec<_>>(), vec![3, 4, 5]);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }

    #[test]
    fn messages_after_empty_buffer() {
        let buf: ReplayBuffer<Item> = ReplayBuffer::new(4);
        assert_eq!(buf.messages_after(MessageIndex::new(0)), MessagesAfter::NoBufferedMessages);
    }

    #[test]
    fn messages_after_contiguous() {
        let mut buf = ReplayBuffer::new(10);
        for i in 1..=3 {
            buf.add(Item(i)).unwrap();
        }
        match buf.messages_after(MessageIndex::new(1)) {
            MessagesAfter::Contiguous(items) => {
                assert_eq!(items.iter().map(|i| i.0).collect::<Vec<_>>(), vec![2, 3]);
            }
            other => panic!("expected Contiguous, got {other:?}"),
        }
    }

    #[test]
    fn messages_after_already_caught_up() {
        let mut buf = ReplayBuffer::new(10);
        buf.add(Item(1)).unwrap();
        assert_eq!(
            buf.messages_after(MessageIndex::new(1)),
            MessagesAfter::Contiguous(Vec::new())
        );
    }

    #[test]
    fn clear_before_drops_older_entries() {
        let mut buf = ReplayBuffer::new(10);
        for i in 1..=5 {
            buf.add(Item(i)).unwrap();
        }
        buf.clear_before(MessageIndex::new(3));
        assert_eq!(buf.len(), 3);
        match buf.messages_after(MessageIndex::new(0)) {
            MessagesAfter::Incomplete(items) => {
                assert_eq!(items.iter().map(|i| i.0).collect::<Vec<_>>(), vec![3, 4, 5]);
            }
            other => panic!("expected Incomplete, got {other:?}"),
        }
    }
}
