//! # boardchain-replay: bounded, indexed replay history
//!
//! Every chain node keeps two of these buffers: one for outbound messages
//! (trimmed once the tail confirms them) and one for confirmations flowing
//! upstream (trimmed once the predecessor's low-water mark advances past
//! them). Both are the same generic [`ReplayBuffer`] — only the item type
//! and the trim policy driving [`ReplayBuffer::clear_before`] differ.

mod buffer;
mod error;

pub use buffer::{MessagesAfter, ReplayBuffer};
pub use error::ReplayError;

/// Anything that can be kept in a [`ReplayBuffer`] carries a
/// [`boardchain_types::MessageIndex`].
pub trait Indexed {
    fn message_index(&self) -> boardchain_types::MessageIndex;
}
