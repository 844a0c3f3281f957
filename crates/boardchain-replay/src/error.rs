use boardchain_types::MessageIndex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("index {new} is not strictly greater than the last buffered index {last}")]
    IndexOutOfOrder { last: MessageIndex, new: MessageIndex },
}
