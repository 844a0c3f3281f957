use boardchain_types::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique index conflict")]
    UniqueViolation,
    #[error("record {0} not found")]
    NotFound(RecordId),
    #[error("update transform is not allowed to change the record id")]
    IdChanged,
    #[error("record {0} was never confirmed")]
    Uninitialized(RecordId),
    #[error("record {0} has been deleted")]
    Deleted(RecordId),
    #[error("receipt for record {0} was dropped without being resolved")]
    NotDirty(RecordId),
    #[error("relation must be empty to import")]
    NotEmpty,
}
