/// Why a [`crate::run`] loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// The caller cancelled the shared token directly.
    External,
    /// The outbound half failed to hand a message to the stream.
    SendFailed,
    /// The inbound half failed to read from the stream, or its consumer
    /// stopped accepting delivered messages.
    RecvFailed,
}
