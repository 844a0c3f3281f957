use async_trait::async_trait;

/// The write half of a duplex connection.
#[async_trait]
pub trait Sink: Send {
    type Item: Send;
    type Error: std::fmt::Display + Send + Sync + 'static;

    async fn send(&mut self, item: Self::Item) -> Result<(), Self::Error>;
}

/// The read half of a duplex connection.
#[async_trait]
pub trait Source: Send {
    type Item: Send;
    type Error: std::fmt::Display + Send + Sync + 'static;

    async fn recv(&mut self) -> Result<Self::Item, Self::Error>;
}
