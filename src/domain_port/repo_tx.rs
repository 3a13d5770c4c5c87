use crate::application_port::AuthError;

/// Opens storage transactions for repositories that write through `*_in_tx`.
#[async_trait::async_trait]
pub trait TxManager: Send + Sync {
    async fn begin<'t>(&'t self) -> Result<Box<dyn StorageTx<'t> + 't>, AuthError>;
}

#[async_trait::async_trait]
pub trait StorageTx<'t>: Send {
    async fn commit(self: Box<Self>) -> Result<(), AuthError>;
    async fn rollback(self: Box<Self>) -> Result<(), AuthError>;
}
