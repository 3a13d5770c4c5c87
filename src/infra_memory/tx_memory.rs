use crate::application_port::AuthError;
use crate::domain_port::{StorageTx, TxManager};

/// Transaction manager for the in-memory repositories, which have nothing
/// to stage or undo.
pub struct MemoryTxManager;

#[async_trait::async_trait]
impl TxManager for MemoryTxManager {
    async fn begin<'t>(&'t self) -> Result<Box<dyn StorageTx<'t> + 't>, AuthError> {
        Ok(Box::new(MemoryTx))
    }
}

pub struct MemoryTx;

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MemoryTx {
    async fn commit(self: Box<Self>) -> Result<(), AuthError> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AuthError> {
        Ok(())
    }
}
