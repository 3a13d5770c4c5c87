use crate::application_port::AuthError;
use crate::domain_port::{StorageTx, TxManager};
use sqlx::{MySql, MySqlConnection, MySqlPool, Transaction};

pub struct MySqlTxManager {
    pool: MySqlPool,
}

impl MySqlTxManager {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlTxManager { pool }
    }
}

#[async_trait::async_trait]
impl TxManager for MySqlTxManager {
    async fn begin<'t>(&'t self) -> Result<Box<dyn StorageTx<'t> + 't>, AuthError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AuthError::Store(format!("begin transaction: {e}")))?;
        Ok(Box::new(MySqlTx::new(tx)))
    }
}

pub struct MySqlTx<'t> {
    inner: Transaction<'t, MySql>,
}

impl<'t> MySqlTx<'t> {
    pub fn new(inner: Transaction<'t, MySql>) -> Self {
        MySqlTx { inner }
    }

    pub fn conn(&mut self) -> &mut MySqlConnection {
        self.inner.as_mut()
    }
}

#[async_trait::async_trait]
impl<'t> StorageTx<'t> for MySqlTx<'t> {
    async fn commit(self: Box<Self>) -> Result<(), AuthError> {
        self.inner
            .commit()
            .await
            .map_err(|e| AuthError::Store(format!("commit: {e}")))
    }

    async fn rollback(self: Box<Self>) -> Result<(), AuthError> {
        self.inner
            .rollback()
            .await
            .map_err(|e| AuthError::Store(format!("rollback: {e}")))
    }
}
