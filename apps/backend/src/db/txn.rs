use std::time::Duration;

use futures::future::BoxFuture;
use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    IsolationLevel, TransactionTrait,
};
use tracing::warn;

use crate::errors::domain::{DomainError, InfraErrorKind};

/// Isolation requested for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxnMode {
    /// Backend default (read committed on Postgres).
    #[default]
    Default,
    /// Serializable read-then-write. SQLite already serializes writers and
    /// ignores the setting.
    Serializable,
}

/// Execute a closure within a database transaction bounded by `deadline`.
///
/// Commits on `Ok`, rolls back on `Err`. If the closure does not finish in
/// time its future is dropped, the transaction is rolled back and
/// `Infra(Timeout)` is returned.
///
/// The closure must only capture owned data so the returned future can
/// borrow the transaction alone.
pub async fn with_txn<R, F>(
    db: &DatabaseConnection,
    mode: TxnMode,
    deadline: Duration,
    f: F,
) -> Result<R, DomainError>
where
    R: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, DomainError>> + Send,
{
    let txn = begin(db, mode).await?;

    let result = tokio::time::timeout(deadline, f(&txn)).await;
    let out = match result {
        Ok(out) => out,
        Err(_) => {
            warn!(deadline_ms = deadline.as_millis() as u64, "[TXN] deadline exceeded, rolling back");
            let _ = txn.rollback().await;
            return Err(DomainError::infra(
                InfraErrorKind::Timeout,
                "Store operation timed out",
            ));
        }
    };

    match out {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}

async fn begin(db: &DatabaseConnection, mode: TxnMode) -> Result<DatabaseTransaction, DomainError> {
    let txn = match (mode, db.get_database_backend()) {
        (TxnMode::Serializable, DatabaseBackend::Postgres) => {
            db.begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await?
        }
        _ => db.begin().await?,
    };
    Ok(txn)
}
