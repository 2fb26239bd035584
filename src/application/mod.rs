pub mod analytics_service;
pub mod auth_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod order_service;

use crate::domain::errors::DomainError;

/// Runs a synchronous repository call on the blocking pool.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, DomainError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DomainError::Internal(e.to_string()))?
}
