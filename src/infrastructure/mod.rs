pub mod cloudinary;
#[cfg(test)]
pub mod memory;
pub mod models;
pub mod order_repo;
pub mod printful;
pub mod product_repo;
pub mod stripe;
#[cfg(test)]
pub(crate) mod test_db;
pub mod tracking_repo;

use crate::domain::errors::DomainError;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Upstream(e.to_string())
    }
}
