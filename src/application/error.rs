use thiserror::Error;

use crate::storage::StoreError;

/// Gateway-level failure taxonomy. Validation variants are raised before
/// any store call; `Store` wraps everything the ledger store reports.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} wajib diisi")]
    MissingField(&'static str),

    #[error("{field} tidak valid: {value}")]
    InvalidField { field: &'static str, value: String },

    #[error("Jenis tabungan harus dipilih untuk transaksi setoran/penarikan")]
    SavingsTypeRequired,

    #[error("Jumlah transaksi harus lebih dari nol")]
    InvalidAmount,

    #[error("Transaksi tidak ditemukan: {0}")]
    TransactionNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// True for request-shaped failures the caller can fix (HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingField(_)
                | AppError::InvalidField { .. }
                | AppError::SavingsTypeRequired
                | AppError::InvalidAmount
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::TransactionNotFound(_) | AppError::Store(StoreError::TransactionNotFound(_))
        )
    }
}
