use thiserror::Error;

use crate::domain::Amount;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}
