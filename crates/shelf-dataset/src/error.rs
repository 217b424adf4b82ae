use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Source file not found: {0}")]
    SourceNotFound(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}
