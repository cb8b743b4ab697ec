//! Partner domain errors

use core_kernel::ProviderError;
use thiserror::Error;

use crate::ports::RepositoryError;

/// Errors that can occur in the partner domain
#[derive(Debug, Error)]
pub enum PartnerError {
    /// A partner with the same CNPJ is already registered
    #[error("partner already exists")]
    PartnerAlreadyExists,

    /// Partner with the given ID was not found
    #[error("partner not found")]
    PartnerNotFound,

    /// The policy does not exist or belongs to another partner
    #[error("policy not found")]
    PolicyNotFound,

    /// Data returned or supplied did not meet domain rules
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The insurance provider call failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// A repository operation failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl PartnerError {
    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PartnerError::InvalidData(message.into())
    }

    /// Checks if this error means a requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, PartnerError::PartnerNotFound | PartnerError::PolicyNotFound)
    }
}
