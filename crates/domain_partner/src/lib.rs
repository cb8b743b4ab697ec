//! Partner Domain
//!
//! This crate holds the broker's partner-facing domain: partners (companies
//! selling insurance), the quotes they obtain and the policies they issue,
//! together with the port to the third-party insurance provider.
//!
//! # Workflows
//!
//! - **Register partner**: a CNPJ can only be registered once
//! - **Quote**: the provider prices a person by age and sex; the quote is kept
//!   until the end of the provider's expiry date
//! - **Issue policy**: a quotation is turned into a policy by the provider
//! - **Get policy**: a partner can only read its own policies; the provider's
//!   current data is returned under the local identifier
//!
//! # Examples
//!
//! ```rust
//! use domain_partner::{Partner, Sex, QuotationRequest};
//!
//! let partner = Partner::new("Seguros Exemplo", "12345678000199");
//! assert_eq!(partner.cnpj.len(), 14);
//!
//! let sex: Sex = "f".parse().unwrap();
//! assert_eq!(QuotationRequest::new(30, sex).sex, "F");
//! ```

pub mod adapters;
pub mod error;
pub mod partner;
pub mod policy;
pub mod ports;
pub mod quote;
pub mod service;

pub use adapters::{InMemoryPartnerRepository, InMemoryPolicyRepository, InMemoryQuoteRepository};
pub use error::PartnerError;
pub use partner::Partner;
pub use policy::{Policy, PolicyApplication};
pub use ports::{
    InsuranceProvider, PartnerRepository, PolicyRepository, PolicyRequest, PolicyResult,
    QuotationRequest, QuotationResult, QuoteRepository, RepositoryError,
};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{MockInsuranceProvider, ProviderCall};
pub use quote::{ParseSexError, Quote, Sex};
pub use service::PartnerService;
