//! Adapters for the partner domain storage ports

pub mod memory;

pub use memory::{InMemoryPartnerRepository, InMemoryPolicyRepository, InMemoryQuoteRepository};
