//! Partner entity

use chrono::{DateTime, Utc};
use core_kernel::PartnerId;
use serde::{Deserialize, Serialize};

/// A company that sells insurance through the broker
///
/// Partners are identified externally by their CNPJ (Brazilian company
/// registry number), which is unique across partners.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Local identifier
    pub id: PartnerId,
    /// Trading name
    pub name: String,
    /// 14-digit company registry number
    pub cnpj: String,
    /// When the partner was registered
    pub created_at: DateTime<Utc>,
}

impl Partner {
    /// Creates a new partner with a fresh identifier
    ///
    /// # Arguments
    ///
    /// * `name` - Trading name
    /// * `cnpj` - Company registry number
    pub fn new(name: impl Into<String>, cnpj: impl Into<String>) -> Self {
        Self {
            id: PartnerId::new(),
            name: name.into(),
            cnpj: cnpj.into(),
            created_at: Utc::now(),
        }
    }
}
