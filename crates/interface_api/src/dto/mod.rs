//! Request/Response data transfer objects

pub mod partner;
