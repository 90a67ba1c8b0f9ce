//! Outbound adapters implementing the domain's driven ports.
//!
//! Adapters translate between domain types and storage representations and
//! hold no business rules.

pub mod persistence;
