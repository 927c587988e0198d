//! # Domain Module
//!
//! Core domain types for proxy and multi-hop light clients.

pub mod errors;
pub mod invariants;
pub mod proof;
pub mod value_objects;

pub use errors::*;
pub use invariants::*;
pub use proof::*;
pub use value_objects::*;
