//! # Inkwell Core
//!
//! The domain layer of the Inkwell blogging backend.
//! This crate contains the business rules (ownership policy, blog query
//! composition, blog and account lifecycles) with zero infrastructure
//! dependencies. Storage, media and credentials are reached through the
//! traits in [`ports`].

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod query;
pub mod services;

pub use error::{DomainError, RepoError};
pub use policy::{Access, Actor};
