//! # Inkwell Shared
//!
//! Wire types shared between the API server and its clients. Field names
//! follow the frontend contract: camelCase, with `_id` for identifiers.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
