//! Media store implementations - Cloudinary and in-memory fallback.

mod memory;

#[cfg(feature = "cloudinary")]
mod cloudinary;

pub use memory::InMemoryMediaStore;

#[cfg(feature = "cloudinary")]
pub use cloudinary::{CloudinaryConfig, CloudinaryMediaStore};
