//! Catalog of the image archives of a game.
//!
//! This crate ties the individual [`ImageCollection`](sgx_types::file::ImageCollection)s
//! of a game into one [`Catalog`] with a shared id space, enemy and font
//! slots, and group addressing across archives. It is re-exported by `sgx-rs`
//! and should not usually be used directly.

/// `use sgx_internal::prelude::*;` to import commonly used items.
pub mod prelude;

mod catalog;
mod config;
mod error;

// Re-export the lower layers for convenience
pub use sgx_types;
pub use sgx_vfs;

pub use crate::{
	catalog::{Catalog, FONT_MULTIBYTE_OFFSET, RAW_GROUP_OFFSET},
	config::{CatalogConfig, CollectionEntry, FontEncoding, FontEntry, FontMode, GroupAddressing, GroupTranslation},
	error::CatalogError,
};
