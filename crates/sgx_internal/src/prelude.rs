//! Prelude module for `sgx_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```no_run
//! use sgx_internal::prelude::*;
//!
//! # fn main() -> Result<(), CatalogError> {
//! let mut catalog = Catalog::new(CatalogConfig::pharaoh(), Box::new(DirVfs::new("/games/pharaoh")))?;
//! catalog.load_main(0, false, false)?;
//!
//! let image = catalog.image_by_tag("statue");
//! let pixels = catalog.image_pixel_data(image);
//! println!("{image}: {} pixels", pixels.map_or(0, <[u32]>::len));
//! # Ok(())
//! # }
//! ```

// Re-export everything from sgx_types::prelude
#[doc(inline)]
pub use sgx_types::prelude::*;

#[doc(inline)]
pub use sgx_vfs::{DirVfs, MemoryVfs, Vfs, VfsError};

#[doc(inline)]
pub use crate::{
	Catalog, CatalogConfig, CatalogError, CollectionEntry, FontEncoding, FontEntry, FontMode, GroupAddressing,
	GroupTranslation,
};
