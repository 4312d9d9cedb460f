//! Prelude module for `sgx_types`.
//!
//! This module provides a convenient way to import commonly used types.
//!
//! # Examples
//!
//! ```no_run
//! use sgx_types::prelude::*;
//!
//! let collection = ImageCollection::new("Pharaoh_General", 11706, Edition::Pharaoh);
//! assert!(collection.get_image(11706).is_dummy());
//! ```

#[doc(inline)]
pub use crate::file::{
	// Archive types
	AlphaChannel,
	Compression,
	Edition,
	FileType,
	FormatVersion,
	HeaderLayout,
	Image,
	ImageCollection,
	SgxError,
	SgxHeader,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
