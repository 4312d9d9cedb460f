//! This crate provides the archive formats of the `sgx-rs` project.
//!
//! # File Formats
//!
//! - **SG2 / SG3**: Image archive indices of Caesar III and Pharaoh, listing
//!   every sprite with its geometry, animation data and storage descriptor
//! - **555**: Pixel files paired with an index, holding 5-5-5 pixel streams
//!   that are plain, run-length encoded, or isometric tiles mixing both
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use sgx_types::prelude::*;
//! use sgx_vfs::MemoryVfs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vfs = MemoryVfs::new();
//! let mut collection = ImageCollection::new("c3", 0, Edition::Caesar3);
//! collection.load_files(&vfs)?;
//! println!("{collection}");
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use sgx_types::file::codec::to_32_bit;
//!
//! assert_eq!(to_32_bit(0x7FFF), 0xFFFF_FFFF);
//! ```

pub mod file;

/// `use sgx_types::prelude::*;` to import commonly used items.
pub mod prelude;
