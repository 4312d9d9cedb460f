#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `sgx-rs` reads the SG2/SG3 sprite archives of the Caesar III and Pharaoh
//! city builders, decodes their `.555` pixel files into 32-bit ARGB, and joins
//! the archives of a game into one [`Catalog`] addressed by global image ids
//! and group numbers.
//!
//! ```no_run
//! use sgx_rs::prelude::*;
//!
//! # fn main() -> Result<(), CatalogError> {
//! let vfs = DirVfs::new("/games/caesar3");
//! let mut catalog = Catalog::new(CatalogConfig::caesar3(), Box::new(vfs))?;
//! catalog.load_main(0, false, false)?;
//!
//! if let Some(id) = catalog.image_id(16) {
//! 	println!("{}", catalog.image(id));
//! }
//! # Ok(())
//! # }
//! ```
pub use sgx_internal::*;
