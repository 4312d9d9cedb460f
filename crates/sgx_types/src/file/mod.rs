//! File type support for `sgx-rs` project.

mod edition;
mod error;

pub mod buffer;
pub mod sgx;

// Re-export unified error type
pub use error::{FileType, SgxError};

pub use buffer::Buffer;
pub use edition::Edition;
pub use sgx::{
	AlphaChannel, FormatVersion, Header as SgxHeader, HeaderLayout, Image, ImageCollection,
	codec::{self, Compression},
};
