//! Error types for archive parsing.

use std::fmt::Display;

use sgx_vfs::VfsError;
use thiserror::Error;

/// Which file of an archive an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// `.sg2` / `.sg3` index file
	Index,
	/// `.555` pixel file shared by the archive
	Pixels,
	/// Standalone `.555` file holding one external image
	External,
}

impl Display for FileType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileType::Index => write!(f, "index"),
			FileType::Pixels => write!(f, "pixel"),
			FileType::External => write!(f, "external image"),
		}
	}
}

/// Errors that can occur when loading an image archive
#[derive(Debug, Error)]
pub enum SgxError {
	/// File exists but holds no data
	#[error("Empty {file_type} file: '{name}'")]
	EmptyFile {
		/// Which file
		file_type: FileType,
		/// Name of the file
		name: String,
	},

	/// File is larger than any archive the loader accepts
	#[error("{file_type} file '{name}' is too large: {size} bytes (max {max})")]
	FileTooLarge {
		/// Which file
		file_type: FileType,
		/// Name of the file
		name: String,
		/// Actual size
		size: u64,
		/// Accepted maximum
		max: u64,
	},

	/// Index file extension matches neither known header layout
	#[error("Unknown index file extension: '{0}'")]
	UnknownExtension(String),

	/// Header holds values that cannot describe a valid archive
	#[error("Invalid header: {0}")]
	InvalidHeader(String),

	/// Not enough data for a fixed-width read
	#[error(
		"Insufficient {file_type} data at offset {offset}: expected {expected} bytes, got {actual} bytes"
	)]
	InsufficientData {
		/// Which file
		file_type: FileType,
		/// Cursor position of the failed read
		offset: usize,
		/// Number of bytes requested
		expected: usize,
		/// Number of bytes available
		actual: usize,
	},

	/// Image record references a bitmap bucket that was not declared
	#[error("Image {image} references bitmap {bitmap}, but only {count} bitmaps exist")]
	BitmapIndexOutOfRange {
		/// Absolute index of the image
		image: usize,
		/// Referenced bitmap index
		bitmap: u8,
		/// Number of declared bitmaps
		count: usize,
	},

	/// Pixel stream consumed more bytes than the declared length
	#[error("Pixel stream overran its declared length by {overrun} bytes")]
	PixelBudgetOverrun {
		/// Number of bytes read past the declared length
		overrun: usize,
	},

	/// Pixel data requested before the index was parsed
	#[error("Index of collection '{0}' is not loaded")]
	IndexNotLoaded(String),

	/// Virtual file system error
	#[error(transparent)]
	Vfs(#[from] VfsError),
}

impl SgxError {
	/// Creates an [`SgxError::InsufficientData`] error
	pub fn insufficient_data(
		file_type: FileType,
		offset: usize,
		expected: usize,
		actual: usize,
	) -> Self {
		Self::InsufficientData {
			file_type,
			offset,
			expected,
			actual,
		}
	}
}
