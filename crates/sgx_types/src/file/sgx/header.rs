//! Index file header.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::constants;
use crate::file::{SgxError, buffer::Buffer};

/// Header layout, selected by the index file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderLayout {
	/// `.sg2`: room for 100 bitmap records
	Sg2,
	/// `.sg3`: room for 200 bitmap records
	Sg3,
}

impl HeaderLayout {
	/// Picks the layout from an index file name.
	pub fn from_file_name(name: &str) -> Result<Self, SgxError> {
		if sgx_vfs::has_extension(name, "sg2") {
			Ok(Self::Sg2)
		} else if sgx_vfs::has_extension(name, "sg3") {
			Ok(Self::Sg3)
		} else {
			Err(SgxError::UnknownExtension(name.to_string()))
		}
	}

	/// File extension without the dot
	pub fn extension(self) -> &'static str {
		match self {
			Self::Sg2 => "sg2",
			Self::Sg3 => "sg3",
		}
	}

	/// Maximum number of bitmap records
	pub fn bitmap_capacity(self) -> usize {
		match self {
			Self::Sg2 => constants::SG2_BITMAP_CAPACITY,
			Self::Sg3 => constants::SG3_BITMAP_CAPACITY,
		}
	}

	/// Offset of the first image record
	pub fn header_size(self) -> usize {
		constants::HEADER_BLOCK_SIZE
			+ constants::GROUP_SLOTS * 2
			+ self.bitmap_capacity() * constants::BITMAP_RECORD_SIZE
	}
}

/// Format version stored in the index header
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
	/// First version with a group tag table at the end of the file
	pub const GROUP_TAGS: Self = Self(0xD5);

	/// First version whose image records carry alpha channel fields
	pub const ALPHA_CHANNEL: Self = Self(0xD6);

	/// Returns `true` if the file ends with a group tag table
	pub fn has_group_tags(self) -> bool {
		self >= Self::GROUP_TAGS
	}

	/// Returns `true` if image records carry alpha offset and length
	pub fn has_alpha_channel(self) -> bool {
		self >= Self::ALPHA_CHANNEL
	}

	/// Size of one image record in this version
	pub fn image_record_size(self) -> usize {
		if self.has_alpha_channel() {
			constants::IMAGE_RECORD_SIZE + constants::ALPHA_FIELDS_SIZE
		} else {
			constants::IMAGE_RECORD_SIZE
		}
	}
}

impl Display for FormatVersion {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "0x{:X}", self.0)
	}
}

/// Index file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Header {
	/// Layout selected by the file extension
	pub layout: HeaderLayout,
	/// Size of the index file as recorded by the packer
	pub file_size: u32,
	/// Format version
	pub version: FormatVersion,
	/// Unknown field
	pub unknown1: u32,
	/// Capacity of the image table as recorded by the packer
	pub max_image_records: i32,
	/// Number of image records, including the empty record at index 0
	pub num_image_records: usize,
	/// Number of bitmap records
	pub num_bitmap_records: usize,
	/// Unknown field
	pub unknown2: i32,
	/// Combined size of all archive files
	pub total_file_size: u32,
	/// Size of the `.555` pixel file
	pub file_size_555: u32,
	/// Size of externally stored pixel data
	pub file_size_external: u32,
}

impl Header {
	/// Reads the header block and leaves the cursor on the group table.
	pub fn read(buffer: &mut Buffer<'_>, layout: HeaderLayout) -> Result<Self, SgxError> {
		let file_size = buffer.read_u32()?;
		let version = FormatVersion(buffer.read_u32()?);
		let unknown1 = buffer.read_u32()?;
		let max_image_records = buffer.read_i32()?;
		let raw_image_records = buffer.read_i32()?;
		let raw_bitmap_records = buffer.read_i32()?;
		let unknown2 = buffer.read_i32()?;
		let total_file_size = buffer.read_u32()?;
		let file_size_555 = buffer.read_u32()?;
		let file_size_external = buffer.read_u32()?;
		buffer.skip(constants::HEADER_RESERVED_SIZE)?;

		// first record is the empty image, not counted by the packer
		let num_image_records = usize::try_from(raw_image_records)
			.map(|n| n + 1)
			.map_err(|_| SgxError::InvalidHeader(format!("image count {raw_image_records}")))?;
		let num_bitmap_records = usize::try_from(raw_bitmap_records)
			.ok()
			.filter(|&n| n <= layout.bitmap_capacity())
			.ok_or_else(|| {
				SgxError::InvalidHeader(format!(
					"bitmap count {raw_bitmap_records}, {} layout holds at most {}",
					layout.extension(),
					layout.bitmap_capacity()
				))
			})?;

		Ok(Self {
			layout,
			file_size,
			version,
			unknown1,
			max_image_records,
			num_image_records,
			num_bitmap_records,
			unknown2,
			total_file_size,
			file_size_555,
			file_size_external,
		})
	}
}

impl Display for Header {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"{} header:\n\
			- Version: {}\n\
			- File size: {} bytes\n\
			- Images: {} (max {})\n\
			- Bitmaps: {}\n\
			- 555 size: {} bytes\n\
			- External size: {} bytes",
			self.layout.extension(),
			self.version,
			self.file_size,
			self.num_image_records,
			self.max_image_records,
			self.num_bitmap_records,
			self.file_size_555,
			self.file_size_external,
		)
	}
}
