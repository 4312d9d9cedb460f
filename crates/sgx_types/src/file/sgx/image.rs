//! Image records.

use std::{fmt::Display, sync::OnceLock};

use serde::Serialize;

use super::{FormatVersion, codec::Compression};
use crate::file::{SgxError, buffer::Buffer};

static DUMMY: Image = Image::empty();

/// Location of an image's alpha mask, present from format version 0xD6 on
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AlphaChannel {
	/// Offset of the alpha data
	pub offset: u32,
	/// Length of the alpha data
	pub length: u32,
}

/// One sprite or tile of an image collection.
///
/// Offsets change meaning during loading: after the index pass `offset` is the
/// byte position inside the `.555` file (or inside the standalone file for
/// external images, biased by one); after the pixel pass it is the position of
/// the first decoded value inside the collection's pixel pool.
#[derive(Debug, Serialize)]
pub struct Image {
	pub(super) absolute_index: usize,
	pub(super) bitmap_index: u8,
	pub(super) bitmap_name: String,
	pub(super) index: u32,

	pub(super) width: u16,
	pub(super) height: u16,
	pub(super) sprite_offset_x: i16,
	pub(super) sprite_offset_y: i16,
	pub(super) num_animation_sprites: u16,
	pub(super) animation_can_reverse: bool,
	pub(super) animation_speed_id: u8,
	pub(super) image_type: u8,

	pub(super) offset: usize,
	pub(super) data_length: usize,
	pub(super) uncompressed_length: usize,
	pub(super) full_length: usize,
	pub(super) fully_compressed: bool,
	pub(super) compressed_part: bool,
	pub(super) external: bool,
	pub(super) offset_mirror: i32,
	pub(super) alpha: Option<AlphaChannel>,

	#[serde(skip)]
	pub(super) external_pixels: OnceLock<Vec<u32>>,
}

impl Image {
	const fn empty() -> Self {
		Self {
			absolute_index: 0,
			bitmap_index: 0,
			bitmap_name: String::new(),
			index: 0,
			width: 0,
			height: 0,
			sprite_offset_x: 0,
			sprite_offset_y: 0,
			num_animation_sprites: 0,
			animation_can_reverse: false,
			animation_speed_id: 0,
			image_type: 0,
			offset: 0,
			data_length: 0,
			uncompressed_length: 0,
			full_length: 0,
			fully_compressed: false,
			compressed_part: false,
			external: false,
			offset_mirror: 0,
			alpha: None,
			external_pixels: OnceLock::new(),
		}
	}

	/// The shared empty image returned by every failed lookup.
	pub fn dummy() -> &'static Image {
		&DUMMY
	}

	/// Returns `true` if this is the shared empty image
	pub fn is_dummy(&self) -> bool {
		std::ptr::eq(self, Self::dummy())
	}

	/// Reads one image record.
	///
	/// Bitmap name and per-bitmap index are filled in by the collection.
	pub(super) fn read(
		buffer: &mut Buffer<'_>,
		absolute_index: usize,
		version: FormatVersion,
	) -> Result<Self, SgxError> {
		let mut image = Self::empty();
		image.absolute_index = absolute_index;

		let offset = buffer.read_i32()?;
		let data_length = buffer.read_i32()?;
		let uncompressed_length = buffer.read_i32()?;
		buffer.skip(4)?;
		image.offset_mirror = buffer.read_i32()?;
		image.width = buffer.read_u16()?;
		image.height = buffer.read_u16()?;
		buffer.skip(6)?;
		image.num_animation_sprites = buffer.read_u16()?;
		buffer.skip(2)?;
		image.sprite_offset_x = buffer.read_i16()?;
		image.sprite_offset_y = buffer.read_i16()?;
		buffer.skip(10)?;
		image.animation_can_reverse = buffer.read_i8()? != 0;
		buffer.skip(1)?;
		image.image_type = buffer.read_u8()?;
		image.fully_compressed = buffer.read_i8()? != 0;
		image.external = buffer.read_i8()? != 0;
		image.compressed_part = buffer.read_i8()? != 0;
		buffer.skip(2)?;
		image.bitmap_index = buffer.read_u8()?;
		buffer.skip(1)?;
		image.animation_speed_id = buffer.read_u8()?;
		buffer.skip(5)?;
		if version.has_alpha_channel() {
			image.alpha = Some(AlphaChannel {
				offset: buffer.read_u32()?,
				length: buffer.read_u32()?,
			});
		}

		let field = |name: &str, value: i32| {
			usize::try_from(value).map_err(|_| {
				SgxError::InvalidHeader(format!("image {absolute_index}: {name} is {value}"))
			})
		};
		image.offset = field("offset", offset)?;
		image.data_length = field("data length", data_length)?;
		image.uncompressed_length = field("uncompressed length", uncompressed_length)?;

		Ok(image)
	}

	/// Position of the record in its collection
	pub fn absolute_index(&self) -> usize {
		self.absolute_index
	}

	/// Index of the bitmap bucket the image came from
	pub fn bitmap_index(&self) -> u8 {
		self.bitmap_index
	}

	/// Name of the bitmap bucket the image came from
	pub fn bitmap_name(&self) -> &str {
		&self.bitmap_name
	}

	/// 1-based position of the image within its bitmap bucket
	pub fn index(&self) -> u32 {
		self.index
	}

	/// Width in pixels
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Height in pixels
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Horizontal pivot offset
	pub fn sprite_offset_x(&self) -> i16 {
		self.sprite_offset_x
	}

	/// Vertical pivot offset
	pub fn sprite_offset_y(&self) -> i16 {
		self.sprite_offset_y
	}

	/// Number of animation frames following this image
	pub fn num_animation_sprites(&self) -> u16 {
		self.num_animation_sprites
	}

	/// Returns `true` if the animation may play backwards
	pub fn animation_can_reverse(&self) -> bool {
		self.animation_can_reverse
	}

	/// Animation speed class
	pub fn animation_speed_id(&self) -> u8 {
		self.animation_speed_id
	}

	/// Raw image type field
	pub fn image_type(&self) -> u8 {
		self.image_type
	}

	/// Byte offset before pixel loading, pool offset after
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Length of the source pixel stream in bytes
	pub fn data_length(&self) -> usize {
		self.data_length
	}

	/// Length of the uncompressed prefix.
	///
	/// Bytes before pixel loading, decoded values after.
	pub fn uncompressed_length(&self) -> usize {
		self.uncompressed_length
	}

	/// Number of decoded values, 0 until the pixels are loaded
	pub fn full_length(&self) -> usize {
		self.external_pixels.get().map_or(self.full_length, Vec::len)
	}

	/// Returns `true` if the whole stream is run-length encoded
	pub fn is_fully_compressed(&self) -> bool {
		self.fully_compressed
	}

	/// Returns `true` for isometric tiles with a run-length encoded top part
	pub fn has_compressed_part(&self) -> bool {
		self.compressed_part
	}

	/// Returns `true` while the pixels live in a standalone file and have not been loaded yet
	pub fn is_external(&self) -> bool {
		self.external && self.external_pixels.get().is_none()
	}

	/// Returns `true` if the record was flagged as external, loaded or not
	pub fn is_stored_externally(&self) -> bool {
		self.external
	}

	/// Relative id of the image to draw instead when mirrored
	pub fn offset_mirror(&self) -> i32 {
		self.offset_mirror
	}

	/// Alpha mask location, for format versions that store one
	pub fn alpha(&self) -> Option<AlphaChannel> {
		self.alpha
	}

	/// Encoding of the pixel stream
	pub fn compression(&self) -> Compression {
		if self.fully_compressed {
			Compression::Compressed
		} else if self.compressed_part {
			Compression::Isometric {
				uncompressed_length: self.uncompressed_length,
			}
		} else {
			Compression::Uncompressed
		}
	}
}

impl Display for Image {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Image #{} ({}:{}): {}x{}, type {}, {}{}, {} bytes -> {} values",
			self.absolute_index,
			self.bitmap_name,
			self.index,
			self.width,
			self.height,
			self.image_type,
			self.compression(),
			if self.external {
				", external"
			} else {
				""
			},
			self.data_length,
			self.full_length(),
		)
	}
}
