//! Benchmark helper utilities for sgx-rs
//!
//! This module provides a generator for synthetic `.sg2` / `.sg3` archives and
//! their `.555` pixel files. Benchmarks use it to produce workloads of any
//! size, and the integration tests use it to build archive sets on disk.
//!
//! # Synthetic archives
//!
//! An [`ArchiveBuilder`] collects bitmaps, images and groups, then serialises
//! them into the index layout the loader expects: header block, group slots,
//! bitmap table, image records and (from version 0xD5) the group tag table.
//! The pixel file holds every non-external image back to back after a 4-byte
//! prefix, matching the offsets the loader derives from the index.

use sgx_types::file::{HeaderLayout, sgx::constants};

/// One image to be written into a synthetic archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntheticImage {
	/// Bitmap bucket index
	pub bitmap: u8,
	/// Width in pixels
	pub width: u16,
	/// Height in pixels
	pub height: u16,
	/// Encoded pixel stream
	pub data: Vec<u8>,
	/// Length of the plain prefix of an isometric tile
	pub uncompressed_length: i32,
	/// Whole stream is run-length encoded
	pub fully_compressed: bool,
	/// Isometric tile
	pub compressed_part: bool,
	/// Biased offset inside the standalone file, for external images
	pub external_offset: Option<i32>,
	/// Relative id of the mirrored image
	pub offset_mirror: i32,
	/// Animation frames following this image
	pub num_animation_sprites: u16,
}

impl SyntheticImage {
	/// A plain image filled with one 5-5-5 color
	pub fn plain(bitmap: u8, width: u16, height: u16, color: u16) -> Self {
		let count = usize::from(width) * usize::from(height);
		Self {
			bitmap,
			width,
			height,
			data: std::iter::repeat_n(color.to_le_bytes(), count).flatten().collect(),
			..Default::default()
		}
	}

	/// A plain image holding the given 5-5-5 values
	pub fn from_values(bitmap: u8, width: u16, height: u16, values: &[u16]) -> Self {
		Self {
			bitmap,
			width,
			height,
			data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
			..Default::default()
		}
	}

	/// A sprite with a hand-written run-length stream
	pub fn compressed(bitmap: u8, width: u16, height: u16, data: Vec<u8>) -> Self {
		Self {
			bitmap,
			width,
			height,
			data,
			fully_compressed: true,
			..Default::default()
		}
	}

	/// A run-length encoded sprite
	pub fn sprite(bitmap: u8, width: u16, height: u16) -> Self {
		Self {
			bitmap,
			width,
			height,
			data: generate_rle_stream(width, height),
			fully_compressed: true,
			..Default::default()
		}
	}

	/// An isometric tile: `footprint` plain pixels followed by a compressed top
	pub fn isometric(bitmap: u8, footprint: u16, top_width: u16, top_height: u16) -> Self {
		let mut data = generate_plain_stream(usize::from(footprint));
		let uncompressed_length = data.len() as i32;
		data.extend(generate_rle_stream(top_width, top_height));
		Self {
			bitmap,
			width: top_width,
			height: top_height,
			data,
			uncompressed_length,
			compressed_part: true,
			..Default::default()
		}
	}

	/// A plain image stored at `file_offset` in its bitmap's standalone file
	pub fn external(bitmap: u8, width: u16, height: u16, file_offset: usize) -> Self {
		let mut image = Self::plain(bitmap, width, height, 0x7C00);
		image.external_offset = Some(file_offset as i32 + 1);
		image
	}

	/// Sets the mirror offset
	pub fn with_mirror(mut self, offset_mirror: i32) -> Self {
		self.offset_mirror = offset_mirror;
		self
	}

	/// Serialises the image record.
	pub fn record(&self, version: u32) -> Vec<u8> {
		let mut out = Vec::with_capacity(constants::IMAGE_RECORD_SIZE + constants::ALPHA_FIELDS_SIZE);
		out.extend_from_slice(&self.external_offset.unwrap_or(0).to_le_bytes());
		out.extend_from_slice(&(self.data.len() as i32).to_le_bytes());
		out.extend_from_slice(&self.uncompressed_length.to_le_bytes());
		out.extend_from_slice(&[0; 4]);
		out.extend_from_slice(&self.offset_mirror.to_le_bytes());
		out.extend_from_slice(&self.width.to_le_bytes());
		out.extend_from_slice(&self.height.to_le_bytes());
		out.extend_from_slice(&[0; 6]);
		out.extend_from_slice(&self.num_animation_sprites.to_le_bytes());
		out.extend_from_slice(&[0; 2]);
		// sprite offsets
		out.extend_from_slice(&[0; 4]);
		out.extend_from_slice(&[0; 10]);
		out.extend_from_slice(&[0, 0, 0]);
		out.push(u8::from(self.fully_compressed));
		out.push(u8::from(self.external_offset.is_some()));
		out.push(u8::from(self.compressed_part));
		out.extend_from_slice(&[0; 2]);
		out.push(self.bitmap);
		out.extend_from_slice(&[0; 7]);
		if version >= 0xD6 {
			out.extend_from_slice(&[0; constants::ALPHA_FIELDS_SIZE]);
		}
		out
	}
}

/// Builder for a synthetic archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveBuilder {
	layout: HeaderLayout,
	version: u32,
	bitmaps: Vec<(String, String)>,
	groups: Vec<(u16, String)>,
	images: Vec<SyntheticImage>,
}

impl ArchiveBuilder {
	/// Creates an empty archive; `.sg2` defaults to version 0xD3, `.sg3` to 0xD6
	pub fn new(layout: HeaderLayout) -> Self {
		Self {
			layout,
			version: match layout {
				HeaderLayout::Sg2 => 0xD3,
				HeaderLayout::Sg3 => 0xD6,
			},
			bitmaps: Vec::new(),
			groups: Vec::new(),
			images: Vec::new(),
		}
	}

	/// An empty `.sg2` archive
	pub fn sg2() -> Self {
		Self::new(HeaderLayout::Sg2)
	}

	/// An empty `.sg3` archive
	pub fn sg3() -> Self {
		Self::new(HeaderLayout::Sg3)
	}

	/// Overrides the format version
	pub fn version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}

	/// Adds a bitmap bucket
	pub fn bitmap(mut self, name: &str, comment: &str) -> Self {
		self.bitmaps.push((name.to_string(), comment.to_string()));
		self
	}

	/// Adds an image; its local id is the number of images added so far
	pub fn image(mut self, image: SyntheticImage) -> Self {
		self.images.push(image);
		self
	}

	/// Adds a group starting at local image `image_id`
	pub fn group(mut self, image_id: u16, tag: &str) -> Self {
		self.groups.push((image_id, tag.to_string()));
		self
	}

	/// Adds a zero group slot, which loaders skip
	pub fn empty_slot(mut self) -> Self {
		self.groups.push((0, String::new()));
		self
	}

	/// Index file name for archive `name`
	pub fn index_file_name(&self, name: &str) -> String {
		format!("{name}.{}", self.layout.extension())
	}

	/// Number of images, without the empty record
	pub fn image_count(&self) -> usize {
		self.images.len()
	}

	/// Number of groups, without the synthetic slot 0 and empty slots
	pub fn group_count(&self) -> usize {
		self.groups.iter().filter(|(id, _)| *id != 0).count()
	}

	/// Images added so far
	pub fn images(&self) -> &[SyntheticImage] {
		&self.images
	}

	/// Serialises the index file.
	pub fn index_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		for value in [0u32, self.version, 0] {
			out.extend_from_slice(&value.to_le_bytes());
		}
		let max_images = self.images.len().max(1) as i32;
		for value in [max_images, self.images.len() as i32, self.bitmaps.len() as i32, 0] {
			out.extend_from_slice(&value.to_le_bytes());
		}
		let pixel_size = self.pixel_bytes().len() as u32;
		for value in [0u32, pixel_size, 0] {
			out.extend_from_slice(&value.to_le_bytes());
		}
		out.extend_from_slice(&[0; constants::HEADER_RESERVED_SIZE]);

		for slot in 0..constants::GROUP_SLOTS {
			let id = self.groups.get(slot).map_or(0, |(id, _)| *id);
			out.extend_from_slice(&id.to_le_bytes());
		}
		for (name, comment) in &self.bitmaps {
			put_string(&mut out, name, constants::BITMAP_NAME_SIZE);
			put_string(&mut out, comment, constants::BITMAP_COMMENT_SIZE);
		}
		out.resize(self.layout.header_size(), 0);

		out.extend(SyntheticImage::default().record(self.version));
		for image in &self.images {
			out.extend(image.record(self.version));
		}

		if self.version >= 0xD5 {
			let mut table = Vec::with_capacity(constants::GROUP_TAGS_SIZE);
			// one tag per non-empty slot
			for (_, tag) in self.groups.iter().filter(|(id, _)| *id != 0).take(constants::GROUP_TAG_CAPACITY) {
				put_string(&mut table, tag, constants::GROUP_TAG_SIZE);
			}
			table.resize(constants::GROUP_TAGS_SIZE, 0);
			out.extend(table);
		}
		out
	}

	/// Serialises the `.555` pixel file.
	pub fn pixel_bytes(&self) -> Vec<u8> {
		let mut out = vec![0u8; constants::PIXEL_DATA_START];
		for image in self.images.iter().filter(|i| i.external_offset.is_none()) {
			out.extend_from_slice(&image.data);
		}
		out
	}

	/// Serialises the standalone file of bitmap `bitmap`, holding its external images.
	pub fn external_bytes(&self, bitmap: u8) -> Vec<u8> {
		let mut out = Vec::new();
		for image in self.images.iter().filter(|i| i.bitmap == bitmap) {
			let Some(offset) = image.external_offset else {
				continue;
			};
			let start = (offset - 1).max(0) as usize;
			let end = start + image.data.len();
			if out.len() < end {
				out.resize(end, 0);
			}
			out[start..end].copy_from_slice(&image.data);
		}
		out
	}
}

/// Generates an archive with `images` images of mixed encodings.
///
/// Every 50 images share a bitmap, every 10th image starts a tagged group
/// (up to the 300 group slots), and every 4th image is a sprite.
pub fn generate_archive(layout: HeaderLayout, images: usize) -> ArchiveBuilder {
	let mut builder = ArchiveBuilder::new(layout);
	let bitmaps = images.div_ceil(50).clamp(1, layout.bitmap_capacity());
	for i in 0..bitmaps {
		builder = builder.bitmap(&format!("Bitmap_{i:03}.bmp"), &format!("synthetic bitmap {i}"));
	}
	for i in 0..images {
		let bitmap = (i / 50).min(bitmaps - 1) as u8;
		let image = match i % 4 {
			0 => SyntheticImage::sprite(bitmap, 32, 24),
			1 => SyntheticImage::isometric(bitmap, 450, 58, 20),
			_ => SyntheticImage::plain(bitmap, 16, 16, (i % 0x8000) as u16),
		};
		builder = builder.image(image);
		if i % 10 == 0 && builder.groups.len() < constants::GROUP_SLOTS {
			builder = builder.group((i + 1) as u16, &format!("group_{}", i / 10));
		}
	}
	builder
}

/// Generates `pixels` plain 5-5-5 pixels
pub fn generate_plain_stream(pixels: usize) -> Vec<u8> {
	(0..pixels).flat_map(|i| ((i * 37) as u16 & 0x7FFF).to_le_bytes()).collect()
}

/// Generates a run-length encoded sprite.
///
/// Each row starts with a transparent run whose length varies with the row,
/// followed by literal runs covering the rest of the row.
pub fn generate_rle_stream(width: u16, height: u16) -> Vec<u8> {
	let width = usize::from(width);
	let mut data = Vec::new();
	for y in 0..usize::from(height) {
		let mut skip = (y % 4) * width / 8;
		let mut left = width - skip;
		while skip > 0 {
			let n = skip.min(255);
			data.extend([255, n as u8]);
			skip -= n;
		}
		while left > 0 {
			let n = left.min(254);
			data.push(n as u8);
			for x in 0..n {
				data.extend((((x + y) * 0x421) as u16 & 0x7FFF).to_le_bytes());
			}
			left -= n;
		}
	}
	data
}

fn put_string(out: &mut Vec<u8>, text: &str, width: usize) {
	let bytes = text.as_bytes();
	let len = bytes.len().min(width - 1);
	out.extend_from_slice(&bytes[..len]);
	out.resize(out.len() + width - len, 0);
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Small sprite: 32x24
	pub const SPRITE: (u16, u16) = (32, 24);
	/// Large sprite: 128x128
	pub const LARGE_SPRITE: (u16, u16) = (128, 128);
	/// Building-sized sprite: 300x200
	pub const BUILDING: (u16, u16) = (300, 200);
	/// Images in a small archive
	pub const SMALL_ARCHIVE: usize = 200;
	/// Images in an archive the size of a main game archive
	pub const LARGE_ARCHIVE: usize = 6000;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_record_sizes() {
		let image = SyntheticImage::plain(0, 2, 2, 0);
		assert_eq!(image.record(0xD5).len(), 64);
		assert_eq!(image.record(0xD6).len(), 72);
	}

	#[test]
	fn test_index_layout() {
		let archive = ArchiveBuilder::new(HeaderLayout::Sg2)
			.bitmap("Housing.bmp", "houses")
			.image(SyntheticImage::plain(0, 2, 1, 0x7FFF))
			.group(1, "houses");
		let index = archive.index_bytes();

		// header, one empty record and one image, no tag table before 0xD5
		assert_eq!(index.len(), HeaderLayout::Sg2.header_size() + 2 * 64);
		assert_eq!(&index[4..8], &0xD3u32.to_le_bytes());
		assert_eq!(&index[80..82], &1u16.to_le_bytes());
		assert_eq!(&index[680..691], b"Housing.bmp");
		assert_eq!(archive.pixel_bytes(), vec![0, 0, 0, 0, 0xFF, 0x7F, 0xFF, 0x7F]);
	}

	#[test]
	fn test_tag_table_is_appended() {
		let archive = ArchiveBuilder::new(HeaderLayout::Sg3)
			.bitmap("Temple.bmp", "")
			.image(SyntheticImage::sprite(0, 4, 4))
			.group(1, "temple");
		let index = archive.index_bytes();

		let tags = &index[index.len() - constants::GROUP_TAGS_SIZE..];
		assert_eq!(&tags[..6], b"temple");
		assert!(tags[6..].iter().all(|&b| b == 0));
	}

	#[test]
	fn test_empty_slots_have_no_tag() {
		let archive = ArchiveBuilder::sg3()
			.bitmap("Temple.bmp", "")
			.image(SyntheticImage::from_values(0, 2, 1, &[1, 2]))
			.image(SyntheticImage::compressed(0, 1, 1, vec![1, 3, 0]))
			.group(1, "first")
			.empty_slot()
			.group(2, "second");
		let index = archive.index_bytes();

		assert_eq!(archive.group_count(), 2);
		assert_eq!(archive.index_file_name("Temple"), "Temple.sg3");
		assert_eq!(&index[80..86], &[1, 0, 0, 0, 2, 0]);
		let tags = &index[index.len() - constants::GROUP_TAGS_SIZE..];
		assert_eq!(&tags[..5], b"first");
		assert_eq!(&tags[48..54], b"second");
		assert_eq!(archive.pixel_bytes(), vec![0, 0, 0, 0, 1, 0, 2, 0, 1, 3, 0]);
	}

	#[test]
	fn test_rle_stream_runs() {
		// row 0: one literal run of 4, row 1: skip 0 (4 / 8 = 0), row 2: skip 1
		let data = generate_rle_stream(4, 3);
		assert_eq!(data[0], 4);
		assert_eq!(data[9], 4);
		assert_eq!(&data[18..21], &[255, 1, 3]);
	}

	#[test]
	fn test_external_bytes() {
		let archive = ArchiveBuilder::new(HeaderLayout::Sg3)
			.bitmap("Walker.bmp", "")
			.image(SyntheticImage::external(0, 1, 1, 6));
		assert_eq!(archive.external_bytes(0), vec![0, 0, 0, 0, 0, 0, 0x00, 0x7C]);
		assert!(archive.pixel_bytes().len() == constants::PIXEL_DATA_START);
	}

	#[test]
	fn test_generate_archive() {
		let archive = generate_archive(HeaderLayout::Sg3, 120);
		assert_eq!(archive.image_count(), 120);
		assert_eq!(archive.group_count(), 12);
		assert!(archive.images().iter().any(|i| i.compressed_part));
	}
}
