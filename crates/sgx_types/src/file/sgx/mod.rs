//! `.SG2` / `.SG3` image archive support for `sgx-rs` project.
//!
//! An archive is a pair of files: an index (`.sg2` for Caesar III, `.sg3` for
//! Pharaoh) describing every image, and a `.555` file holding the pixel
//! streams back to back. Some images are stored outside of the `.555` file, in
//! a standalone file named after their bitmap bucket; those are decoded on
//! first access.
//!
//! # File Structure
//!
//! The index starts with an 80-byte header block, followed by 300 group slots
//! (`u16` image ids), a bitmap table (65-byte name + 135-byte comment per
//! entry, 100 entries reserved in `.sg2`, 200 in `.sg3`) and the image
//! records. Format version 0xD6 added alpha fields to every record, and files
//! from version 0xD5 on end with a table of 48-byte group tags.
//!
//! # Examples
//!
//! ```no_run
//! use sgx_types::file::{Edition, ImageCollection};
//! use sgx_vfs::DirVfs;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vfs = DirVfs::new("/games/pharaoh");
//! let mut collection = ImageCollection::new("Pharaoh_General", 11706, Edition::Pharaoh);
//! collection.load_files(&vfs)?;
//!
//! let image = collection.get_image_by_group(5);
//! if let Some(pixels) = collection.pixel_data(image, &vfs) {
//!     println!("{}x{}: {} values", image.width(), image.height(), pixels.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod header;
mod image;


use std::fmt::{Display, Write};

use log::{debug, error, info, warn};
use sgx_vfs::Vfs;

pub use header::{FormatVersion, Header, HeaderLayout};
pub use image::{AlphaChannel, Image};

use crate::file::{Edition, FileType, SgxError, buffer::Buffer};

/// Constants used in `.SG2` / `.SG3` files
pub mod constants {
	/// Size of the fixed header block
	pub const HEADER_BLOCK_SIZE: usize = 80;

	/// Reserved bytes at the end of the header block
	pub const HEADER_RESERVED_SIZE: usize = 40;

	/// Number of group slots following the header block
	pub const GROUP_SLOTS: usize = 300;

	/// Width of a bitmap name
	pub const BITMAP_NAME_SIZE: usize = 65;

	/// Width of a bitmap comment
	pub const BITMAP_COMMENT_SIZE: usize = 135;

	/// Size of one bitmap record
	pub const BITMAP_RECORD_SIZE: usize = BITMAP_NAME_SIZE + BITMAP_COMMENT_SIZE;

	/// Bitmap records reserved in `.sg2` files
	pub const SG2_BITMAP_CAPACITY: usize = 100;

	/// Bitmap records reserved in `.sg3` files
	pub const SG3_BITMAP_CAPACITY: usize = 200;

	/// Size of an image record without alpha fields
	pub const IMAGE_RECORD_SIZE: usize = 64;

	/// Size of the alpha offset and length fields
	pub const ALPHA_FIELDS_SIZE: usize = 8;

	/// Width of a group tag
	pub const GROUP_TAG_SIZE: usize = 48;

	/// Number of tags in the group tag table
	pub const GROUP_TAG_CAPACITY: usize = 299;

	/// Size of the group tag table at the end of the index
	pub const GROUP_TAGS_SIZE: usize = GROUP_TAG_CAPACITY * GROUP_TAG_SIZE;

	/// Largest index or pixel file accepted
	pub const MAX_FILE_SIZE: u64 = 20_000_000;

	/// Position of the first image in the `.555` file
	pub const PIXEL_DATA_START: usize = 4;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum LoadState {
	#[default]
	Empty,
	Indexed,
	Ready,
}

/// Parsed index, committed to the collection only when complete
struct Index {
	header: Header,
	group_image_ids: Vec<u16>,
	group_image_tags: Vec<String>,
	bitmap_names: Vec<String>,
	bitmap_comments: Vec<String>,
	images: Vec<Image>,
}

/// One image archive: index metadata plus a pool of decoded pixels.
///
/// Images address the pool by offset and length. Element 0 of the pool is
/// reserved so a positioned image never has offset 0.
#[derive(Debug)]
pub struct ImageCollection {
	name: String,
	edition: Edition,
	shift: i32,
	state: LoadState,
	header: Option<Header>,
	group_image_ids: Vec<u16>,
	group_image_tags: Vec<String>,
	bitmap_names: Vec<String>,
	bitmap_comments: Vec<String>,
	images: Vec<Image>,
	pixels: Vec<u32>,
}

impl ImageCollection {
	/// Creates an empty collection for archive `name` with id shift `shift`.
	pub fn new(name: impl Into<String>, shift: i32, edition: Edition) -> Self {
		Self {
			name: name.into(),
			edition,
			shift,
			state: LoadState::Empty,
			header: None,
			group_image_ids: Vec::new(),
			group_image_tags: Vec::new(),
			bitmap_names: Vec::new(),
			bitmap_comments: Vec::new(),
			images: Vec::new(),
			pixels: Vec::new(),
		}
	}

	/// Archive base name
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Edition whose file conventions are used
	pub fn edition(&self) -> Edition {
		self.edition
	}

	/// Offset added to local ids to form global ids
	pub fn shift(&self) -> i32 {
		self.shift
	}

	/// Name of the index file, without folder
	pub fn index_file_name(&self) -> String {
		format!("{}.{}", self.name, self.edition.index_layout().extension())
	}

	/// Name of the pixel file, without folder
	pub fn pixel_file_name(&self) -> String {
		format!("{}.{}", self.name, self.edition.pixel_extension())
	}

	/// Header of the loaded index
	pub fn header(&self) -> Option<&Header> {
		self.header.as_ref()
	}

	/// Returns `true` once both index and pixels are loaded
	pub fn is_loaded(&self) -> bool {
		self.state == LoadState::Ready
	}

	/// Returns `true` if the index is loaded, with or without pixels
	pub fn is_indexed(&self) -> bool {
		self.state != LoadState::Empty
	}

	/// Loads index and pixel file.
	pub fn load_files(&mut self, vfs: &dyn Vfs) -> Result<(), SgxError> {
		self.load_index(vfs)?;
		self.load_pixels(vfs)
	}

	/// Locates and parses the index file.
	///
	/// The file is looked up at the root of `vfs` first, then in the
	/// edition's data folder.
	pub fn load_index(&mut self, vfs: &dyn Vfs) -> Result<(), SgxError> {
		let result = self
			.locate(vfs, &self.index_file_name())
			.and_then(|file_name| {
				let data = read_archive_file(vfs, &file_name, FileType::Index)?;
				Ok((file_name, data))
			});
		match result {
			Ok((file_name, data)) => self.load_index_bytes(&file_name, &data),
			Err(err) => {
				error!("Loading image collection '{}': {err}", self.name);
				self.reset();
				Err(err)
			}
		}
	}

	/// Parses an index already in memory.
	///
	/// `file_name` selects the header layout by extension. On failure the
	/// collection is left empty.
	pub fn load_index_bytes(&mut self, file_name: &str, data: &[u8]) -> Result<(), SgxError> {
		self.reset();
		info!("Loading image collection from file '{file_name}': {} bytes", data.len());

		match parse_index(file_name, data) {
			Ok(index) => {
				self.header = Some(index.header);
				self.group_image_ids = index.group_image_ids;
				self.group_image_tags = index.group_image_tags;
				self.bitmap_names = index.bitmap_names;
				self.bitmap_comments = index.bitmap_comments;
				self.images = index.images;
				self.state = LoadState::Indexed;
				info!(
					"Loaded  image collection from file '{file_name}': {} images and {} image groups",
					self.image_count(),
					self.group_count()
				);
				Ok(())
			}
			Err(err) => {
				error!("Loading image collection from file '{file_name}': {err}");
				Err(err)
			}
		}
	}

	/// Locates the pixel file and decodes every image stored in it.
	///
	/// Does nothing, without reading, if the pixels are already loaded.
	pub fn load_pixels(&mut self, vfs: &dyn Vfs) -> Result<(), SgxError> {
		match self.state {
			LoadState::Empty => return Err(SgxError::IndexNotLoaded(self.name.clone())),
			LoadState::Ready => {
				debug!("Pixels of '{}' are already loaded", self.name);
				return Ok(());
			}
			LoadState::Indexed => {}
		}
		let result = self.locate(vfs, &self.pixel_file_name()).and_then(|file_name| {
			info!("Loading image collection from file '{file_name}'");
			read_archive_file(vfs, &file_name, FileType::Pixels)
		});
		match result {
			Ok(data) => self.load_pixels_bytes(&data),
			Err(err) => {
				error!("Loading image collection '{}': {err}", self.name);
				self.reset();
				Err(err)
			}
		}
	}

	/// Decodes pixel file contents already in memory.
	///
	/// Offsets are rewritten from file positions to pool positions, so a
	/// second call on a loaded collection does nothing.
	pub fn load_pixels_bytes(&mut self, data: &[u8]) -> Result<(), SgxError> {
		match self.state {
			LoadState::Empty => return Err(SgxError::IndexNotLoaded(self.name.clone())),
			LoadState::Ready => {
				debug!("Pixels of '{}' are already loaded", self.name);
				return Ok(());
			}
			LoadState::Indexed => {}
		}
		if data.is_empty() {
			let err = SgxError::EmptyFile {
				file_type: FileType::Pixels,
				name: self.pixel_file_name(),
			};
			self.reset();
			return Err(err);
		}

		match decode_pool(&mut self.images, data) {
			Ok((pixels, external)) => {
				info!(
					"Loaded  image collection from file '{}': {} images and {external} externals",
					self.pixel_file_name(),
					self.images.len().saturating_sub(1) - external
				);
				self.pixels = pixels;
				self.state = LoadState::Ready;
				Ok(())
			}
			Err(err) => {
				error!("Loading image collection from file '{}': {err}", self.pixel_file_name());
				self.reset();
				Err(err)
			}
		}
	}

	/// Decodes an externally stored image on first use.
	///
	/// The standalone file is named after the image's bitmap bucket with a
	/// `.555` extension and is looked up at the root first, then in the data
	/// folder. The decoded pixels are cached on the image; later calls return
	/// them without touching `vfs`. Returns `None` if the file cannot be read.
	pub fn load_external<'a>(&self, image: &'a Image, vfs: &dyn Vfs) -> Option<&'a [u32]> {
		if let Some(pixels) = image.external_pixels.get() {
			return Some(pixels);
		}
		if !image.is_stored_externally() {
			warn!("Image #{} of '{}' is not stored externally", image.absolute_index(), self.name);
			return None;
		}

		match self.read_external(image, vfs) {
			Ok(pixels) => Some(image.external_pixels.get_or_init(|| pixels)),
			Err(err) => {
				error!(
					"Unable to load external image #{} of '{}': {err}",
					image.absolute_index(),
					self.name
				);
				None
			}
		}
	}

	fn read_external(&self, image: &Image, vfs: &dyn Vfs) -> Result<Vec<u32>, SgxError> {
		let file_name = sgx_vfs::change_extension(image.bitmap_name(), self.edition.pixel_extension());
		let offset = image.offset.saturating_sub(1) as u64;
		info!("Load external image from '{file_name}': {} bytes", image.data_length);

		let data = match vfs.read_part(&file_name, offset, image.data_length) {
			Ok(data) => data,
			Err(err) => {
				debug!("External file '{file_name}' not usable at root: {err}");
				let data_file_name = sgx_vfs::join(self.edition.data_folder(), &file_name);
				vfs.read_part(&data_file_name, offset, image.data_length)?
			}
		};

		let mut buffer = Buffer::new(&data, FileType::External);
		let mut pixels = Vec::new();
		codec::convert(image.compression(), image.data_length, &mut buffer, &mut pixels)?;
		Ok(pixels)
	}

	/// Returns the global image id of a group, or `None` if out of range.
	pub fn get_id(&self, group: usize) -> Option<i32> {
		match self.group_image_ids.get(group) {
			Some(&id) => Some(i32::from(id) + self.shift),
			None => {
				warn!(
					"Wrong group index for collection '{}': {group}, expected < {}",
					self.name,
					self.group_image_ids.len()
				);
				None
			}
		}
	}

	/// Looks up an image by global id. Returns [`Image::dummy`] on a miss.
	pub fn get_image(&self, id: i32) -> &Image {
		id.checked_sub(self.shift)
			.map_or(Image::dummy(), |relative| self.get_image_relative(relative))
	}

	/// Looks up an image by local id. Returns [`Image::dummy`] on a miss.
	///
	/// Id 0 is the reserved empty record and also yields the dummy.
	pub fn get_image_relative(&self, id: i32) -> &Image {
		usize::try_from(id)
			.ok()
			.filter(|&id| id > 0)
			.and_then(|id| self.images.get(id))
			.unwrap_or(Image::dummy())
	}

	/// Looks up the first image of the group with the given tag.
	pub fn get_image_by_tag(&self, tag: &str) -> &Image {
		self.group_image_tags
			.iter()
			.position(|t| t == tag)
			.filter(|&group| group > 0)
			.and_then(|group| self.group_image_ids.get(group))
			.and_then(|&id| self.images.get(usize::from(id)))
			.unwrap_or(Image::dummy())
	}

	/// Looks up the first image of a group.
	pub fn get_image_by_group(&self, group: usize) -> &Image {
		self.get_id(group).map_or(Image::dummy(), |id| self.get_image(id))
	}

	/// Returns the decoded pixels of an image of this collection.
	///
	/// External images are loaded through `vfs` on first use. Returns `None`
	/// for the dummy image, for images of other collections and for external
	/// images whose file cannot be read.
	pub fn pixel_data<'a>(&'a self, image: &'a Image, vfs: &dyn Vfs) -> Option<&'a [u32]> {
		if image.is_dummy() || !self.owns(image) {
			return None;
		}
		if image.is_stored_externally() {
			return self.load_external(image, vfs);
		}
		if !self.is_loaded() {
			return None;
		}
		self.pixels.get(image.offset..image.offset + image.full_length)
	}

	/// Returns `true` if `image` is a record of this collection
	pub fn owns(&self, image: &Image) -> bool {
		self.images.as_ptr_range().contains(&std::ptr::from_ref(image))
	}

	/// All image records, index 0 being the empty record
	pub fn images(&self) -> &[Image] {
		&self.images
	}

	/// Number of image records, including the empty record
	pub fn image_count(&self) -> usize {
		self.images.len()
	}

	/// Number of group slots, including the synthetic slot 0
	pub fn group_count(&self) -> usize {
		self.group_image_ids.len()
	}

	/// Local image id of every retained group
	pub fn group_image_ids(&self) -> &[u16] {
		&self.group_image_ids
	}

	/// Tag of every retained group, empty for files without a tag table
	pub fn group_tags(&self) -> &[String] {
		&self.group_image_tags
	}

	/// Bitmap bucket names
	pub fn bitmap_names(&self) -> &[String] {
		&self.bitmap_names
	}

	/// Bitmap bucket comments
	pub fn bitmap_comments(&self) -> &[String] {
		&self.bitmap_comments
	}

	/// The decoded pixel pool
	pub fn pixels(&self) -> &[u32] {
		&self.pixels
	}

	/// Lists every bitmap with its groups and their images.
	pub fn describe(&self) -> String {
		let mut out = format!("{self}\n");
		for (bitmap, (name, comment)) in self.bitmap_names.iter().zip(&self.bitmap_comments).enumerate() {
			let _ = writeln!(out, "Bitmap name: '{name}', comment: '{comment}'");

			for (group, &id) in self.group_image_ids.iter().enumerate() {
				let first = usize::from(id);
				let Some(image) = self.images.get(first) else {
					continue;
				};
				if usize::from(image.bitmap_index()) != bitmap {
					continue;
				}
				let tag = self.group_image_tags.get(group).map_or("", String::as_str);
				let _ = writeln!(out, "  Group {group}: tag '{tag}'");

				let last = first + usize::from(image.num_animation_sprites());
				for image in self.images.iter().take(last + 1).skip(first) {
					let _ = writeln!(out, "    {image}");
				}
			}
		}
		out
	}

	fn locate(&self, vfs: &dyn Vfs, file_name: &str) -> Result<String, SgxError> {
		if vfs.exists(file_name) {
			return Ok(file_name.to_string());
		}
		let data_file_name = sgx_vfs::join(self.edition.data_folder(), file_name);
		if vfs.exists(&data_file_name) {
			return Ok(data_file_name);
		}
		Err(sgx_vfs::VfsError::NotFound(file_name.to_string()).into())
	}

	fn reset(&mut self) {
		self.state = LoadState::Empty;
		self.header = None;
		self.group_image_ids.clear();
		self.group_image_tags.clear();
		self.bitmap_names.clear();
		self.bitmap_comments.clear();
		self.images.clear();
		self.pixels.clear();
	}
}

impl Display for ImageCollection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Collection '{}' ({}): shift {}, {} images, {} groups, {} bitmaps, {} pixels",
			self.name,
			self.index_file_name(),
			self.shift,
			self.image_count(),
			self.group_count(),
			self.bitmap_names.len(),
			self.pixels.len(),
		)
	}
}

fn read_archive_file(vfs: &dyn Vfs, file_name: &str, file_type: FileType) -> Result<Vec<u8>, SgxError> {
	let size = vfs.file_size(file_name)?;
	if size == 0 {
		return Err(SgxError::EmptyFile {
			file_type,
			name: file_name.to_string(),
		});
	}
	if size > constants::MAX_FILE_SIZE {
		return Err(SgxError::FileTooLarge {
			file_type,
			name: file_name.to_string(),
			size,
			max: constants::MAX_FILE_SIZE,
		});
	}
	Ok(vfs.read(file_name)?)
}

fn parse_index(file_name: &str, data: &[u8]) -> Result<Index, SgxError> {
	if data.is_empty() {
		return Err(SgxError::EmptyFile {
			file_type: FileType::Index,
			name: file_name.to_string(),
		});
	}
	if data.len() as u64 > constants::MAX_FILE_SIZE {
		return Err(SgxError::FileTooLarge {
			file_type: FileType::Index,
			name: file_name.to_string(),
			size: data.len() as u64,
			max: constants::MAX_FILE_SIZE,
		});
	}

	let layout = HeaderLayout::from_file_name(file_name)?;
	let mut buffer = Buffer::new(data, FileType::Index);
	let header = Header::read(&mut buffer, layout)?;
	debug!("{header}");

	// slot 0 is synthetic so group numbers start at 1
	let mut group_image_ids = vec![0u16];
	for _ in 0..constants::GROUP_SLOTS {
		let id = buffer.read_u16()?;
		if id != 0 {
			group_image_ids.push(id);
		}
	}

	let mut bitmap_names = Vec::with_capacity(header.num_bitmap_records);
	let mut bitmap_comments = Vec::with_capacity(header.num_bitmap_records);
	for _ in 0..header.num_bitmap_records {
		bitmap_names.push(buffer.read_string(constants::BITMAP_NAME_SIZE)?);
		bitmap_comments.push(buffer.read_string(constants::BITMAP_COMMENT_SIZE)?);
	}
	debug!("{} groups, {} bitmaps", group_image_ids.len() - 1, bitmap_names.len());

	buffer.set_offset(layout.header_size())?;
	let record_size = header.version.image_record_size();
	let mut images = Vec::with_capacity(header.num_image_records.min(buffer.remaining() / record_size));
	let mut last_bitmap = 0u8;
	let mut index_in_bitmap = 1u32;
	for absolute_index in 0..header.num_image_records {
		let mut image = Image::read(&mut buffer, absolute_index, header.version)?;
		let bitmap = usize::from(image.bitmap_index);
		image.bitmap_name = bitmap_names
			.get(bitmap)
			.ok_or(SgxError::BitmapIndexOutOfRange {
				image: absolute_index,
				bitmap: image.bitmap_index,
				count: bitmap_names.len(),
			})?
			.clone();

		if image.bitmap_index != last_bitmap {
			index_in_bitmap = 1;
			last_bitmap = image.bitmap_index;
		}
		image.index = index_in_bitmap;
		index_in_bitmap += 1;
		images.push(image);
	}

	// the .555 file stores non-external images back to back
	let mut offset = constants::PIXEL_DATA_START;
	for image in images.iter_mut().skip(1) {
		if image.external {
			if image.offset == 0 {
				image.offset = 1;
			}
		} else {
			image.offset = offset;
			offset += image.data_length;
		}
	}

	let mut group_image_tags = vec![String::new()];
	if header.version.has_group_tags() {
		let start = data.len().checked_sub(constants::GROUP_TAGS_SIZE).ok_or_else(|| {
			SgxError::insufficient_data(FileType::Index, 0, constants::GROUP_TAGS_SIZE, data.len())
		})?;
		buffer.set_offset(start)?;
		let count = (group_image_ids.len() - 1).min(constants::GROUP_TAG_CAPACITY);
		for _ in 0..count {
			group_image_tags.push(buffer.read_string(constants::GROUP_TAG_SIZE)?);
		}
	}

	Ok(Index {
		header,
		group_image_ids,
		group_image_tags,
		bitmap_names,
		bitmap_comments,
		images,
	})
}

/// Decodes every non-external image into a new pool.
///
/// Returns the pool and the number of external images skipped.
fn decode_pool(images: &mut [Image], data: &[u8]) -> Result<(Vec<u32>, usize), SgxError> {
	let mut buffer = Buffer::new(data, FileType::Pixels);
	let mut pool = Vec::with_capacity(data.len() / 2 + 1);
	pool.push(0);
	let mut external = 0;

	for image in images.iter_mut().skip(1) {
		if image.external {
			external += 1;
			continue;
		}
		buffer.set_offset(image.offset)?;
		let offset = pool.len();
		let count = codec::convert(image.compression(), image.data_length, &mut buffer, &mut pool)?;

		image.offset = offset;
		image.uncompressed_length /= 2;
		image.full_length = count;
	}

	Ok((pool, external))
}
