//! Image catalog spanning several archives.
//!
//! A [`Catalog`] owns the main collections of a game plus at most one enemy
//! and one font collection, each placed in a shared id space by its shift.
//! Lookups by global id go to the first collection whose range
//! `shift .. shift + image_count` contains the id, trying main collections in
//! configuration order, then the font, then the enemy collection.
//!
//! Loading is transactional: the new collections are loaded off to the side
//! and only replace the current ones once all of them succeeded.

use std::fmt::Write as _;

use log::{debug, info, warn};
use sgx_types::file::{Image, ImageCollection};
use sgx_vfs::Vfs;

use crate::{
	CatalogError,
	config::{CatalogConfig, FontEncoding, FontMode, GroupAddressing},
};

/// Letters at or above this id live in a multibyte font archive
pub const FONT_MULTIBYTE_OFFSET: i32 = 10000;

/// Group numbers above this value are raw archive groups
pub const RAW_GROUP_OFFSET: i32 = 99999;

/// Images of all archives of one game.
pub struct Catalog {
	config: CatalogConfig,
	vfs: Box<dyn Vfs>,
	main: Vec<ImageCollection>,
	enemy: Option<ImageCollection>,
	font: Option<ImageCollection>,
	climate: Option<usize>,
	editor: bool,
	enemy_id: Option<usize>,
	font_encoding: Option<FontEncoding>,
	font_mode: FontMode,
	font_base_offset: i32,
}

impl std::fmt::Debug for Catalog {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Catalog")
			.field("edition", &self.config.edition)
			.field("main", &self.main.iter().map(ImageCollection::name).collect::<Vec<_>>())
			.field("enemy", &self.enemy.as_ref().map(ImageCollection::name))
			.field("font", &self.font.as_ref().map(ImageCollection::name))
			.field("climate", &self.climate)
			.field("editor", &self.editor)
			.field("font_mode", &self.font_mode)
			.finish_non_exhaustive()
	}
}

impl Catalog {
	/// Creates an empty catalog reading archives through `vfs`.
	pub fn new(config: CatalogConfig, vfs: Box<dyn Vfs>) -> Result<Self, CatalogError> {
		config.validate()?;
		Ok(Self {
			config,
			vfs,
			main: Vec::new(),
			enemy: None,
			font: None,
			climate: None,
			editor: false,
			enemy_id: None,
			font_encoding: None,
			font_mode: FontMode::None,
			font_base_offset: 0,
		})
	}

	/// Loads the main collections for `climate`.
	///
	/// Does nothing if the same climate and editor mode are already loaded,
	/// unless `force` is set. On failure the previously loaded set stays.
	pub fn load_main(&mut self, climate: usize, editor: bool, force: bool) -> Result<(), CatalogError> {
		if !force && self.climate == Some(climate) && self.editor == editor {
			debug!("Main collections for climate {climate} already loaded");
			return Ok(());
		}

		let mut collections = Vec::with_capacity(self.config.collections.len());
		for entry in &self.config.collections {
			let name = entry.file_name(climate, editor);
			collections.push(self.load_collection(name, entry.shift)?);
		}

		info!(
			"Loaded {} main collections for climate {climate}{}",
			collections.len(),
			if editor {
				" (editor)"
			} else {
				""
			}
		);
		self.main = collections;
		self.climate = Some(climate);
		self.editor = editor;
		Ok(())
	}

	/// Loads the archive of enemy `enemy_id`, replacing the previous one.
	pub fn load_enemy(&mut self, enemy_id: usize) -> Result<(), CatalogError> {
		if self.enemy_id == Some(enemy_id) {
			return Ok(());
		}
		let name = self.config.enemies.get(enemy_id).ok_or(CatalogError::UnknownEnemy {
			id: enemy_id,
			count: self.config.enemies.len(),
		})?;

		let collection = self.load_collection(name, self.config.enemy_shift)?;
		self.enemy = Some(collection);
		self.enemy_id = Some(enemy_id);
		Ok(())
	}

	/// Loads the font archive for `encoding`.
	///
	/// Encodings without a configured archive use the main font group only.
	pub fn load_fonts(&mut self, encoding: FontEncoding) -> Result<(), CatalogError> {
		if self.font_encoding == Some(encoding) {
			return Ok(());
		}

		match self.config.fonts.iter().find(|f| f.encoding == encoding) {
			Some(entry) => {
				let collection = self.load_collection(&entry.name, self.config.font_shift)?;
				self.font = Some(collection);
				self.font_mode = entry.mode;
				self.font_base_offset = entry.base_offset;
			}
			None => {
				debug!("No font archive for {encoding:?}");
				self.font = None;
				self.font_mode = FontMode::None;
				self.font_base_offset = 0;
			}
		}
		self.font_encoding = Some(encoding);
		Ok(())
	}

	fn load_collection(&self, name: &str, shift: i32) -> Result<ImageCollection, CatalogError> {
		let mut collection = ImageCollection::new(name, shift, self.config.edition);
		collection.load_files(self.vfs.as_ref()).map_err(|source| CatalogError::Load {
			name: name.to_string(),
			source,
		})?;
		Ok(collection)
	}

	/// Maps legacy group numbers onto archive group numbers.
	pub fn translate_group(&self, group: i32) -> i32 {
		if group > RAW_GROUP_OFFSET {
			return group - RAW_GROUP_OFFSET;
		}
		self.config
			.group_translation
			.iter()
			.find(|t| t.from == group)
			.map_or(group, |t| t.to)
	}

	/// Finds the main collection owning `group` and the group's local number.
	pub fn resolve_group(&self, group: i32) -> Option<(&ImageCollection, usize)> {
		let group = usize::try_from(group).ok()?;
		match &self.config.addressing {
			GroupAddressing::MainOnly {
				collection,
			} => self.main_collection(collection).map(|c| (c, group)),
			GroupAddressing::Concatenated => {
				if group == 0 {
					return self.main.first().map(|c| (c, 0));
				}
				let mut base = 0;
				for collection in &self.main {
					let count = collection.group_count().saturating_sub(1);
					if group > base && group <= base + count {
						return Some((collection, group - base));
					}
					base += count;
				}
				None
			}
		}
	}

	/// Finds the collection owning global image `id` and the id's local value.
	pub fn resolve_id(&self, id: i32) -> Option<(&ImageCollection, i32)> {
		self.collections().find_map(|collection| {
			let local = id.checked_sub(collection.shift())?;
			let count = i32::try_from(collection.image_count()).ok()?;
			(0..count).contains(&local).then_some((collection, local))
		})
	}

	/// Returns the global image id of the first image of `group`.
	pub fn image_id(&self, group: i32) -> Option<i32> {
		let translated = self.translate_group(group);
		match self.resolve_group(translated) {
			Some((collection, local)) => collection.get_id(local),
			None => {
				warn!("Image group {group} not found");
				None
			}
		}
	}

	/// Looks up an image by global id. Returns [`Image::dummy`] on a miss.
	pub fn image(&self, id: i32) -> &Image {
		match self.resolve_id(id) {
			Some((collection, local)) => collection.get_image_relative(local),
			None => {
				warn!("Image with id {id} not found");
				Image::dummy()
			}
		}
	}

	/// Looks up the first image of the group tagged `tag` in any collection.
	pub fn image_by_tag(&self, tag: &str) -> &Image {
		match self.collections().map(|c| c.get_image_by_tag(tag)).find(|i| !i.is_dummy()) {
			Some(image) => image,
			None => {
				warn!("Image with tag '{tag}' not found");
				Image::dummy()
			}
		}
	}

	/// Returns the image whose pixels are drawn for global image `id`.
	///
	/// This is the image `offset_mirror` ids away, or `id` itself if it has no mirror.
	pub fn mirror_target(&self, id: i32) -> &Image {
		id.checked_add(self.image(id).offset_mirror()).map_or(Image::dummy(), |target| self.image(target))
	}

	/// Returns the pixels to draw for global image `id`, following its mirror offset.
	pub fn pixel_data(&self, id: i32) -> Option<&[u32]> {
		self.image_pixel_data(self.mirror_target(id))
	}

	/// Returns the pixels of an image of any loaded collection.
	pub fn image_pixel_data<'a>(&'a self, image: &'a Image) -> Option<&'a [u32]> {
		let collection = self.collections().find(|c| c.owns(image))?;
		collection.pixel_data(image, self.vfs.as_ref())
	}

	/// Looks up an image of the loaded enemy collection by global id.
	pub fn enemy_image(&self, id: i32) -> &Image {
		self.enemy.as_ref().map_or(Image::dummy(), |c| c.get_image(id))
	}

	/// Returns the pixels of an enemy image, following its mirror offset.
	///
	/// Images that were never positioned yield `None`.
	pub fn enemy_pixel_data(&self, id: i32) -> Option<&[u32]> {
		let enemy = self.enemy.as_ref()?;
		let lookup = enemy.get_image(id);
		let image = enemy.get_image(id.checked_add(lookup.offset_mirror())?);
		if image.offset() > 0 {
			enemy.pixel_data(image, self.vfs.as_ref())
		} else {
			None
		}
	}

	/// Looks up the image of a letter according to the loaded font mode.
	pub fn letter(&self, letter_id: i32) -> &Image {
		let font = self.font.as_ref();
		match (self.font_mode, font) {
			(FontMode::FullCharset, Some(font)) => font.get_image(self.font_base_offset.saturating_add(letter_id)),
			(FontMode::Multibyte, Some(font)) if letter_id >= FONT_MULTIBYTE_OFFSET => {
				font.get_image(self.font_base_offset.saturating_add(letter_id - FONT_MULTIBYTE_OFFSET))
			}
			_ if letter_id < FONT_MULTIBYTE_OFFSET => self
				.image_id(self.config.font_group)
				.and_then(|id| id.checked_add(letter_id))
				.map_or(Image::dummy(), |id| self.image(id)),
			_ => Image::dummy(),
		}
	}

	/// Returns the pixels of a letter.
	pub fn letter_pixel_data(&self, letter_id: i32) -> Option<&[u32]> {
		self.image_pixel_data(self.letter(letter_id))
	}

	/// Number of groups in the main collections before `name`.
	pub fn groups_shift(&self, name: &str) -> Option<usize> {
		let position = self.main.iter().position(|c| c.name() == name)?;
		Some(self.main[..position].iter().map(|c| c.group_count().saturating_sub(1)).sum())
	}

	/// Number of images in the main collections before `name`.
	pub fn images_shift(&self, name: &str) -> Option<usize> {
		let position = self.main.iter().position(|c| c.name() == name)?;
		Some(self.main[..position].iter().map(ImageCollection::image_count).sum())
	}

	/// Every loaded collection in dispatch order
	pub fn collections(&self) -> impl Iterator<Item = &ImageCollection> {
		self.main.iter().chain(self.font.as_ref()).chain(self.enemy.as_ref())
	}

	/// Finds a loaded collection by configured or archive name.
	pub fn collection(&self, name: &str) -> Option<&ImageCollection> {
		self.main_collection(name).or_else(|| self.collections().find(|c| c.name() == name))
	}

	fn main_collection(&self, name: &str) -> Option<&ImageCollection> {
		self.config
			.collections
			.iter()
			.position(|entry| entry.name == name)
			.and_then(|position| self.main.get(position))
	}

	/// Main collections
	pub fn main_collections(&self) -> &[ImageCollection] {
		&self.main
	}

	/// Loaded enemy collection
	pub fn enemy_collection(&self) -> Option<&ImageCollection> {
		self.enemy.as_ref()
	}

	/// Loaded font collection
	pub fn font_collection(&self) -> Option<&ImageCollection> {
		self.font.as_ref()
	}

	/// Configuration the catalog was built with
	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	/// File system archives are read from
	pub fn vfs(&self) -> &dyn Vfs {
		self.vfs.as_ref()
	}

	/// Climate of the loaded main collections
	pub fn current_climate(&self) -> Option<usize> {
		self.climate
	}

	/// Returns `true` if the editor variants are loaded
	pub fn is_editor(&self) -> bool {
		self.editor
	}

	/// Id of the loaded enemy
	pub fn enemy_id(&self) -> Option<usize> {
		self.enemy_id
	}

	/// Encoding of the loaded fonts
	pub fn font_encoding(&self) -> Option<FontEncoding> {
		self.font_encoding
	}

	/// Letter lookup mode
	pub fn font_mode(&self) -> FontMode {
		self.font_mode
	}

	/// Id of the first letter in the font collection
	pub fn font_base_offset(&self) -> i32 {
		self.font_base_offset
	}

	/// Lists the group and image shifts of every main collection.
	pub fn describe(&self) -> String {
		let mut out = String::new();
		for collection in &self.main {
			let name = collection.name();
			let _ = writeln!(
				out,
				"---\nCollection '{name}': shift for groups: {}, shift for images: {}",
				self.groups_shift(name).unwrap_or_default(),
				self.images_shift(name).unwrap_or_default(),
			);
			out.push_str(&collection.describe());
		}
		out
	}
}
