//! Catalog configuration.
//!
//! A [`CatalogConfig`] lists which archives make up a game's image catalog and
//! where each one sits in the global id space. It is passed to
//! [`Catalog::new`](crate::Catalog::new) explicitly; nothing in this crate
//! reads global state.
//!
//! Configurations can be built in code, taken from the built-in presets, or
//! read from any file format the `config` crate understands:
//!
//! ```toml
//! edition = "pharaoh"
//! addressing = "concatenated"
//! enemies = ["Assyrian", "Egyptian"]
//! enemy_shift = 21225
//! font_group = 16
//!
//! [[collections]]
//! name = "Pharaoh_Terrain"
//! shift = 14252
//!
//! [[group_translation]]
//! from = 12
//! to = 34
//! ```

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use sgx_types::file::Edition;

use crate::CatalogError;

/// Character encodings with their own font archives
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontEncoding {
	/// Latin alphabets of western Europe
	#[default]
	WesternEurope,
	/// Latin alphabets of eastern Europe
	EasternEurope,
	/// Cyrillic alphabets
	Cyrillic,
	/// Greek alphabet
	Greek,
	/// Traditional Chinese
	TraditionalChinese,
	/// Simplified Chinese
	SimplifiedChinese,
	/// Korean
	Korean,
	/// Japanese
	Japanese,
}

/// How letters are looked up
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontMode {
	/// Only the font group of the main archives
	#[default]
	None,
	/// Every letter comes from the font archive
	FullCharset,
	/// Letters from the multibyte offset on come from the font archive
	Multibyte,
}

/// How group numbers map onto main collections
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupAddressing {
	/// Groups resolve against a single main collection
	MainOnly {
		/// Name of the collection
		collection: String,
	},
	/// Group numbers run across all main collections in order
	#[default]
	Concatenated,
}

/// One main collection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionEntry {
	/// Archive base name
	pub name: String,
	/// Offset of the archive in the global id space
	pub shift: i32,
	/// Archive names per climate id, `name` is used for climates not listed
	#[serde(default)]
	pub climates: Vec<String>,
	/// Archive name used in editor mode
	#[serde(default)]
	pub editor_name: Option<String>,
}

impl CollectionEntry {
	/// Creates an entry without climate or editor variants
	pub fn new(name: &str, shift: i32) -> Self {
		Self {
			name: name.to_string(),
			shift,
			climates: Vec::new(),
			editor_name: None,
		}
	}

	/// Archive base name to load for `climate`
	pub fn file_name(&self, climate: usize, editor: bool) -> &str {
		match (&self.editor_name, self.climates.get(climate)) {
			(Some(editor_name), _) if editor => editor_name,
			(_, Some(climate_name)) => climate_name,
			_ => &self.name,
		}
	}
}

/// A font archive for one encoding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontEntry {
	/// Encoding served by the archive
	pub encoding: FontEncoding,
	/// Archive base name
	pub name: String,
	/// Letter lookup mode once loaded
	#[serde(default)]
	pub mode: FontMode,
	/// Id of the first letter in the archive
	#[serde(default)]
	pub base_offset: i32,
}

/// A legacy group number and its replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupTranslation {
	/// Group number used by callers
	pub from: i32,
	/// Group number in the archives
	pub to: i32,
}

/// Everything a [`Catalog`](crate::Catalog) needs to know about a game's archives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
	/// Edition, selecting file extensions and the data folder
	pub edition: Edition,
	/// How group numbers are resolved
	#[serde(default)]
	pub addressing: GroupAddressing,
	/// Main collections, in dispatch order
	pub collections: Vec<CollectionEntry>,
	/// Enemy archive names, indexed by enemy id
	#[serde(default)]
	pub enemies: Vec<String>,
	/// Offset of the enemy archive in the global id space
	#[serde(default)]
	pub enemy_shift: i32,
	/// Font archives
	#[serde(default)]
	pub fonts: Vec<FontEntry>,
	/// Offset of the font archive in the global id space
	#[serde(default)]
	pub font_shift: i32,
	/// Group holding the letters of the main font
	#[serde(default)]
	pub font_group: i32,
	/// Legacy group numbers
	#[serde(default)]
	pub group_translation: Vec<GroupTranslation>,
}

impl CatalogConfig {
	/// Reads a configuration file, inferring the format from its extension.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
		let config = Config::builder()
			.add_source(File::from(path.as_ref()))
			.build()?
			.try_deserialize::<Self>()?;
		config.validate()?;
		Ok(config)
	}

	/// Parses a TOML configuration.
	pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
		let config = Config::builder()
			.add_source(File::from_str(text, FileFormat::Toml))
			.build()?
			.try_deserialize::<Self>()?;
		config.validate()?;
		Ok(config)
	}

	/// Checks references between entries.
	pub fn validate(&self) -> Result<(), CatalogError> {
		if self.collections.is_empty() {
			return Err(CatalogError::InvalidConfig("no main collections".to_string()));
		}
		if let GroupAddressing::MainOnly {
			collection,
		} = &self.addressing
			&& !self.collections.iter().any(|c| &c.name == collection)
		{
			return Err(CatalogError::InvalidConfig(format!(
				"group collection '{collection}' is not a main collection"
			)));
		}
		Ok(())
	}

	/// Caesar III archive set.
	pub fn caesar3() -> Self {
		let enemies = [
			"goths",
			"Etruscan",
			"Etruscan",
			"carthage",
			"Greek",
			"Greek",
			"egyptians",
			"Persians",
			"Phoenician",
			"celts",
			"celts",
			"celts",
			"Gaul",
			"Gaul",
			"goths",
			"goths",
			"goths",
			"Phoenician",
			"North African",
			"Phoenician",
		];
		Self {
			edition: Edition::Caesar3,
			addressing: GroupAddressing::MainOnly {
				collection: "c3".to_string(),
			},
			collections: vec![CollectionEntry {
				name: "c3".to_string(),
				shift: 0,
				climates: vec!["c3".to_string(), "c3_north".to_string(), "c3_south".to_string()],
				editor_name: Some("c3map".to_string()),
			}],
			enemies: enemies.iter().map(|s| (*s).to_string()).collect(),
			enemy_shift: 0,
			fonts: vec![FontEntry {
				encoding: FontEncoding::Cyrillic,
				name: "C3_fonts".to_string(),
				mode: FontMode::FullCharset,
				base_offset: 201,
			}],
			font_shift: 0,
			font_group: 16,
			group_translation: Vec::new(),
		}
	}

	/// Pharaoh archive set.
	pub fn pharaoh() -> Self {
		let collections = [
			("Expansion", -200),
			("SprMain", 700),
			("Pharaoh_Unloaded", 11025),
			("Pharaoh_General", 11706),
			("Pharaoh_Terrain", 14252),
			("SprAmbient", 15830),
			("Pharaoh_Fonts", 18764),
			("Empire", 20105),
			("SprMain2", 20105),
			("mastaba", 20325),
		];
		let enemies = [
			"Assyrian",
			"Egyptian",
			"Canaanite",
			"Enemy_1",
			"Hittite",
			"Hyksos",
			"Kushite",
			"Libian",
			"Mitani",
			"Nubian",
			"Persian",
			"Phoenician",
			"Roman",
			"SeaPeople",
		];
		Self {
			edition: Edition::Pharaoh,
			addressing: GroupAddressing::Concatenated,
			collections: collections.iter().map(|&(name, shift)| CollectionEntry::new(name, shift)).collect(),
			enemies: enemies.iter().map(|s| (*s).to_string()).collect(),
			enemy_shift: 21225,
			fonts: Vec::new(),
			font_shift: 18764,
			font_group: 16,
			group_translation: Vec::new(),
		}
	}
}
