//! Game editions and their file conventions.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::file::sgx::HeaderLayout;

/// Game edition an archive set belongs to
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edition {
	/// Caesar III: `.sg2` indices, pixel files under `555/`
	#[default]
	Caesar3,
	/// Pharaoh: `.sg3` indices, everything under `Data/`
	Pharaoh,
}

impl Edition {
	/// Folder searched after the root for archive and external files
	pub fn data_folder(self) -> &'static str {
		match self {
			Self::Caesar3 => "555",
			Self::Pharaoh => "Data",
		}
	}

	/// Header layout of this edition's index files
	pub fn index_layout(self) -> HeaderLayout {
		match self {
			Self::Caesar3 => HeaderLayout::Sg2,
			Self::Pharaoh => HeaderLayout::Sg3,
		}
	}

	/// Extension of the pixel files
	pub fn pixel_extension(self) -> &'static str {
		"555"
	}

	/// Human readable title
	pub fn title(self) -> &'static str {
		match self {
			Self::Caesar3 => "Caesar III",
			Self::Pharaoh => "Pharaoh",
		}
	}
}

impl Display for Edition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.title())
	}
}
