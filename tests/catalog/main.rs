//! Catalog tests against archives written to disk

use std::{
	fs,
	path::{Path, PathBuf},
	time::{SystemTime, UNIX_EPOCH},
};

use sgx_benches::{ArchiveBuilder, SyntheticImage};
use sgx_rs::{prelude::*, sgx_types::file::sgx::constants};

fn temp_dir(name: &str) -> PathBuf {
	let stamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
	let dir = std::env::temp_dir().join(format!("sgx_catalog_{name}_{stamp}"));
	fs::create_dir_all(&dir).unwrap();
	dir
}

fn write(root: &Path, name: &str, data: &[u8]) {
	let path = root.join(name);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, data).unwrap();
}

/// A Caesar III style archive with an external walker image
fn caesar3_archive() -> ArchiveBuilder {
	ArchiveBuilder::new(HeaderLayout::Sg2)
		.version(0xD5)
		.bitmap("Housing.bmp", "houses")
		.bitmap("Walker.bmp", "walkers")
		.image(SyntheticImage::plain(0, 2, 2, 0x7FFF))
		.image(SyntheticImage::sprite(0, 4, 3))
		.image(SyntheticImage::external(1, 1, 2, 10))
		.image(SyntheticImage::plain(1, 1, 1, 0x001F).with_mirror(-2))
		.group(1, "housing")
		.group(3, "walker")
}

#[test_log::test]
fn test_caesar3_install() {
	let root = temp_dir("c3");
	let archive = caesar3_archive();
	write(&root, "C3.SG2", &archive.index_bytes());
	write(&root, "555/C3.555", &archive.pixel_bytes());
	write(&root, "555/Walker.555", &archive.external_bytes(1));

	let mut catalog = Catalog::new(CatalogConfig::caesar3(), Box::new(DirVfs::new(&root))).unwrap();
	catalog.load_main(0, false, false).unwrap();

	let collection = catalog.collection("c3").unwrap();
	assert_eq!(collection.image_count(), 5);
	assert_eq!(collection.group_count(), 3);
	assert_eq!(collection.bitmap_names(), &["Housing.bmp", "Walker.bmp"]);

	assert_eq!(catalog.image_id(1), Some(1));
	assert_eq!(catalog.image_id(2), Some(3));
	assert_eq!(catalog.image_by_tag("walker").bitmap_name(), "Walker.bmp");

	assert_eq!(catalog.pixel_data(1).unwrap(), &[0xFFFF_FFFF; 4]);
	let walker = catalog.image(3);
	assert!(walker.is_stored_externally());
	assert_eq!(catalog.image_pixel_data(walker).unwrap(), &[0xFFFF_0000; 2]);
	assert!(!walker.is_external());
	// image 4 mirrors image 2
	assert_eq!(catalog.pixel_data(4), catalog.pixel_data(2));

	fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_caesar3_climates_and_editor() {
	let root = temp_dir("climates");
	let plain = caesar3_archive();
	let north = ArchiveBuilder::new(HeaderLayout::Sg2).bitmap("North.bmp", "").image(SyntheticImage::plain(0, 1, 1, 1));
	write(&root, "c3.sg2", &plain.index_bytes());
	write(&root, "555/c3.555", &plain.pixel_bytes());
	write(&root, "c3_north.sg2", &north.index_bytes());
	write(&root, "555/c3_north.555", &north.pixel_bytes());

	let mut catalog = Catalog::new(CatalogConfig::caesar3(), Box::new(DirVfs::new(&root))).unwrap();
	catalog.load_main(1, false, false).unwrap();
	assert_eq!(catalog.image(1).bitmap_name(), "North.bmp");
	assert_eq!(catalog.current_climate(), Some(1));

	catalog.load_main(0, false, false).unwrap();
	assert_eq!(catalog.image(1).bitmap_name(), "Housing.bmp");

	// no editor archive on disk
	let result = catalog.load_main(0, true, false);
	assert!(matches!(
		result,
		Err(CatalogError::Load {
			ref name,
			source: SgxError::Vfs(VfsError::NotFound(_)),
		}) if name == "c3map"
	));
	assert!(!catalog.is_editor());
	assert_eq!(catalog.image(1).bitmap_name(), "Housing.bmp");

	fs::remove_dir_all(root).unwrap();
}

#[test_log::test]
fn test_pharaoh_install_from_description() {
	let root = temp_dir("pharaoh");
	let general = ArchiveBuilder::new(HeaderLayout::Sg3)
		.bitmap("General.bmp", "")
		.image(SyntheticImage::plain(0, 1, 1, 0x03E0))
		.image(SyntheticImage::isometric(0, 4, 2, 2))
		.group(1, "plaza")
		.group(2, "tile");
	let terrain = ArchiveBuilder::new(HeaderLayout::Sg3)
		.bitmap("Terrain.bmp", "")
		.image(SyntheticImage::plain(0, 1, 1, 0x001F))
		.group(1, "grass");
	let enemy = ArchiveBuilder::new(HeaderLayout::Sg3)
		.bitmap("Hittite.bmp", "")
		.image(SyntheticImage::sprite(0, 3, 3))
		.group(1, "soldier");
	write(&root, "Data/Pharaoh_General.sg3", &general.index_bytes());
	write(&root, "Data/Pharaoh_General.555", &general.pixel_bytes());
	write(&root, "Data/PHARAOH_TERRAIN.SG3", &terrain.index_bytes());
	write(&root, "Data/pharaoh_terrain.555", &terrain.pixel_bytes());
	write(&root, "Data/Hittite.sg3", &enemy.index_bytes());
	write(&root, "Data/Hittite.555", &enemy.pixel_bytes());
	write(
		&root,
		"catalog.toml",
		br#"
		edition = "pharaoh"
		enemies = ["Assyrian", "Hittite"]
		enemy_shift = 900

		[[collections]]
		name = "Pharaoh_General"
		shift = 100

		[[collections]]
		name = "Pharaoh_Terrain"
		shift = 500

		[[group_translation]]
		from = 40
		to = 3
		"#,
	);

	let config = CatalogConfig::from_file(root.join("catalog.toml")).unwrap();
	let mut catalog = Catalog::new(config, Box::new(DirVfs::new(&root))).unwrap();
	catalog.load_main(0, false, false).unwrap();

	// General owns groups 1 and 2, Terrain group 3
	assert_eq!(catalog.image_id(0), Some(100));
	assert_eq!(catalog.image_id(2), Some(102));
	assert_eq!(catalog.image_id(3), Some(501));
	assert_eq!(catalog.image_id(40), Some(501));
	assert_eq!(catalog.image_id(4), None);
	assert_eq!(catalog.groups_shift("Pharaoh_Terrain"), Some(2));

	assert_eq!(catalog.pixel_data(501).unwrap(), &[0xFF00_00FF]);
	let tile = catalog.image_by_tag("tile");
	assert!(matches!(tile.compression(), Compression::Isometric { .. }));
	assert!(catalog.image_pixel_data(tile).is_some());

	assert!(matches!(catalog.load_enemy(0), Err(CatalogError::Load { .. })));
	catalog.load_enemy(1).unwrap();
	assert_eq!(catalog.image_by_tag("soldier").bitmap_name(), "Hittite.bmp");
	assert!(catalog.enemy_pixel_data(901).is_some());
	assert!(catalog.describe().contains("Collection 'Pharaoh_Terrain': shift for groups: 2, shift for images: 3"));

	fs::remove_dir_all(root).unwrap();
}

#[test]
fn test_oversized_index_is_rejected() {
	let root = temp_dir("oversized");
	let file = fs::File::create(root.join("c3.sg2")).unwrap();
	file.set_len(constants::MAX_FILE_SIZE + 1).unwrap();

	let mut catalog = Catalog::new(CatalogConfig::caesar3(), Box::new(DirVfs::new(&root))).unwrap();
	let result = catalog.load_main(0, false, false);
	assert!(matches!(
		result,
		Err(CatalogError::Load {
			source: SgxError::FileTooLarge { .. },
			..
		})
	));
	assert!(catalog.main_collections().is_empty());

	fs::remove_dir_all(root).unwrap();
}
