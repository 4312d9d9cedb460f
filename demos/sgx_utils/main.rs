//! SG2/SG3 archive utility.
//!
//! Provides these subcommands:
//! - `info`: summary of every loaded collection
//! - `groups`: image groups of one collection with their tags and frames
//! - `tags`: look up images by group tag across the catalog
//! - `image`: image record as JSON, by global id or group number
//! - `export`: write an image to PNG
//!
//! # Usage
//!
//! ```bash
//! # Summary of a Caesar III install
//! cargo run --example sgx_utils -- -r /games/caesar3 info
//!
//! # Pharaoh, using a custom catalog description
//! cargo run --example sgx_utils -- -r /games/pharaoh -c pharaoh.toml groups Pharaoh_General
//!
//! # First image of group 16 as JSON
//! cargo run --example sgx_utils -- -r /games/caesar3 image --group 16
//!
//! # Export image 1234
//! cargo run --example sgx_utils -- -r /games/caesar3 export 1234 -o statue.png
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{Rgba, RgbaImage};
use serde::Serialize;
use sgx_rs::prelude::*;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

	let cli = Cli::parse();
	let catalog = open_catalog(&cli.catalog)?;
	match cli.command {
		Command::Info => run_info(&catalog),
		Command::Groups {
			collection,
		} => run_groups(&catalog, &collection),
		Command::Tags {
			tags,
		} => run_tags(&catalog, &tags),
		Command::Image(target) => run_image(&catalog, &target),
		Command::Export {
			target,
			output,
		} => run_export(&catalog, &target, output),
	}
}

#[derive(Parser)]
#[command(name = "sgx_utils")]
#[command(author = "sgx-rs project")]
#[command(version)]
#[command(about = "Inspect and export images of SG2/SG3 archives", long_about = None)]
struct Cli {
	#[command(flatten)]
	catalog: CatalogArgs,

	#[command(subcommand)]
	command: Command,
}

#[derive(Args)]
struct CatalogArgs {
	/// Game installation directory
	#[arg(short, long, value_name = "DIR", env = "SGX_ROOT", default_value = ".")]
	root: PathBuf,

	/// Built-in archive set
	#[arg(short, long, value_enum, default_value_t = Game::Caesar3)]
	game: Game,

	/// Catalog description file, replacing the built-in archive set
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Climate of the main archives
	#[arg(long, default_value_t = 0)]
	climate: usize,

	/// Load the editor archives
	#[arg(long, default_value_t = false)]
	editor: bool,

	/// Also load this enemy archive
	#[arg(long, value_name = "ID")]
	enemy: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Game {
	Caesar3,
	Pharaoh,
}

#[derive(Subcommand)]
enum Command {
	/// Summarize every loaded collection
	Info,
	/// List the image groups of a collection
	Groups {
		/// Collection name
		collection: String,
	},
	/// Look up the first image of groups by tag
	Tags {
		/// Group tags
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Print an image record as JSON
	Image(Target),
	/// Export an image to PNG
	Export {
		#[command(flatten)]
		target: Target,

		/// Output file (defaults to `image_<ID>.png`)
		#[arg(short, long, value_name = "PNG")]
		output: Option<PathBuf>,
	},
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
	/// Global image id
	id: Option<i32>,

	/// Group number, selecting its first image
	#[arg(long)]
	group: Option<i32>,

	/// Group tag, selecting its first image
	#[arg(long)]
	tag: Option<String>,
}

/// JSON view of an image record
#[derive(Serialize)]
struct ImageReport<'a> {
	id: Option<i32>,
	collection: &'a str,
	#[serde(flatten)]
	image: &'a Image,
	compression: String,
	pixels: Option<usize>,
}

fn open_catalog(args: &CatalogArgs) -> Result<Catalog> {
	let config = match (&args.config, args.game) {
		(Some(path), _) => CatalogConfig::from_file(path)
			.with_context(|| format!("Reading catalog description {}", path.display()))?,
		(None, Game::Caesar3) => CatalogConfig::caesar3(),
		(None, Game::Pharaoh) => CatalogConfig::pharaoh(),
	};
	if !args.root.is_dir() {
		bail!("{} is not a directory", args.root.display());
	}

	let mut catalog = Catalog::new(config, Box::new(DirVfs::new(&args.root)))?;
	catalog
		.load_main(args.climate, args.editor, false)
		.with_context(|| format!("Loading archives from {}", args.root.display()))?;
	if let Some(enemy) = args.enemy {
		catalog.load_enemy(enemy)?;
	}
	Ok(catalog)
}

fn run_info(catalog: &Catalog) -> Result<()> {
	println!("{}", catalog.config().edition.title());
	for collection in catalog.collections() {
		println!("{collection}");
		if let Some(header) = collection.header() {
			println!("  {header}");
		}
		let external = collection.images().iter().filter(|i| i.is_stored_externally()).count();
		println!(
			"  groups shift {}, images shift {}, {external} external images",
			catalog.groups_shift(collection.name()).unwrap_or_default(),
			catalog.images_shift(collection.name()).unwrap_or_default(),
		);
	}
	Ok(())
}

fn run_groups(catalog: &Catalog, name: &str) -> Result<()> {
	let collection = catalog.collection(name).with_context(|| format!("No collection named '{name}'"))?;
	print!("{}", collection.describe());
	Ok(())
}

fn run_tags(catalog: &Catalog, tags: &[String]) -> Result<()> {
	for tag in tags {
		let image = catalog.image_by_tag(tag);
		if image.is_dummy() {
			println!("{tag}: not found");
		} else {
			println!("{tag}: {image}");
		}
	}
	Ok(())
}

/// Resolves a target to the global id (when known) and the image
fn resolve<'a>(catalog: &'a Catalog, target: &Target) -> Result<(Option<i32>, &'a Image)> {
	let (id, image) = match (target.id, target.group, &target.tag) {
		(Some(id), _, _) => (Some(id), catalog.image(id)),
		(_, Some(group), _) => {
			let id = catalog.image_id(group).with_context(|| format!("No image group {group}"))?;
			(Some(id), catalog.image(id))
		}
		(_, _, Some(tag)) => (None, catalog.image_by_tag(tag)),
		_ => bail!("Missing image id, group or tag"),
	};
	if image.is_dummy() {
		bail!("Image not found");
	}
	Ok((id, image))
}

fn run_image(catalog: &Catalog, target: &Target) -> Result<()> {
	let (id, image) = resolve(catalog, target)?;
	let collection = catalog.collections().find(|c| c.owns(image)).map_or("", ImageCollection::name);
	let report = ImageReport {
		id,
		collection,
		image,
		compression: image.compression().to_string(),
		pixels: catalog.image_pixel_data(image).map(<[u32]>::len),
	};
	println!("{}", serde_json::to_string_pretty(&report)?);
	Ok(())
}

fn run_export(catalog: &Catalog, target: &Target, output: Option<PathBuf>) -> Result<()> {
	let (id, image) = resolve(catalog, target)?;
	// mirrored images are drawn with their target's pixels and layout
	let image = id.map_or(image, |id| catalog.mirror_target(id));
	let pixels = catalog.image_pixel_data(image).context("Image has no pixel data")?;

	let canvas = rasterize(image, pixels)?;
	let output = output.unwrap_or_else(|| PathBuf::from(format!("image_{}.png", id.unwrap_or_default())));
	canvas.save(&output).with_context(|| format!("Writing {}", output.display()))?;
	println!("Wrote {}x{} image to {}", canvas.width(), canvas.height(), output.display());
	Ok(())
}

/// Lays decoded pixels out on a canvas of the image's size.
fn rasterize(image: &Image, pixels: &[u32]) -> Result<RgbaImage> {
	let width = u32::from(image.width());
	let height = u32::from(image.height());
	let mut canvas = RgbaImage::new(width, height);
	if width == 0 {
		return Ok(canvas);
	}

	let mut put = |position: usize, argb: u32| {
		let (x, y) = ((position % width as usize) as u32, (position / width as usize) as u32);
		if y < height {
			let [a, r, g, b] = argb.to_be_bytes();
			canvas.put_pixel(x, y, Rgba([r, g, b, a]));
		}
	};

	match image.compression() {
		Compression::Uncompressed => {
			for (position, &argb) in pixels.iter().enumerate() {
				put(position, argb);
			}
		}
		Compression::Compressed => {
			let mut position = 0;
			let mut values = pixels.iter().copied();
			while let Some(control) = values.next() {
				if control == u32::from(file::codec::TRANSPARENT_RUN) {
					position += values.next().unwrap_or_default() as usize;
					continue;
				}
				for argb in values.by_ref().take(control as usize) {
					put(position, argb);
					position += 1;
				}
			}
		}
		Compression::Isometric {
			..
		} => bail!("Isometric tiles cannot be exported"),
	}
	Ok(canvas)
}
