//! Virtual file system for the `sgx-rs` project.
//!
//! Archive loaders never touch `std::fs` directly. They ask a [`Vfs`] for a file
//! by a relative, `/`-separated name such as `Data/Pharaoh_General.sg3`, which
//! keeps search-path policy (and tests) out of the format parsers.
//!
//! Two implementations are provided:
//!
//! - [`DirVfs`]: files below a root directory on disk. Every path component is
//!   matched exactly first and case-insensitively second, since game data is
//!   shipped with inconsistent capitalisation.
//! - [`MemoryVfs`]: an in-memory map, handy for embedding and for tests.
//!
//! # Examples
//!
//! ```no_run
//! use sgx_vfs::{DirVfs, Vfs};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let vfs = DirVfs::new("/games/pharaoh");
//! let header = vfs.read_part("Data/Pharaoh_General.sg3", 0, 80)?;
//! println!("{} header bytes", header.len());
//! # Ok(())
//! # }
//! ```

use std::{
	collections::HashMap,
	fs,
	io::{Read, Seek, SeekFrom},
	path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

/// Errors that can occur when looking up or reading files
#[derive(Debug, Error)]
pub enum VfsError {
	/// No file with that name exists
	#[error("File not found: '{0}'")]
	NotFound(String),

	/// Requested range lies outside of the file
	#[error("Read out of range in '{name}': {offset}+{length} exceeds file size {size}")]
	OutOfRange {
		/// Name of the file
		name: String,
		/// Start of the requested range
		offset: u64,
		/// Length of the requested range
		length: usize,
		/// Actual size of the file
		size: u64,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Read-only access to named files.
pub trait Vfs: Send + Sync {
	/// Reads the whole file.
	fn read(&self, name: &str) -> Result<Vec<u8>, VfsError>;

	/// Reads exactly `length` bytes starting at `offset`.
	fn read_part(&self, name: &str, offset: u64, length: usize) -> Result<Vec<u8>, VfsError>;

	/// Returns the size of the file in bytes.
	fn file_size(&self, name: &str) -> Result<u64, VfsError>;

	/// Returns `true` if the file exists.
	fn exists(&self, name: &str) -> bool {
		self.file_size(name).is_ok()
	}
}

/// Files below a root directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirVfs {
	root: PathBuf,
}

impl DirVfs {
	/// Creates a file system rooted at `root`
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self {
			root: root.into(),
		}
	}

	/// Returns the root directory
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Resolves a relative name to an existing file on disk.
	///
	/// Each component is tried verbatim first, then matched against the
	/// directory listing ignoring ASCII case.
	pub fn resolve(&self, name: &str) -> Option<PathBuf> {
		let mut path = self.root.clone();
		for component in components(name) {
			let exact = path.join(component);
			path = if exact.exists() {
				exact
			} else {
				let found = find_ignore_case(&path, component)?;
				debug!("Resolved '{component}' as '{}'", found.display());
				found
			};
		}
		path.is_file().then_some(path)
	}

	fn resolve_or_err(&self, name: &str) -> Result<PathBuf, VfsError> {
		self.resolve(name).ok_or_else(|| VfsError::NotFound(name.to_string()))
	}
}

impl Vfs for DirVfs {
	fn read(&self, name: &str) -> Result<Vec<u8>, VfsError> {
		let path = self.resolve_or_err(name)?;
		Ok(fs::read(path)?)
	}

	fn read_part(&self, name: &str, offset: u64, length: usize) -> Result<Vec<u8>, VfsError> {
		let path = self.resolve_or_err(name)?;
		let mut file = fs::File::open(path)?;
		let size = file.metadata()?.len();
		check_range(name, offset, length, size)?;

		file.seek(SeekFrom::Start(offset))?;
		let mut data = vec![0u8; length];
		file.read_exact(&mut data)?;
		Ok(data)
	}

	fn file_size(&self, name: &str) -> Result<u64, VfsError> {
		let path = self.resolve_or_err(name)?;
		Ok(fs::metadata(path)?.len())
	}
}

/// In-memory files, keyed by case-insensitive name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryVfs {
	files: HashMap<String, Vec<u8>>,
}

impl MemoryVfs {
	/// Creates an empty file system
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds or replaces a file
	pub fn insert(&mut self, name: &str, data: impl Into<Vec<u8>>) {
		self.files.insert(normalize(name), data.into());
	}

	/// Removes a file, returning its contents
	pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
		self.files.remove(&normalize(name))
	}

	/// Number of files stored
	pub fn len(&self) -> usize {
		self.files.len()
	}

	/// Returns `true` if no files are stored
	pub fn is_empty(&self) -> bool {
		self.files.is_empty()
	}

	fn get(&self, name: &str) -> Result<&[u8], VfsError> {
		self.files
			.get(&normalize(name))
			.map(Vec::as_slice)
			.ok_or_else(|| VfsError::NotFound(name.to_string()))
	}
}

impl Vfs for MemoryVfs {
	fn read(&self, name: &str) -> Result<Vec<u8>, VfsError> {
		self.get(name).map(<[u8]>::to_vec)
	}

	fn read_part(&self, name: &str, offset: u64, length: usize) -> Result<Vec<u8>, VfsError> {
		let data = self.get(name)?;
		check_range(name, offset, length, data.len() as u64)?;
		let start = offset as usize;
		Ok(data[start..start + length].to_vec())
	}

	fn file_size(&self, name: &str) -> Result<u64, VfsError> {
		self.get(name).map(|data| data.len() as u64)
	}
}

/// Replaces the extension of the last path component, or appends one.
///
/// ```
/// assert_eq!(sgx_vfs::change_extension("Data/Temple.bmp", "555"), "Data/Temple.555");
/// assert_eq!(sgx_vfs::change_extension("Temple", "555"), "Temple.555");
/// ```
pub fn change_extension(name: &str, extension: &str) -> String {
	let file_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
	let stem = match name[file_start..].rfind('.') {
		Some(dot) => &name[..file_start + dot],
		None => name,
	};
	format!("{stem}.{extension}")
}

/// Returns `true` if the last path component ends with `.extension`, ignoring case.
pub fn has_extension(name: &str, extension: &str) -> bool {
	let file_start = name.rfind(['/', '\\']).map_or(0, |i| i + 1);
	name[file_start..]
		.rsplit_once('.')
		.is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
}

/// Joins a folder and a file name with the separator used by [`Vfs`] names.
pub fn join(folder: &str, name: &str) -> String {
	if folder.is_empty() {
		name.to_string()
	} else {
		format!("{folder}/{name}")
	}
}

fn components(name: &str) -> impl Iterator<Item = &str> {
	name.split(['/', '\\']).filter(|c| !c.is_empty() && *c != ".")
}

fn normalize(name: &str) -> String {
	components(name).map(str::to_ascii_lowercase).collect::<Vec<_>>().join("/")
}

fn find_ignore_case(dir: &Path, component: &str) -> Option<PathBuf> {
	fs::read_dir(dir)
		.ok()?
		.filter_map(Result::ok)
		.find(|entry| {
			entry.file_name().to_str().is_some_and(|n| n.eq_ignore_ascii_case(component))
		})
		.map(|entry| entry.path())
}

fn check_range(name: &str, offset: u64, length: usize, size: u64) -> Result<(), VfsError> {
	match offset.checked_add(length as u64) {
		Some(end) if end <= size => Ok(()),
		_ => Err(VfsError::OutOfRange {
			name: name.to_string(),
			offset,
			length,
			size,
		}),
	}
}
