//! Bounds-checked cursor over a byte block.
//!
//! All multi-byte values in the archive formats are little-endian. Reads past
//! the end of the block fail with [`SgxError::InsufficientData`] instead of
//! returning zeroes, so a misparsed header surfaces at the first bad read.

use encoding_rs::WINDOWS_1252;

use super::{FileType, SgxError};

/// Little-endian read cursor over a borrowed byte block
#[derive(Debug, Clone)]
pub struct Buffer<'a> {
	data: &'a [u8],
	offset: usize,
	file_type: FileType,
}

impl<'a> Buffer<'a> {
	/// Wraps `data`, tagging read errors with `file_type`.
	pub fn new(data: &'a [u8], file_type: FileType) -> Self {
		Self {
			data,
			offset: 0,
			file_type,
		}
	}

	/// Total size of the block in bytes
	pub fn size(&self) -> usize {
		self.data.len()
	}

	/// Current cursor position
	pub fn offset(&self) -> usize {
		self.offset
	}

	/// Bytes left between the cursor and the end of the block
	pub fn remaining(&self) -> usize {
		self.data.len() - self.offset
	}

	/// Moves the cursor to an absolute position.
	///
	/// Seeking exactly to the end is allowed; seeking past it is an error.
	pub fn set_offset(&mut self, offset: usize) -> Result<(), SgxError> {
		if offset > self.data.len() {
			return Err(SgxError::insufficient_data(
				self.file_type,
				self.offset,
				offset,
				self.data.len(),
			));
		}
		self.offset = offset;
		Ok(())
	}

	/// Advances the cursor by `count` bytes
	pub fn skip(&mut self, count: usize) -> Result<(), SgxError> {
		self.read_bytes(count).map(|_| ())
	}

	/// Returns the next `count` bytes and advances past them
	pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], SgxError> {
		if count > self.remaining() {
			return Err(SgxError::insufficient_data(
				self.file_type,
				self.offset,
				count,
				self.remaining(),
			));
		}
		let bytes = &self.data[self.offset..self.offset + count];
		self.offset += count;
		Ok(bytes)
	}

	/// Fills `dst` with the next `dst.len()` bytes
	pub fn read_raw(&mut self, dst: &mut [u8]) -> Result<(), SgxError> {
		let bytes = self.read_bytes(dst.len())?;
		dst.copy_from_slice(bytes);
		Ok(())
	}

	fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SgxError> {
		let mut bytes = [0u8; N];
		self.read_raw(&mut bytes)?;
		Ok(bytes)
	}

	/// Reads an unsigned byte
	pub fn read_u8(&mut self) -> Result<u8, SgxError> {
		self.read_array::<1>().map(|b| b[0])
	}

	/// Reads a signed byte
	pub fn read_i8(&mut self) -> Result<i8, SgxError> {
		self.read_array::<1>().map(i8::from_le_bytes)
	}

	/// Reads an unsigned 16-bit integer
	pub fn read_u16(&mut self) -> Result<u16, SgxError> {
		self.read_array().map(u16::from_le_bytes)
	}

	/// Reads a signed 16-bit integer
	pub fn read_i16(&mut self) -> Result<i16, SgxError> {
		self.read_array().map(i16::from_le_bytes)
	}

	/// Reads an unsigned 32-bit integer
	pub fn read_u32(&mut self) -> Result<u32, SgxError> {
		self.read_array().map(u32::from_le_bytes)
	}

	/// Reads a signed 32-bit integer
	pub fn read_i32(&mut self) -> Result<i32, SgxError> {
		self.read_array().map(i32::from_le_bytes)
	}

	/// Reads a fixed-width, NUL-padded Windows-1252 string.
	///
	/// Everything from the first NUL on is ignored.
	pub fn read_string(&mut self, width: usize) -> Result<String, SgxError> {
		let bytes = self.read_bytes(width)?;
		let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
		let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(&bytes[..end]);
		Ok(text.into_owned())
	}
}
