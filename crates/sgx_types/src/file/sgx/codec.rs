//! Pixel conversion for `.555` data.
//!
//! Source pixels are 16-bit `xRRRRRGGGGGBBBBB` values. They are widened to
//! packed 32-bit ARGB with a fixed opaque alpha by replicating the top bits of
//! each 5-bit channel into the low bits of the 8-bit channel.
//!
//! Three encodings exist:
//!
//! - **Uncompressed**: `amount / 2` consecutive source pixels, one output value each.
//! - **Compressed**: a byte-oriented run-length stream. Each run starts with a
//!   control byte. `255` means "transparent run": the next byte is the number of
//!   pixels to skip, and both bytes are copied to the output as-is (`255, n`).
//!   Any other value `n` is a literal run: `n` is copied to the output, followed
//!   by `n` widened source pixels. A transparent run costs 2 bytes of the
//!   declared length, a literal run `n * 2 + 1`.
//! - **Isometric**: an uncompressed prefix (the tile footprint) followed by a
//!   compressed remainder (the part sticking out above the footprint).
//!
//! Output is appended to a caller-owned `Vec<u32>`, so a collection can decode
//! every image into one contiguous pool.

use crate::file::{SgxError, buffer::Buffer};

/// Alpha bits OR-ed into every widened pixel
pub const ALPHA_OPAQUE: u32 = 0xFF00_0000;

/// Control byte introducing a run of transparent pixels
pub const TRANSPARENT_RUN: u8 = 255;

/// How an image's pixel stream is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
	/// Plain 16-bit pixels
	Uncompressed,

	/// Run-length encoded sprite
	Compressed,

	/// Isometric tile: uncompressed footprint followed by a compressed top
	Isometric {
		/// Length in bytes of the uncompressed prefix
		uncompressed_length: usize,
	},
}

impl std::fmt::Display for Compression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Compression::Uncompressed => write!(f, "uncompressed"),
			Compression::Compressed => write!(f, "compressed"),
			Compression::Isometric {
				uncompressed_length,
			} => write!(f, "isometric ({uncompressed_length} bytes plain)"),
		}
	}
}

/// Widens a 5-5-5 pixel to opaque 32-bit ARGB.
#[inline]
pub const fn to_32_bit(c: u16) -> u32 {
	let c = c as u32;
	ALPHA_OPAQUE
		| ((c & 0x7c00) << 9)
		| ((c & 0x7000) << 4)
		| ((c & 0x3e0) << 6)
		| ((c & 0x380) << 1)
		| ((c & 0x1f) << 3)
		| ((c & 0x1c) >> 2)
}

/// Converts `amount` bytes of plain pixels, returning the number of values written.
pub fn convert_uncompressed(
	buffer: &mut Buffer<'_>,
	amount: usize,
	dst: &mut Vec<u32>,
) -> Result<usize, SgxError> {
	if amount % 2 != 0 {
		return Err(SgxError::PixelBudgetOverrun {
			overrun: 1,
		});
	}

	let count = amount / 2;
	dst.reserve(count);
	for _ in 0..count {
		dst.push(to_32_bit(buffer.read_u16()?));
	}
	Ok(count)
}

/// Converts `amount` bytes of run-length data, returning the number of values written.
///
/// Fails with [`SgxError::PixelBudgetOverrun`] if the last run extends past
/// `amount`, which only happens with a corrupt stream or a misparsed record.
pub fn convert_compressed(
	buffer: &mut Buffer<'_>,
	amount: usize,
	dst: &mut Vec<u32>,
) -> Result<usize, SgxError> {
	let start = dst.len();
	let mut remaining = amount;

	while remaining > 0 {
		let control = buffer.read_u8()?;
		let cost = if control == TRANSPARENT_RUN {
			dst.push(u32::from(TRANSPARENT_RUN));
			dst.push(u32::from(buffer.read_u8()?));
			2
		} else {
			dst.push(u32::from(control));
			for _ in 0..control {
				dst.push(to_32_bit(buffer.read_u16()?));
			}
			usize::from(control) * 2 + 1
		};

		remaining = remaining.checked_sub(cost).ok_or_else(|| SgxError::PixelBudgetOverrun {
			overrun: cost - remaining,
		})?;
	}

	Ok(dst.len() - start)
}

/// Converts one image stream of `data_length` bytes, returning the number of values written.
pub fn convert(
	compression: Compression,
	data_length: usize,
	buffer: &mut Buffer<'_>,
	dst: &mut Vec<u32>,
) -> Result<usize, SgxError> {
	match compression {
		Compression::Uncompressed => convert_uncompressed(buffer, data_length, dst),
		Compression::Compressed => convert_compressed(buffer, data_length, dst),
		Compression::Isometric {
			uncompressed_length,
		} => {
			let rest = data_length.checked_sub(uncompressed_length).ok_or_else(|| {
				SgxError::PixelBudgetOverrun {
					overrun: uncompressed_length - data_length,
				}
			})?;
			let plain = convert_uncompressed(buffer, uncompressed_length, dst)?;
			let packed = convert_compressed(buffer, rest, dst)?;
			Ok(plain + packed)
		}
	}
}
