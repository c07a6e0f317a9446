//! CORDIC frame codec
//!
//! The input frame is four 16-bit words packed into one 64-bit value and
//! sent least-significant byte first:
//!
//! ```text
//! packed = atan0 << 48 | alpha << 32 | y << 16 | x
//! bytes  = [packed >> 0, packed >> 8, ..., packed >> 56] & 0xFF
//! ```
//!
//! The output frame is three 16-bit words, each sent as a little-endian
//! byte pair: `alpha`, `cos`, `sin`.

use crate::error::{Error, Result};

/// Size of an encoded input frame in bytes
pub const INPUT_FRAME_LEN: usize = 8;

/// Size of an encoded output frame in bytes
pub const OUTPUT_FRAME_LEN: usize = 6;

/// Operands sent to the CORDIC unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputFrame {
    /// Initial x coordinate
    pub x: u16,
    /// Initial y coordinate
    pub y: u16,
    /// Target rotation angle
    pub alpha: u16,
    /// First arctangent table entry, atan(2^0)
    pub atan0: u16,
}

impl InputFrame {
    /// Create an input frame from four 16-bit words
    pub const fn new(x: u16, y: u16, alpha: u16, atan0: u16) -> Self {
        Self { x, y, alpha, atan0 }
    }

    /// Create an input frame from wider words, keeping the low 16 bits
    ///
    /// Wider values are never rejected. A warning is logged for every
    /// operand that had bits above bit 15.
    pub fn from_words_truncating(x: u32, y: u32, alpha: u32, atan0: u32) -> Self {
        for (name, value) in [("x", x), ("y", y), ("alpha", alpha), ("atan0", atan0)] {
            if value > u16::MAX as u32 {
                log::warn!(
                    "frame: {}=0x{:x} does not fit in 16 bits, truncated to 0x{:04x}",
                    name,
                    value,
                    value & 0xFFFF
                );
            }
        }
        Self::new(x as u16, y as u16, alpha as u16, atan0 as u16)
    }

    /// Pack into the 64-bit wire word
    pub const fn pack(&self) -> u64 {
        ((self.atan0 as u64) << 48)
            | ((self.alpha as u64) << 32)
            | ((self.y as u64) << 16)
            | (self.x as u64)
    }

    /// Unpack from the 64-bit wire word
    pub const fn from_packed(packed: u64) -> Self {
        Self {
            x: packed as u16,
            y: (packed >> 16) as u16,
            alpha: (packed >> 32) as u16,
            atan0: (packed >> 48) as u16,
        }
    }

    /// Encode into wire order (least significant byte first)
    pub const fn encode(&self) -> [u8; INPUT_FRAME_LEN] {
        self.pack().to_le_bytes()
    }

    /// Decode a received input frame (device side)
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; INPUT_FRAME_LEN] = take(bytes)?;
        Ok(Self::from_packed(u64::from_le_bytes(raw)))
    }
}

/// Results read back from the CORDIC unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutputFrame {
    /// Residual angle
    pub alpha: u16,
    /// Cosine of the input angle
    pub cos: u16,
    /// Sine of the input angle
    pub sin: u16,
}

impl OutputFrame {
    /// Create an output frame
    pub const fn new(alpha: u16, cos: u16, sin: u16) -> Self {
        Self { alpha, cos, sin }
    }

    /// Decode from received bytes
    ///
    /// Fewer than [`OUTPUT_FRAME_LEN`] bytes is a framing error. Bytes past
    /// the frame are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let raw: [u8; OUTPUT_FRAME_LEN] = take(bytes)?;
        Ok(Self {
            alpha: u16::from_le_bytes([raw[0], raw[1]]),
            cos: u16::from_le_bytes([raw[2], raw[3]]),
            sin: u16::from_le_bytes([raw[4], raw[5]]),
        })
    }

    /// Encode into wire order (device side)
    pub const fn encode(&self) -> [u8; OUTPUT_FRAME_LEN] {
        let a = self.alpha.to_le_bytes();
        let c = self.cos.to_le_bytes();
        let s = self.sin.to_le_bytes();
        [a[0], a[1], c[0], c[1], s[0], s[1]]
    }
}

/// Copy the first `N` bytes out, or report how short the input was
fn take<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    let head = bytes.get(..N).ok_or(Error::Framing {
        expected: N,
        found: bytes.len(),
    })?;
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    Ok(out)
}
