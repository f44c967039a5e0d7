// This file is part of the syzygy-platform library.
// Copyright (C) 2017-2025 Niklas Fiekas <niklas.fiekas@backscattering.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Normalizing on-disk fields to host byte order.
//!
//! Table files store some fields little endian and others big endian,
//! regardless of the machine that reads them.

use byteorder::{ByteOrder as _, NativeEndian};

/// Byte order of a machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Byte order of the target, fixed at build time.
    pub const HOST: Endian = if cfg!(target_endian = "big") {
        Endian::Big
    } else {
        Endian::Little
    };
}

#[inline]
pub const fn bswap16(x: u16) -> u16 {
    x.swap_bytes()
}

#[inline]
pub const fn bswap32(x: u32) -> u32 {
    x.swap_bytes()
}

#[inline]
pub const fn bswap64(x: u64) -> u64 {
    x.swap_bytes()
}

/// Converts a little endian `u16` to host order.
#[inline]
pub const fn from_le_u16(x: u16) -> u16 {
    match Endian::HOST {
        Endian::Little => x,
        Endian::Big => bswap16(x),
    }
}

/// Converts a little endian `u32` to host order.
#[inline]
pub const fn from_le_u32(x: u32) -> u32 {
    match Endian::HOST {
        Endian::Little => x,
        Endian::Big => bswap32(x),
    }
}

/// Converts a big endian `u32` to host order.
#[inline]
pub const fn from_be_u32(x: u32) -> u32 {
    match Endian::HOST {
        Endian::Little => bswap32(x),
        Endian::Big => x,
    }
}

/// Converts a big endian `u64` to host order.
#[inline]
pub const fn from_be_u64(x: u64) -> u64 {
    match Endian::HOST {
        Endian::Little => bswap64(x),
        Endian::Big => x,
    }
}

fn window(buf: &[u8], pos: usize, len: usize) -> Option<&[u8]> {
    buf.get(pos..pos.checked_add(len)?)
}

/// Reads a little endian `u16` at `pos`, or `None` if out of bounds.
#[inline]
pub fn read_le_u16(buf: &[u8], pos: usize) -> Option<u16> {
    window(buf, pos, 2).map(|b| from_le_u16(NativeEndian::read_u16(b)))
}

/// Reads a little endian `u32` at `pos`, or `None` if out of bounds.
#[inline]
pub fn read_le_u32(buf: &[u8], pos: usize) -> Option<u32> {
    window(buf, pos, 4).map(|b| from_le_u32(NativeEndian::read_u32(b)))
}

/// Reads a big endian `u32` at `pos`, or `None` if out of bounds.
#[inline]
pub fn read_be_u32(buf: &[u8], pos: usize) -> Option<u32> {
    window(buf, pos, 4).map(|b| from_be_u32(NativeEndian::read_u32(b)))
}

/// Reads a big endian `u64` at `pos`, or `None` if out of bounds.
#[inline]
pub fn read_be_u64(buf: &[u8], pos: usize) -> Option<u64> {
    window(buf, pos, 8).map(|b| from_be_u64(NativeEndian::read_u64(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host() {
        assert_eq!(Endian::HOST == Endian::Little, cfg!(target_endian = "little"));
    }

    #[test]
    fn test_bswap_involution() {
        for x in [0, 1, 0x1234, 0xff00, u16::MAX] {
            assert_eq!(bswap16(bswap16(x)), x);
        }
        for x in [0, 1, 0x1234_5678, 0xdead_beef, u32::MAX] {
            assert_eq!(bswap32(bswap32(x)), x);
        }
        for x in [0, 1, 0x0123_4567_89ab_cdef, u64::MAX] {
            assert_eq!(bswap64(bswap64(x)), x);
        }
        assert_eq!(bswap32(0x1234_5678), 0x7856_3412);
    }

    #[test]
    fn test_conversions_match_std() {
        let bytes = [0x71, 0xe8, 0x23, 0x5d, 0x01, 0x02, 0x03, 0x04];
        let native32 = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(from_le_u32(native32), u32::from_le_bytes([0x71, 0xe8, 0x23, 0x5d]));
        assert_eq!(from_be_u32(native32), u32::from_be_bytes([0x71, 0xe8, 0x23, 0x5d]));
        assert_eq!(from_be_u64(u64::from_ne_bytes(bytes)), u64::from_be_bytes(bytes));
        assert_eq!(from_le_u16(u16::from_ne_bytes([0x34, 0x12])), 0x1234);
    }

    #[test]
    fn test_read() {
        let buf = [0x71, 0xe8, 0x23, 0x5d, 0, 0, 0, 0, 0x2a];
        assert_eq!(read_le_u32(&buf, 0), Some(0x5d23_e871));
        assert_eq!(read_be_u32(&buf, 0), Some(0x71e8_235d));
        assert_eq!(read_le_u16(&buf, 7), Some(0x2a00));
        assert_eq!(read_be_u64(&buf, 1), Some(0xe823_5d00_0000_002a));
        assert_eq!(read_le_u16(&buf, 8), None);
        assert_eq!(read_le_u32(&buf, usize::MAX), None);
        assert_eq!(read_be_u64(&buf, 2), None);
    }
}
