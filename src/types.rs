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

use std::fmt;

use crate::{endian::read_le_u32, errors::MagicError};

/// Maximum number of pieces of any supported table.
pub const MAX_PIECES: usize = 7;

/// Kind of table, identified by file suffix and magic header.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TableKind {
    /// Win/draw/loss.
    Wdl,
    /// Distance to mate.
    Dtm,
    /// Distance to zeroing move.
    Dtz,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Wdl, TableKind::Dtm, TableKind::Dtz];

    /// File name suffix, including the dot.
    pub const fn suffix(self) -> &'static str {
        match self {
            TableKind::Wdl => ".rtbw",
            TableKind::Dtm => ".rtbm",
            TableKind::Dtz => ".rtbz",
        }
    }

    /// File extension, without the dot.
    pub const fn extension(self) -> &'static str {
        match self {
            TableKind::Wdl => "rtbw",
            TableKind::Dtm => "rtbm",
            TableKind::Dtz => "rtbz",
        }
    }

    /// The first four bytes of every file of this kind, read as a little
    /// endian integer.
    pub const fn magic(self) -> u32 {
        match self {
            TableKind::Wdl => 0x5d23_e871,
            TableKind::Dtm => 0x88ac_504b,
            TableKind::Dtz => 0xa50c_66d7,
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<TableKind> {
        TableKind::ALL.into_iter().find(|k| k.suffix() == suffix)
    }

    pub fn from_extension(ext: &str) -> Option<TableKind> {
        TableKind::ALL.into_iter().find(|k| k.extension() == ext)
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Validates the magic header of file contents.
    ///
    /// # Errors
    ///
    /// Errors if `bytes` is shorter than 4 bytes or does not start with
    /// [`TableKind::magic()`].
    pub fn check_magic(self, bytes: &[u8]) -> Result<(), MagicError> {
        if read_le_u32(bytes, 0) == Some(self.magic()) {
            return Ok(());
        }
        let mut found = [0; 4];
        let n = bytes.len().min(4);
        found[..n].copy_from_slice(&bytes[..n]);
        Err(MagicError { kind: self, found })
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableKind::Wdl => "wdl",
            TableKind::Dtm => "dtm",
            TableKind::Dtz => "dtz",
        })
    }
}
