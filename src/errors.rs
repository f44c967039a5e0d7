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

use std::{error::Error, fmt, io, path::PathBuf};

use crate::types::TableKind;

pub type OpenResult<T> = Result<T, OpenError>;

pub type MapResult<T> = Result<T, MapError>;

pub type TableResult<T> = Result<T, TableError>;

/// Error when locating a table file.
#[derive(Debug)]
pub enum OpenError {
    /// No directory of the search path contains a readable file with the
    /// requested name. Always the case for an empty search path.
    NotFound {
        /// The requested file name, `<base><suffix>`.
        file_name: String,
        /// Number of directories that were tried.
        searched: usize,
        /// Reason the last candidate could not be opened, if there was
        /// any candidate.
        last_error: Option<io::Error>,
    },
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::NotFound {
                file_name,
                searched,
                ..
            } => write!(f, "{file_name} not found in {searched} directories"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            OpenError::NotFound { last_error, .. } => {
                last_error.as_ref().map(|e| e as &(dyn Error + 'static))
            }
        }
    }
}

/// Error when mapping an open table file.
///
/// The file handle is still owned by the caller.
#[derive(Debug)]
pub enum MapError {
    /// Could not determine the file size, or it does not fit the address
    /// space.
    SizeQuery {
        #[allow(missing_docs)]
        path: PathBuf,
        #[allow(missing_docs)]
        error: io::Error,
    },
    /// The operating system refused the mapping.
    Map {
        #[allow(missing_docs)]
        path: PathBuf,
        #[allow(missing_docs)]
        error: io::Error,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::SizeQuery { path, error } => {
                write!(f, "could not determine size of {}: {error}", path.display())
            }
            MapError::Map { path, error } => {
                write!(f, "could not map {}: {error}", path.display())
            }
        }
    }
}

impl Error for MapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MapError::SizeQuery { error, .. } | MapError::Map { error, .. } => Some(error),
        }
    }
}

/// Table file has unexpected magic header bytes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MagicError {
    /// The kind of table that was expected.
    pub kind: TableKind,
    /// The first bytes of the file, zero padded if it is shorter.
    pub found: [u8; 4],
}

impl fmt::Display for MagicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid magic header bytes for {} table: {:x?}",
            self.kind, self.found
        )
    }
}

impl Error for MagicError {}

/// Error when opening and validating a table file.
#[derive(Debug)]
pub enum TableError {
    Open(OpenError),
    Map(MapError),
    Magic {
        #[allow(missing_docs)]
        path: PathBuf,
        #[allow(missing_docs)]
        error: MagicError,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Open(error) => fmt::Display::fmt(error, f),
            TableError::Map(error) => fmt::Display::fmt(error, f),
            TableError::Magic { path, error } => write!(f, "{}: {error}", path.display()),
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TableError::Open(error) => error.source(),
            TableError::Map(error) => error.source(),
            TableError::Magic { error, .. } => Some(error),
        }
    }
}

impl From<OpenError> for TableError {
    fn from(error: OpenError) -> TableError {
        TableError::Open(error)
    }
}

impl From<MapError> for TableError {
    fn from(error: MapError) -> TableError {
        TableError::Map(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = OpenError::NotFound {
            file_name: "KQvK.rtbw".to_owned(),
            searched: 2,
            last_error: None,
        };
        assert_eq!(err.to_string(), "KQvK.rtbw not found in 2 directories");
        assert!(err.source().is_none());

        let err = TableError::Magic {
            path: PathBuf::from("KQvK.rtbz"),
            error: MagicError {
                kind: TableKind::Dtz,
                found: [0x71, 0xe8, 0x23, 0x5d],
            },
        };
        assert_eq!(
            err.to_string(),
            "KQvK.rtbz: invalid magic header bytes for dtz table: [71, e8, 23, 5d]"
        );
    }

    #[test]
    fn test_map_error_source() {
        let err = MapError::Map {
            path: PathBuf::from("KQvK.rtbw"),
            error: io::Error::from(io::ErrorKind::OutOfMemory),
        };
        assert!(err.source().is_some());
        assert!(TableError::from(err).to_string().starts_with("could not map KQvK.rtbw"));
    }
}
