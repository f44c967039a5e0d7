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

use std::{
    fmt,
    fs::File,
    io,
    marker::PhantomData,
    ops::Deref,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    endian::read_le_u32,
    errors::{MapError, MapResult},
    sys::{Native, Platform},
    types::TableKind,
};

/// An open, read-only table file.
///
/// Closed when dropped or passed to [`FileHandle::close()`].
#[derive(Debug)]
pub struct FileHandle {
    file: File,
    path: PathBuf,
}

impl FileHandle {
    pub(crate) fn new(file: File, path: PathBuf) -> FileHandle {
        FileHandle { file, path }
    }

    /// Opens a file directly, bypassing the search path.
    ///
    /// # Errors
    ///
    /// See [`std::fs::File::open()`].
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<FileHandle> {
        let path = path.as_ref();
        Ok(FileHandle::new(Native::open(path)?, path.to_owned()))
    }

    /// Where the file was found.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the file in bytes.
    ///
    /// # Errors
    ///
    /// See [`std::fs::File::metadata()`].
    pub fn size(&self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn close(self) {
        drop(self);
    }

    pub(crate) fn file(&self) -> &File {
        &self.file
    }
}

/// A read-only view of a table file in memory.
///
/// The length is the file size at the time of mapping and never changes.
/// Empty files produce an empty mapping without involving the operating
/// system. The mapping is released when dropped or passed to
/// [`Mapping::unmap()`], and stays valid after the [`FileHandle`] it was
/// created from is closed.
pub struct Mapping<P: Platform = Native> {
    region: Option<P::Region>,
    platform: PhantomData<fn() -> P>,
}

impl<P: Platform> Mapping<P> {
    /// A mapping of length zero.
    pub fn empty() -> Mapping<P> {
        Mapping {
            region: None,
            platform: PhantomData,
        }
    }

    /// Maps the entire file.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::SizeQuery`] if the size of the file cannot be
    /// determined, or [`MapError::Map`] if the operating system refuses the
    /// mapping. `handle` is not closed in either case.
    pub fn map(handle: &FileHandle) -> MapResult<Mapping<P>> {
        let size = handle.size().map_err(|error| MapError::SizeQuery {
            path: handle.path().to_owned(),
            error,
        })?;
        let len = usize::try_from(size).map_err(|_| MapError::SizeQuery {
            path: handle.path().to_owned(),
            error: io::Error::new(io::ErrorKind::InvalidData, "file too large to map"),
        })?;

        if len == 0 {
            debug!(path = %handle.path().display(), "empty file, nothing to map");
            return Ok(Mapping::empty());
        }

        let region = P::map(handle.file(), len).map_err(|error| MapError::Map {
            path: handle.path().to_owned(),
            error,
        })?;
        debug!(path = %handle.path().display(), len, "mapped table file");

        Ok(Mapping {
            region: Some(region),
            platform: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none()
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self.region {
            Some(ref region) => P::bytes(region),
            None => &[],
        }
    }

    /// The magic header, if the file is at least 4 bytes long.
    pub fn magic(&self) -> Option<u32> {
        read_le_u32(self.as_bytes(), 0)
    }

    /// Releases the mapping. Failures are logged, not returned.
    pub fn unmap(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(region) = self.region.take() {
            let len = P::bytes(&region).len();
            match P::unmap(region) {
                Ok(()) => debug!(len, "unmapped table file"),
                Err(error) => warn!(len, %error, "failed to unmap table file"),
            }
        }
    }
}

impl<P: Platform> Drop for Mapping<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: Platform> Default for Mapping<P> {
    fn default() -> Mapping<P> {
        Mapping::empty()
    }
}

impl<P: Platform> Deref for Mapping<P> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<P: Platform> AsRef<[u8]> for Mapping<P> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl<P: Platform> fmt::Debug for Mapping<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapping")
            .field("len", &self.len())
            .finish()
    }
}

/// A mapped table file whose magic header has been checked.
#[derive(Debug)]
pub struct TableFile<P: Platform = Native> {
    kind: TableKind,
    path: PathBuf,
    mapping: Mapping<P>,
}

impl<P: Platform> TableFile<P> {
    pub(crate) fn new(kind: TableKind, path: PathBuf, mapping: Mapping<P>) -> TableFile<P> {
        TableFile {
            kind,
            path,
            mapping,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The entire file, including the magic header.
    pub fn bytes(&self) -> &[u8] {
        self.mapping.as_bytes()
    }

    pub fn into_mapping(self) -> Mapping<P> {
        self.mapping
    }
}
