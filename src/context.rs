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

use std::{fmt, marker::PhantomData, path::PathBuf};

use tracing::{debug, trace};

use crate::{
    errors::{MapResult, OpenError, OpenResult, TableError, TableResult},
    inventory::Inventory,
    lazy::Lazy,
    mapping::{FileHandle, Mapping, TableFile},
    paths::SearchPath,
    sys::{Native, Platform},
    types::TableKind,
};

/// Everything needed to find and map table files: the search path and the
/// lazily built [`Inventory`] of available tables.
///
/// The search path can only be changed through `&mut self`, so it can never
/// change while another thread is looking up files through a shared
/// reference. Configure it before handing the context to probing threads.
pub struct Context<P: Platform = Native> {
    search_path: SearchPath,
    inventory: Lazy<Inventory>,
    platform: PhantomData<fn() -> P>,
}

impl<P: Platform> Default for Context<P> {
    fn default() -> Context<P> {
        Context::with_platform(SearchPath::new())
    }
}

impl Context<Native> {
    /// Creates a context with an empty search path.
    pub fn new() -> Context {
        Context::default()
    }

    /// Creates a context configured from the `SYZYGY_PATH` environment
    /// variable, or with an empty search path if it is not set.
    pub fn from_env() -> Context {
        Context::with_search_path(SearchPath::from_default_env().unwrap_or_default())
    }

    pub fn with_search_path(search_path: SearchPath) -> Context {
        Context::with_platform(search_path)
    }
}

impl<P: Platform> Context<P> {
    /// Creates a context for a specific [`Platform`], like
    /// `Context::<Unix>::with_platform(search_path)`.
    pub fn with_platform(search_path: SearchPath) -> Context<P> {
        Context {
            search_path,
            inventory: Lazy::new(),
            platform: PhantomData,
        }
    }

    /// Replaces the search path with the directories in `s`, separated by
    /// [`SEPARATOR`](crate::SEPARATOR). Empty segments are ignored.
    ///
    /// Discards the inventory, so that it is rebuilt on next use.
    pub fn configure(&mut self, s: &str) {
        self.set_search_path(SearchPath::parse(s));
    }

    /// Replaces the search path.
    ///
    /// Discards the inventory, so that it is rebuilt on next use.
    pub fn set_search_path(&mut self, search_path: SearchPath) {
        debug!(search_path = %search_path, "configured search path");
        self.search_path = search_path;
        self.inventory.take();
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// Opens `<base><suffix>` from the first directory of the search path
    /// that has it. Later directories are not consulted once a file has
    /// been opened.
    ///
    /// # Errors
    ///
    /// Returns [`OpenError::NotFound`] if no directory yields a readable
    /// file, including when the search path is empty.
    pub fn open(&self, base: &str, suffix: &str) -> OpenResult<FileHandle> {
        let file_name = format!("{base}{suffix}");
        let mut last_error = None;

        for dir in &self.search_path {
            let path = dir.join(&file_name);
            match P::open(&path) {
                Ok(file) => {
                    debug!(path = %path.display(), "found table file");
                    return Ok(FileHandle::new(file, path));
                }
                Err(error) => {
                    trace!(path = %path.display(), %error, "candidate not opened");
                    last_error = Some(error);
                }
            }
        }

        Err(OpenError::NotFound {
            file_name,
            searched: self.search_path.len(),
            last_error,
        })
    }

    /// Tests if `<base><suffix>` exists in any directory of the search
    /// path, without opening it.
    ///
    /// Only checks for a regular file. A file that exists but cannot be
    /// read is reported here, while [`Context::open()`] skips it.
    pub fn exists(&self, base: &str, suffix: &str) -> bool {
        let file_name = format!("{base}{suffix}");
        self.search_path
            .iter()
            .any(|dir| dir.join(&file_name).is_file())
    }

    /// Maps an open file. The handle can be closed afterwards.
    ///
    /// # Errors
    ///
    /// See [`Mapping::map()`].
    pub fn map(&self, handle: &FileHandle) -> MapResult<Mapping<P>> {
        Mapping::map(handle)
    }

    /// Releases a mapping. Does nothing for `None`.
    pub fn unmap(&self, mapping: Option<Mapping<P>>) {
        if let Some(mapping) = mapping {
            mapping.unmap();
        }
    }

    /// Opens and maps the table `<base><suffix>` and checks its magic
    /// header. The file handle is closed before returning.
    ///
    /// # Errors
    ///
    /// See [`TableError`].
    pub fn open_table(&self, base: &str, kind: TableKind) -> TableResult<TableFile<P>> {
        let handle = self.open(base, kind.suffix())?;
        let mapping = self.map(&handle)?;
        let path: PathBuf = handle.path().to_owned();
        handle.close();

        if let Err(error) = kind.check_magic(&mapping) {
            mapping.unmap();
            return Err(TableError::Magic { path, error });
        }

        Ok(TableFile::new(kind, path, mapping))
    }

    /// The tables available in the search path. Built on first use by
    /// listing each directory. Concurrent first calls build it only once.
    pub fn inventory(&self) -> &Inventory {
        self.inventory
            .get_or_init(|| Inventory::scan(&self.search_path))
    }

    /// Tests if the inventory has been built since the last
    /// reconfiguration.
    pub fn is_initialized(&self) -> bool {
        self.inventory.is_initialized()
    }
}

impl<P: Platform> fmt::Debug for Context<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("search_path", &self.search_path)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
