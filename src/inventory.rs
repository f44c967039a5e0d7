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
    fs, io,
    path::{Path, PathBuf},
};

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::{
    paths::SearchPath,
    types::{TableKind, MAX_PIECES},
};

bitflags! {
    /// Set of table kinds.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    pub struct Kinds: u8 {
        const WDL = 1;
        const DTM = 2;
        const DTZ = 4;
    }
}

impl From<TableKind> for Kinds {
    fn from(kind: TableKind) -> Kinds {
        match kind {
            TableKind::Wdl => Kinds::WDL,
            TableKind::Dtm => Kinds::DTM,
            TableKind::Dtz => Kinds::DTZ,
        }
    }
}

/// Files available for one material configuration, like `KQvK`.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Entry {
    paths: [Option<PathBuf>; 3],
}

impl Entry {
    pub fn kinds(&self) -> Kinds {
        TableKind::ALL
            .into_iter()
            .filter(|kind| self.paths[kind.index()].is_some())
            .fold(Kinds::empty(), |acc, kind| acc | Kinds::from(kind))
    }

    pub fn path(&self, kind: TableKind) -> Option<&Path> {
        self.paths[kind.index()].as_deref()
    }
}

/// Table files found in a search path.
///
/// If the same file name appears in multiple directories, the one from the
/// earliest directory is recorded, matching the lookup order of
/// [`Context::open()`](crate::Context::open).
#[derive(Debug, Default)]
pub struct Inventory {
    tables: FxHashMap<String, Entry>,
    largest: usize,
}

impl Inventory {
    /// Lists every directory of the search path. Directories that cannot be
    /// read are skipped.
    pub fn scan(search_path: &SearchPath) -> Inventory {
        let mut inventory = Inventory::default();
        for dir in search_path {
            if let Err(error) = inventory.add_directory(dir) {
                warn!(dir = %dir.display(), %error, "skipping unreadable directory");
            }
        }
        debug!(
            tables = inventory.tables.len(),
            largest = inventory.largest,
            "scanned search path"
        );
        inventory
    }

    /// Records all table files in a directory that are not already known.
    ///
    /// Tables are selected by filename, e.g. `KQvKP.rtbz`. The files are not
    /// opened.
    ///
    /// # Errors
    ///
    /// Returns an error result when:
    ///
    /// * The `path` does not exist.
    /// * `path` is not a directory.
    /// * The process lacks permissions to list the directory.
    pub fn add_directory<P: AsRef<Path>>(&mut self, path: P) -> io::Result<()> {
        for entry in fs::read_dir(path)? {
            let path = entry?.path();

            if path.is_dir() {
                continue;
            }

            let (Some(stem), Some(ext)) = (
                path.file_stem().and_then(|s| s.to_str()),
                path.extension().and_then(|s| s.to_str()),
            ) else {
                continue;
            };

            let Some(kind) = TableKind::from_extension(ext) else {
                continue;
            };

            let Some(pieces) = piece_count(stem) else {
                continue;
            };

            let slot = &mut self.tables.entry(stem.to_owned()).or_default().paths[kind.index()];
            if slot.is_none() {
                *slot = Some(path.clone());
                self.largest = self.largest.max(pieces);
            }
        }

        Ok(())
    }

    pub fn get(&self, stem: &str) -> Option<&Entry> {
        self.tables.get(stem)
    }

    pub fn contains(&self, stem: &str, kind: TableKind) -> bool {
        self.path(stem, kind).is_some()
    }

    pub fn path(&self, stem: &str, kind: TableKind) -> Option<&Path> {
        self.get(stem)?.path(kind)
    }

    /// Most pieces in any table found, or 0.
    pub fn largest(&self) -> usize {
        self.largest
    }

    /// Number of distinct material configurations.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.tables.iter().map(|(stem, entry)| (stem.as_str(), entry))
    }
}

/// Number of pieces in a name like `KRPvKR`, or `None` if it does not name
/// a table.
fn piece_count(stem: &str) -> Option<usize> {
    fn side(s: &str) -> Option<usize> {
        let rest = s.strip_prefix('K')?;
        if rest.bytes().all(|c| b"QRBNP".contains(&c)) {
            Some(s.len())
        } else {
            None
        }
    }

    let (white, black) = stem.split_once('v')?;
    let count = side(white)? + side(black)?;
    (count <= MAX_PIECES).then_some(count)
}
