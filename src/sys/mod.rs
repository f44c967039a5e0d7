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

//! Operating system specific file access.

use std::{fmt, fs::File, io, path::Path};

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use self::unix::Unix;
#[cfg(windows)]
pub use self::windows::Windows;

/// The platform this crate was built for.
#[cfg(unix)]
pub type Native = Unix;
/// The platform this crate was built for.
#[cfg(windows)]
pub type Native = Windows;

/// The operations this crate needs from the operating system.
///
/// Exactly one implementation is compiled in, see [`Native`]. Mutual
/// exclusion is provided by [`Lock`](crate::Lock) on every platform.
pub trait Platform: fmt::Debug + Send + Sync + 'static {
    /// Separates directories in a search path string.
    const SEPARATOR: char;

    /// A read-only view of a file in memory.
    type Region: fmt::Debug + Send + Sync;

    /// Opens a file read-only, hinting that it will be read at random
    /// offsets.
    ///
    /// # Errors
    ///
    /// See [`std::fs::File::open()`].
    fn open(path: &Path) -> io::Result<File>;

    /// Maps the first `len` bytes of `file`. `len` is never zero.
    ///
    /// The region stays valid after `file` is closed.
    ///
    /// # Errors
    ///
    /// Errors if the operating system refuses the mapping.
    fn map(file: &File, len: usize) -> io::Result<Self::Region>;

    /// The mapped bytes.
    fn bytes(region: &Self::Region) -> &[u8];

    /// Releases a region.
    ///
    /// # Errors
    ///
    /// Errors if the operating system reports a failure. The region is
    /// gone either way. On Windows failures cannot be observed and this
    /// always succeeds.
    fn unmap(region: Self::Region) -> io::Result<()>;
}
