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
    fs::{File, OpenOptions},
    io,
    os::windows::fs::OpenOptionsExt as _,
    path::Path,
};

use memmap2::{Mmap, MmapOptions};

use crate::sys::Platform;

const FILE_SHARE_READ: u32 = 0x0000_0001;
const FILE_FLAG_RANDOM_ACCESS: u32 = 0x1000_0000;

/// `CreateFileMapping` and `MapViewOfFile`, via `memmap2`.
#[derive(Debug)]
pub struct Windows;

impl Platform for Windows {
    const SEPARATOR: char = ';';

    type Region = Mmap;

    fn open(path: &Path) -> io::Result<File> {
        // Random access disables prefetching, which does not help probes.
        OpenOptions::new()
            .read(true)
            .share_mode(FILE_SHARE_READ)
            .custom_flags(FILE_FLAG_RANDOM_ACCESS)
            .open(path)
    }

    fn map(file: &File, len: usize) -> io::Result<Mmap> {
        debug_assert!(len > 0);
        // SAFETY: Table files are not modified while mapped.
        unsafe { MmapOptions::new().len(len).map(file) }
    }

    fn bytes(region: &Mmap) -> &[u8] {
        region
    }

    /// Always succeeds. `memmap2` ignores the result of `UnmapViewOfFile`,
    /// so failures are not observable here.
    fn unmap(region: Mmap) -> io::Result<()> {
        // The file mapping object was already closed by memmap2, so only the
        // view remains.
        drop(region);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn test_map_unmap() {
        let mut tmp = tempfile::NamedTempFile::new().expect("temp file");
        tmp.write_all(b"\xd7\x66\x0c\xa5 rest").expect("write");
        // Close the writable handle, which would conflict with the share mode.
        let path = tmp.into_temp_path();

        let file = Windows::open(&path).expect("open");
        let region = Windows::map(&file, 9).expect("map");
        drop(file);

        assert_eq!(Windows::bytes(&region), b"\xd7\x66\x0c\xa5 rest");
        assert!(Windows::unmap(region).is_ok());
    }
}
