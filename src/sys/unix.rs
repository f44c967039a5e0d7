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
    fs::File,
    io,
    os::unix::io::AsRawFd as _,
    path::Path,
    ptr::{self, NonNull},
    slice,
};

use tracing::warn;

use crate::sys::Platform;

/// POSIX `mmap(2)` with random access advice.
#[derive(Debug)]
pub struct Unix;

/// A `PROT_READ`, `MAP_SHARED` mapping.
#[derive(Debug)]
pub struct Region {
    ptr: NonNull<libc::c_void>,
    len: usize,
}

// SAFETY: The region is mapped read-only and never written through.
unsafe impl Send for Region {}
unsafe impl Sync for Region {}

impl Platform for Unix {
    const SEPARATOR: char = ':';

    type Region = Region;

    fn open(path: &Path) -> io::Result<File> {
        let file = File::open(path)?;

        // Probes touch scattered blocks, so readahead only wastes page cache.
        #[cfg(target_os = "linux")]
        {
            let errno = unsafe {
                libc::posix_fadvise(file.as_raw_fd(), 0, 0, libc::POSIX_FADV_RANDOM)
            };
            if errno != 0 {
                warn!(
                    path = %path.display(),
                    error = %io::Error::from_raw_os_error(errno),
                    "posix_fadvise failed"
                );
            }
        }

        Ok(file)
    }

    fn map(file: &File, len: usize) -> io::Result<Region> {
        debug_assert!(len > 0);

        // SAFETY: Fresh mapping chosen by the kernel, aliasing nothing.
        let ptr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(io::Error::last_os_error());
        }
        let ptr = NonNull::new(ptr)
            .ok_or_else(|| io::Error::other("mmap returned null"))?;

        // SAFETY: Advice on a mapping we own.
        if unsafe { libc::madvise(ptr.as_ptr(), len, libc::MADV_RANDOM) } != 0 {
            warn!(error = %io::Error::last_os_error(), "madvise failed");
        }

        Ok(Region { ptr, len })
    }

    fn bytes(region: &Region) -> &[u8] {
        // SAFETY: `len` readable bytes stay mapped until the region is
        // consumed by `unmap`.
        unsafe { slice::from_raw_parts(region.ptr.as_ptr().cast::<u8>(), region.len) }
    }

    fn unmap(region: Region) -> io::Result<()> {
        // SAFETY: Consumes the region, so no slices into it remain.
        if unsafe { libc::munmap(region.ptr.as_ptr(), region.len) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
