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

//! Find, open and memory map Syzygy tablebase files, and the bit
//! primitives needed to decode them.
//!
//! This crate does not interpret tables. It provides the byte buffers a
//! decoder works on.
//!
//! # Example
//!
//! ```no_run
//! use syzygy_platform::{Context, TableKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut ctx = Context::new();
//! ctx.configure("tables/wdl:tables/dtz");
//!
//! let table = ctx.open_table("KQvK", TableKind::Wdl)?;
//! println!("{} is {} bytes", table.path().display(), table.bytes().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Threads
//!
//! [`Context`] is `Send` and `Sync`. Configure it before sharing it:
//! changing the search path requires exclusive access. Mapped tables are
//! read-only and can be read from any number of threads without locking.
//!
//! # Logging
//!
//! Diagnostics are emitted with [`tracing`]. Failures that are not returned
//! to the caller, like failing to unmap a file, are logged at `warn` level.
//!
//! # Cargo features
//!
//! * `software-bitops`: Use portable bit tricks instead of hardware
//!   instructions or compiler builtins.

#![doc(html_root_url = "https://docs.rs/syzygy-platform/0.1.0")]
#![warn(missing_debug_implementations)]
#![cfg_attr(docs_rs, feature(doc_auto_cfg))]

pub mod bits;
mod context;
pub mod endian;
mod errors;
mod inventory;
mod lazy;
mod lock;
mod mapping;
mod paths;
pub mod sys;
mod types;

pub use crate::{
    bits::{lsb, popcount, poplsb, BitOps, Strategy},
    context::Context,
    errors::{MagicError, MapError, MapResult, OpenError, OpenResult, TableError, TableResult},
    inventory::{Entry, Inventory, Kinds},
    lazy::Lazy,
    lock::{Lock, LockGuard},
    mapping::{FileHandle, Mapping, TableFile},
    paths::{SearchPath, ENV_VAR, SEPARATOR},
    sys::{Native, Platform},
    types::{TableKind, MAX_PIECES},
};
