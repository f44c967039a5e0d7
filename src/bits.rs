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

//! Bit primitives used when decoding table indexes.
//!
//! The free functions [`popcount()`] and [`lsb()`] are resolved at build
//! time. [`BitOps`] picks an implementation once at runtime, preferring a
//! caller-supplied function, then hardware instructions, then compiler
//! builtins, and finally portable bit tricks.

use std::fmt;

use once_cell::sync::Lazy;

const M1: u64 = 0x5555_5555_5555_5555;
const M2: u64 = 0x3333_3333_3333_3333;
const M4: u64 = 0x0f0f_0f0f_0f0f_0f0f;
const H01: u64 = 0x0101_0101_0101_0101;

/// Counts set bits using halving sums. Correct on every target, and the
/// reference the other implementations are tested against.
pub const fn software_popcount(mut x: u64) -> u32 {
    x -= (x >> 1) & M1;
    x = (x & M2) + ((x >> 2) & M2);
    x = (x + (x >> 4)) & M4;
    (x.wrapping_mul(H01) >> 56) as u32
}

const MAGIC32: u32 = 0x0e89_b2be;

/// De Bruijn-style lookup for isolated 32-bit values.
#[rustfmt::skip]
const MAGIC_TABLE32: [u32; 32] = [
    31, 0,  9,  1, 10, 20, 13,  2,  7, 11, 21, 23, 17, 14,  3, 25,
    30, 8, 19, 12,  6, 22, 16, 24, 29, 18,  5, 15, 28,  4, 27, 26,
];

const fn lsb32(x: u32) -> u32 {
    let isolated = x & x.wrapping_neg();
    MAGIC_TABLE32[(isolated.wrapping_mul(MAGIC32) >> 27) as usize]
}

/// Index of the least significant set bit, using a multiply and table
/// lookup on each 32-bit half.
///
/// `x` must not be zero. The result for zero is unspecified.
pub const fn software_lsb(x: u64) -> u32 {
    debug_assert!(x != 0, "lsb of zero");
    let low = x as u32;
    if low != 0 {
        lsb32(low)
    } else {
        lsb32((x >> 32) as u32) + 32
    }
}

/// Number of set bits in `x`.
#[inline]
pub fn popcount(x: u64) -> u32 {
    if cfg!(feature = "software-bitops") {
        software_popcount(x)
    } else {
        x.count_ones()
    }
}

/// Index of the least significant set bit in `x`.
///
/// # Panics
///
/// Panics in debug builds if `x` is zero. Callers must never pass zero. In
/// release builds the result is unspecified.
#[inline]
pub fn lsb(x: u64) -> u32 {
    debug_assert!(x != 0, "lsb of zero");
    if cfg!(feature = "software-bitops") {
        software_lsb(x)
    } else {
        x.trailing_zeros()
    }
}

/// Clears the least significant set bit.
#[inline]
pub const fn poplsb(x: u64) -> u64 {
    x & x.wrapping_sub(1)
}

/// Iterator over the indexes of set bits, from least to most significant.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Bits(pub u64);

impl Iterator for Bits {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            let index = lsb(self.0);
            self.0 = poplsb(self.0);
            Some(index)
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = popcount(self.0) as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bits {}

impl std::iter::FusedIterator for Bits {}

/// Which tier of the cascade a [`BitOps`] uses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Strategy {
    /// Functions supplied by the caller.
    Custom,
    /// Dedicated instructions, detected on the running CPU.
    Hardware,
    /// Compiler builtins.
    Builtin,
    /// Portable bit tricks.
    Software,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Custom => "custom",
            Strategy::Hardware => "hardware",
            Strategy::Builtin => "builtin",
            Strategy::Software => "software",
        })
    }
}

/// A popcount and lsb implementation, selected once.
#[derive(Copy, Clone)]
pub struct BitOps {
    strategy: Strategy,
    popcount: fn(u64) -> u32,
    lsb: fn(u64) -> u32,
}

impl fmt::Debug for BitOps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitOps")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

static NATIVE: Lazy<BitOps> = Lazy::new(BitOps::detect);

impl BitOps {
    /// Uses caller-supplied implementations. `lsb` will never be called
    /// with zero.
    pub fn custom(popcount: fn(u64) -> u32, lsb: fn(u64) -> u32) -> BitOps {
        BitOps {
            strategy: Strategy::Custom,
            popcount,
            lsb,
        }
    }

    /// Runs the cascade: hardware if the CPU supports it, otherwise
    /// builtins. The `software-bitops` feature forces the software tier.
    pub fn detect() -> BitOps {
        if cfg!(feature = "software-bitops") {
            return BitOps::software();
        }
        BitOps::hardware().unwrap_or_else(BitOps::builtin)
    }

    /// The detected implementation, shared for the lifetime of the process.
    pub fn native() -> &'static BitOps {
        &NATIVE
    }

    /// Dedicated `popcnt` and `tzcnt` instructions, if the running CPU has
    /// them.
    pub fn hardware() -> Option<BitOps> {
        #[cfg(target_arch = "x86_64")]
        if std::is_x86_feature_detected!("popcnt") && std::is_x86_feature_detected!("bmi1") {
            return Some(BitOps {
                strategy: Strategy::Hardware,
                popcount: x86::popcount,
                lsb: x86::lsb,
            });
        }
        None
    }

    /// `u64::count_ones()` and `u64::trailing_zeros()`.
    pub fn builtin() -> BitOps {
        BitOps {
            strategy: Strategy::Builtin,
            popcount: u64::count_ones,
            lsb: u64::trailing_zeros,
        }
    }

    /// Portable fallbacks.
    pub const fn software() -> BitOps {
        BitOps {
            strategy: Strategy::Software,
            popcount: software_popcount,
            lsb: software_lsb,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Number of set bits in `x`.
    #[inline]
    pub fn popcount(&self, x: u64) -> u32 {
        (self.popcount)(x)
    }

    /// Index of the least significant set bit in `x`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `x` is zero.
    #[inline]
    pub fn lsb(&self, x: u64) -> u32 {
        debug_assert!(x != 0, "lsb of zero");
        (self.lsb)(x)
    }
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use std::arch::x86_64::{_popcnt64, _tzcnt_u64};

    #[target_feature(enable = "popcnt")]
    unsafe fn popcnt(x: u64) -> u32 {
        _popcnt64(x as i64) as u32
    }

    #[target_feature(enable = "bmi1")]
    unsafe fn tzcnt(x: u64) -> u32 {
        _tzcnt_u64(x) as u32
    }

    // Only handed out by BitOps::hardware() after the features were
    // detected at runtime.
    pub fn popcount(x: u64) -> u32 {
        // SAFETY: popcnt is available, see above.
        unsafe { popcnt(x) }
    }

    pub fn lsb(x: u64) -> u32 {
        // SAFETY: bmi1 is available, see above.
        unsafe { tzcnt(x) }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::{any, prop_assert_eq, proptest};

    use super::*;

    fn tiers() -> Vec<BitOps> {
        let mut tiers = vec![BitOps::software(), BitOps::builtin(), BitOps::detect()];
        tiers.extend(BitOps::hardware());
        tiers
    }

    #[test]
    fn test_popcount() {
        let alternating = 0xaaaa_aaaa_aaaa_aaaa;
        for ops in tiers() {
            assert_eq!(ops.popcount(0), 0);
            assert_eq!(ops.popcount(1), 1);
            assert_eq!(ops.popcount(!0), 64);
            assert_eq!(ops.popcount(alternating), 32);
            assert_eq!(ops.popcount(!alternating), 32);
            for i in 0..64 {
                assert_eq!(ops.popcount(1 << i), 1, "{} bit {}", ops.strategy(), i);
            }
        }
        assert_eq!(popcount(0x8000_0000_0000_0001), 2);
    }

    #[test]
    fn test_lsb() {
        for ops in tiers() {
            for i in 0..64 {
                assert_eq!(ops.lsb(1 << i), i, "{} bit {}", ops.strategy(), i);
                assert_eq!(ops.lsb(!0 << i), i);
            }
        }
        assert_eq!(lsb(0x10), 4);
        assert_eq!(software_lsb(0x8000_0000_0000_0000), 63);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "lsb of zero")]
    fn test_lsb_of_zero() {
        lsb(0);
    }

    #[test]
    fn test_custom() {
        fn nine(_: u64) -> u32 {
            9
        }
        let ops = BitOps::custom(nine, nine);
        assert_eq!(ops.strategy(), Strategy::Custom);
        assert_eq!(ops.popcount(0), 9);
        assert_eq!(ops.lsb(1), 9);
    }

    #[test]
    fn test_native_is_stable() {
        assert_eq!(BitOps::native().strategy(), BitOps::detect().strategy());
        if cfg!(feature = "software-bitops") {
            assert_eq!(BitOps::native().strategy(), Strategy::Software);
        }
    }

    #[test]
    fn test_bits() {
        assert_eq!(Bits(0).next(), None);
        assert_eq!(Bits(0b1010_0001).collect::<Vec<_>>(), [0, 5, 7]);
        assert_eq!(Bits(!0).len(), 64);
        assert_eq!(poplsb(0b1100), 0b1000);
        assert_eq!(poplsb(0), 0);
    }

    proptest! {
        #[test]
        fn popcount_agrees(x in any::<u64>()) {
            let expected = software_popcount(x);
            prop_assert_eq!(popcount(x), expected);
            for ops in tiers() {
                prop_assert_eq!(ops.popcount(x), expected);
            }
        }

        #[test]
        fn lsb_agrees(x in 1..=u64::MAX) {
            let expected = software_lsb(x);
            let bit = 1u64 << expected;
            prop_assert_eq!(x & bit, bit);
            prop_assert_eq!(x & (bit - 1), 0);
            prop_assert_eq!(lsb(x), expected);
            for ops in tiers() {
                prop_assert_eq!(ops.lsb(x), expected);
            }
        }

        #[test]
        fn bits_visit_each_set_bit(x in any::<u64>()) {
            let rebuilt = Bits(x).fold(0u64, |acc, i| acc | 1u64 << i);
            prop_assert_eq!(rebuilt, x);
        }
    }
}
