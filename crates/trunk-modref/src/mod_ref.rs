//! Access kinds: whether an access may reference and/or modify memory.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use std::str::FromStr;

use crate::ParseError;

/// Whether a memory access may reference (read) and/or modify (write) memory.
///
/// The four values form a lattice ordered by inclusion, with
/// [`NO_MOD_REF`](Self::NO_MOD_REF) at the bottom and
/// [`MOD_REF`](Self::MOD_REF) at the top. Union is `|`, intersection is `&`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModRefInfo(u8);

impl ModRefInfo {
    /// The access neither references nor modifies memory.
    pub const NO_MOD_REF: Self = Self(0);
    /// The access may reference memory.
    pub const REF: Self = Self(1);
    /// The access may modify memory.
    pub const MOD: Self = Self(2);
    /// The access may both reference and modify memory.
    pub const MOD_REF: Self = Self(Self::REF.0 | Self::MOD.0);

    /// Number of bits needed to store any access kind.
    pub const BITS: u32 = 2;

    /// All access kinds, bottom first.
    pub const ALL: [Self; 4] = [Self::NO_MOD_REF, Self::REF, Self::MOD, Self::MOD_REF];

    /// Build from raw bits. Anything above the low two bits is dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MOD_REF.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_no_mod_ref(self) -> bool {
        self.0 == Self::NO_MOD_REF.0
    }

    pub const fn is_mod_or_ref_set(self) -> bool {
        self.0 != Self::NO_MOD_REF.0
    }

    pub const fn is_mod_and_ref_set(self) -> bool {
        self.0 == Self::MOD_REF.0
    }

    pub const fn is_mod_set(self) -> bool {
        self.0 & Self::MOD.0 != 0
    }

    pub const fn is_ref_set(self) -> bool {
        self.0 & Self::REF.0 != 0
    }

    fn name(self) -> &'static str {
        match self.0 {
            0 => "NoModRef",
            1 => "Ref",
            2 => "Mod",
            _ => "ModRef",
        }
    }
}

impl BitOr for ModRefInfo {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModRefInfo {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModRefInfo {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for ModRefInfo {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for ModRefInfo {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.0)
    }
}

impl fmt::Debug for ModRefInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ModRefInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModRefInfo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mr| mr.name() == s)
            .ok_or_else(|| ParseError::access_kind(s))
    }
}
