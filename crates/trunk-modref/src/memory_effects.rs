//! Packed per-location memory effects.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::{IrMemLocation, MemLocation, ModRefInfo};

/// How an operation may access each category of memory.
///
/// One [`ModRefInfo`] is stored per location of `L`, two bits each, packed
/// into a `u32` by location ordinal. The value is immutable: every operation
/// returns a new instance.
#[derive(salsa::Update)]
pub struct MemoryEffectsBase<L> {
    data: u32,
    _location: PhantomData<fn() -> L>,
}

/// Summary of how a function affects memory in the program.
///
/// Loads from constant globals are not memory accesses for this interface,
/// and a function may freely modify stack space local to its invocation
/// without reporting it.
pub type MemoryEffects = MemoryEffectsBase<IrMemLocation>;

impl<L: MemLocation> MemoryEffectsBase<L> {
    const BITS_PER_LOC: u32 = ModRefInfo::BITS;
    const LOC_MASK: u32 = (1 << Self::BITS_PER_LOC) - 1;
    const FITS: () = assert!(
        L::ALL.len() as u32 * ModRefInfo::BITS <= u32::BITS,
        "memory location set does not fit in a u32"
    );

    const fn from_data(data: u32) -> Self {
        Self {
            data,
            _location: PhantomData,
        }
    }

    fn location_pos(loc: L) -> u32 {
        let () = Self::FITS;
        debug_assert!(
            (loc.index() as usize) < L::ALL.len(),
            "location {loc:?} has ordinal {} outside its set",
            loc.index()
        );
        loc.index() * Self::BITS_PER_LOC
    }

    /// Mask covering the fields of every location in `L`.
    fn used_bits() -> u32 {
        let width = L::ALL.len() as u32 * Self::BITS_PER_LOC;
        1u32.checked_shl(width).map_or(u32::MAX, |bit| bit - 1)
    }

    fn set_mod_ref(&mut self, loc: L, mr: ModRefInfo) {
        let pos = Self::location_pos(loc);
        self.data &= !(Self::LOC_MASK << pos);
        self.data |= u32::from(mr.bits()) << pos;
    }

    /// Iterate over every supported location.
    pub fn locations() -> impl Iterator<Item = L> {
        L::locations()
    }

    /// Effects that access only `loc`, with the given kind.
    pub fn new(loc: L, mr: ModRefInfo) -> Self {
        let mut me = Self::from_data(0);
        me.set_mod_ref(loc, mr);
        me
    }

    /// Effects that access every location with the given kind.
    pub fn with_all(mr: ModRefInfo) -> Self {
        let mut me = Self::from_data(0);
        for loc in L::locations() {
            me.set_mod_ref(loc, mr);
        }
        me
    }

    /// May read and write any memory.
    pub fn unknown() -> Self {
        Self::with_all(ModRefInfo::MOD_REF)
    }

    /// Does not read or write any memory.
    pub fn none() -> Self {
        Self::with_all(ModRefInfo::NO_MOD_REF)
    }

    /// May read any memory.
    pub fn read_only() -> Self {
        Self::with_all(ModRefInfo::REF)
    }

    /// May write any memory.
    pub fn write_only() -> Self {
        Self::with_all(ModRefInfo::MOD)
    }

    /// Decode a value produced by [`to_int_value`](Self::to_int_value).
    ///
    /// No validation is performed. Bits beyond the last location's field are
    /// kept as they are.
    pub fn from_int_value(data: u32) -> Self {
        let stray = data & !Self::used_bits();
        if stray != 0 {
            trace!(data, stray, "memory effects carry bits beyond the last location");
        }
        Self::from_data(data)
    }

    /// Encoded form stored in the memory attribute.
    pub const fn to_int_value(self) -> u32 {
        self.data
    }

    pub fn get_mod_ref(self, loc: L) -> ModRefInfo {
        ModRefInfo::from_bits(((self.data >> Self::location_pos(loc)) & Self::LOC_MASK) as u8)
    }

    /// Union of the access kinds of every location.
    pub fn mod_ref(self) -> ModRefInfo {
        L::locations().fold(ModRefInfo::NO_MOD_REF, |mr, loc| {
            mr | self.get_mod_ref(loc)
        })
    }

    /// Copy of `self` with the field for `loc` replaced by `mr`.
    pub fn with_mod_ref(self, loc: L, mr: ModRefInfo) -> Self {
        let mut me = self;
        me.set_mod_ref(loc, mr);
        me
    }

    /// Copy of `self` that no longer accesses `loc`.
    pub fn without_loc(self, loc: L) -> Self {
        self.with_mod_ref(loc, ModRefInfo::NO_MOD_REF)
    }

    pub fn does_not_access_memory(self) -> bool {
        self.data == 0
    }

    /// Whether this at most reads memory.
    pub fn only_reads_memory(self) -> bool {
        !self.mod_ref().is_mod_set()
    }

    /// Whether this at most writes memory.
    pub fn only_writes_memory(self) -> bool {
        !self.mod_ref().is_ref_set()
    }
}

impl MemoryEffects {
    /// May only access memory reachable through pointer arguments.
    pub fn arg_mem_only(mr: ModRefInfo) -> Self {
        Self::new(IrMemLocation::ArgMem, mr)
    }

    /// May only access memory that is inaccessible from the IR.
    pub fn inaccessible_mem_only(mr: ModRefInfo) -> Self {
        Self::new(IrMemLocation::InaccessibleMem, mr)
    }

    /// May only access `errno`.
    pub fn errno_mem_only(mr: ModRefInfo) -> Self {
        Self::new(IrMemLocation::ErrnoMem, mr)
    }

    /// May only access other memory.
    pub fn other_mem_only(mr: ModRefInfo) -> Self {
        Self::new(IrMemLocation::Other, mr)
    }

    /// May only access inaccessible or argument memory, both with `mr`.
    pub fn inaccessible_or_arg_mem_only(mr: ModRefInfo) -> Self {
        let mut me = Self::none();
        me.set_mod_ref(IrMemLocation::ArgMem, mr);
        me.set_mod_ref(IrMemLocation::InaccessibleMem, mr);
        me
    }

    /// May only access argument memory (with `arg_mr`) or `errno` (with
    /// `errno_mr`).
    pub fn argument_or_errno_mem_only(arg_mr: ModRefInfo, errno_mr: ModRefInfo) -> Self {
        let mut me = Self::none();
        me.set_mod_ref(IrMemLocation::ArgMem, arg_mr);
        me.set_mod_ref(IrMemLocation::ErrnoMem, errno_mr);
        me
    }

    pub fn only_accesses_arg_pointees(self) -> bool {
        self.without_loc(IrMemLocation::ArgMem)
            .does_not_access_memory()
    }

    pub fn does_access_arg_pointees(self) -> bool {
        self.get_mod_ref(IrMemLocation::ArgMem).is_mod_or_ref_set()
    }

    pub fn only_accesses_inaccessible_mem(self) -> bool {
        self.without_loc(IrMemLocation::InaccessibleMem)
            .does_not_access_memory()
    }

    pub fn only_accesses_errno_mem(self) -> bool {
        self.without_loc(IrMemLocation::ErrnoMem)
            .does_not_access_memory()
    }

    pub fn only_accesses_inaccessible_or_arg_mem(self) -> bool {
        self.without_loc(IrMemLocation::InaccessibleMem)
            .without_loc(IrMemLocation::ArgMem)
            .does_not_access_memory()
    }
}

impl<L> Clone for MemoryEffectsBase<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for MemoryEffectsBase<L> {}

impl<L> PartialEq for MemoryEffectsBase<L> {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl<L> Eq for MemoryEffectsBase<L> {}

impl<L> std::hash::Hash for MemoryEffectsBase<L> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.data.hash(state);
    }
}

/// Intersection: keep only the accesses both sides allow, per location.
impl<L> BitAnd for MemoryEffectsBase<L> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self {
            data: self.data & rhs.data,
            _location: PhantomData,
        }
    }
}

impl<L> BitAndAssign for MemoryEffectsBase<L> {
    fn bitand_assign(&mut self, rhs: Self) {
        self.data &= rhs.data;
    }
}

/// Union: allow any access either side allows, per location.
impl<L> BitOr for MemoryEffectsBase<L> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            data: self.data | rhs.data,
            _location: PhantomData,
        }
    }
}

impl<L> BitOrAssign for MemoryEffectsBase<L> {
    fn bitor_assign(&mut self, rhs: Self) {
        self.data |= rhs.data;
    }
}

/// Removes, at each location, exactly the access bits set in `rhs`.
impl<L> Sub for MemoryEffectsBase<L> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            data: self.data & !rhs.data,
            _location: PhantomData,
        }
    }
}

impl<L> SubAssign for MemoryEffectsBase<L> {
    fn sub_assign(&mut self, rhs: Self) {
        self.data &= !rhs.data;
    }
}

impl<L: MemLocation> fmt::Debug for MemoryEffectsBase<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MemoryEffects");
        for loc in L::locations() {
            s.field(loc.name(), &self.get_mod_ref(loc));
        }
        s.finish()
    }
}

/// Renders each accessed location as `Loc: Kind`, or `none`.
impl<L: MemLocation> fmt::Display for MemoryEffectsBase<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for loc in L::locations() {
            let mr = self.get_mod_ref(loc);
            if mr.is_no_mod_ref() {
                continue;
            }
            write!(f, "{sep}{loc}: {mr}")?;
            sep = ", ";
        }
        if sep.is_empty() {
            f.write_str("none")?;
        }
        Ok(())
    }
}

impl<L: MemLocation> Serialize for MemoryEffectsBase<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.to_int_value())
    }
}

impl<'de, L: MemLocation> Deserialize<'de> for MemoryEffectsBase<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_int_value)
    }
}
