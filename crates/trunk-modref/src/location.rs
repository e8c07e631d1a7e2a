//! Memory location categories.
//!
//! A location set is a small enumeration whose members have contiguous,
//! zero-based ordinals. [`MemoryEffectsBase`](crate::MemoryEffectsBase) is
//! generic over any such set; [`IrMemLocation`] is the one the IR uses.

use std::fmt;
use std::hash::Hash;

/// A closed, ordered set of memory location categories.
///
/// `ALL` must list every member exactly once in ascending ordinal order, and
/// `index()` must return the member's position in `ALL`. Use
/// [`define_mem_locations!`](crate::define_mem_locations) rather than
/// implementing this by hand; it upholds both rules by construction.
pub trait MemLocation: Copy + Eq + Hash + fmt::Debug + fmt::Display + 'static {
    /// Every location, ascending by ordinal.
    const ALL: &'static [Self];

    /// The location with ordinal zero.
    const FIRST: Self = Self::ALL[0];

    /// The location with the highest ordinal.
    const LAST: Self = Self::ALL[Self::ALL.len() - 1];

    /// Zero-based ordinal of this location.
    fn index(self) -> u32;

    /// Name used in diagnostics.
    fn name(self) -> &'static str;

    fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Iterate over every location from `FIRST` to `LAST`.
    fn locations() -> impl Iterator<Item = Self> {
        Self::ALL.iter().copied()
    }
}

/// Declare a location enumeration and implement [`MemLocation`] for it.
///
/// Variants get ordinals in declaration order starting from zero. The macro
/// also implements `Display` and `FromStr` using the variant names.
///
/// ```
/// trunk_modref::define_mem_locations! {
///     pub enum GpuMemLocation {
///         Global,
///         Shared,
///     }
/// }
///
/// use trunk_modref::MemLocation;
/// assert_eq!(GpuMemLocation::LAST, GpuMemLocation::Shared);
/// assert_eq!("Global".parse::<GpuMemLocation>(), Ok(GpuMemLocation::Global));
/// ```
#[macro_export]
macro_rules! define_mem_locations {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant,
            )+
        }

        impl $crate::MemLocation for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> u32 {
                self as u32
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::MemLocation::name(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::ParseError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                <Self as $crate::MemLocation>::ALL
                    .iter()
                    .copied()
                    .find(|loc| $crate::MemLocation::name(*loc) == s)
                    .ok_or_else(|| $crate::ParseError::UnknownLocation {
                        name: s.to_owned(),
                    })
            }
        }
    };
}

define_mem_locations! {
    /// The locations at which a function might access memory.
    pub enum IrMemLocation {
        /// Memory reachable through pointer arguments.
        ArgMem,
        /// Memory that is not accessible from the IR at all.
        InaccessibleMem,
        /// The `errno` variable.
        ErrnoMem,
        /// Any other memory.
        Other,
    }
}
