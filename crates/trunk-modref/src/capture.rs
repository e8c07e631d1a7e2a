//! Pointer capture components and the two-path capture descriptor.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::ParseError;

/// Components of a pointer that may be captured.
///
/// Two independent sub-lattices share the four bits: the address
/// (`NONE` < `ADDRESS_IS_NULL` < `ADDRESS`) and the provenance
/// (`NONE` < `READ_PROVENANCE` < `PROVENANCE`). The stronger member of each
/// includes the bit of the weaker one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, salsa::Update)]
pub struct CaptureComponents(u8);

impl CaptureComponents {
    pub const NONE: Self = Self(0);
    /// Only whether the pointer is null may be observed.
    pub const ADDRESS_IS_NULL: Self = Self(1 << 0);
    /// The full address may be observed.
    pub const ADDRESS: Self = Self((1 << 1) | Self::ADDRESS_IS_NULL.0);
    /// The pointer may be used to read, but not write, the memory it points to.
    pub const READ_PROVENANCE: Self = Self(1 << 2);
    /// The pointer may be used to access the memory it points to.
    pub const PROVENANCE: Self = Self((1 << 3) | Self::READ_PROVENANCE.0);
    pub const ALL: Self = Self(Self::ADDRESS.0 | Self::PROVENANCE.0);

    /// Number of bits needed to store any set of components.
    pub const BITS: u32 = 4;

    /// Build from raw bits. Anything above the low four bits is dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn captures_nothing(self) -> bool {
        self.0 == Self::NONE.0
    }

    pub const fn captures_anything(self) -> bool {
        self.0 != Self::NONE.0
    }

    /// The null-ness of the pointer may escape, but not its actual value.
    pub const fn captures_address_is_null_only(self) -> bool {
        self.0 & Self::ADDRESS.0 == Self::ADDRESS_IS_NULL.0
    }

    pub const fn captures_address(self) -> bool {
        self.0 & Self::ADDRESS.0 != Self::NONE.0
    }

    pub const fn captures_read_provenance_only(self) -> bool {
        self.0 & Self::PROVENANCE.0 == Self::READ_PROVENANCE.0
    }

    pub const fn captures_full_provenance(self) -> bool {
        self.0 & Self::PROVENANCE.0 == Self::PROVENANCE.0
    }

    pub const fn captures_any_provenance(self) -> bool {
        self.0 & Self::PROVENANCE.0 != Self::NONE.0
    }

    pub const fn captures_all(self) -> bool {
        self.0 == Self::ALL.0
    }
}

impl BitOr for CaptureComponents {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CaptureComponents {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CaptureComponents {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for CaptureComponents {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for CaptureComponents {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::from_bits(!self.0)
    }
}

impl fmt::Debug for CaptureComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CaptureComponents({self})")
    }
}

impl fmt::Display for CaptureComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.captures_nothing() {
            return f.write_str("none");
        }

        let mut names = Vec::with_capacity(2);
        if self.captures_address_is_null_only() {
            names.push("address_is_null");
        } else if self.captures_address() {
            names.push("address");
        }
        if self.captures_read_provenance_only() {
            names.push("read_provenance");
        } else if self.captures_any_provenance() {
            names.push("provenance");
        }
        f.write_str(&names.join(", "))
    }
}

impl FromStr for CaptureComponents {
    type Err = ParseError;

    /// Parse the rendered form, e.g. `none` or `address, read_provenance`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .try_fold(Self::NONE, |cc, name| {
                let component = match name {
                    "none" => Self::NONE,
                    "address_is_null" => Self::ADDRESS_IS_NULL,
                    "address" => Self::ADDRESS,
                    "read_provenance" => Self::READ_PROVENANCE,
                    "provenance" => Self::PROVENANCE,
                    _ => return Err(ParseError::capture_component(name)),
                };
                Ok(cc | component)
            })
    }
}

/// Which components of a pointer may be captured, and where.
///
/// Capture through the return value is tracked apart from capture through
/// any other path (stores, other calls, globals): a caller that gets the
/// pointer back can keep following it, so the two are not equally bad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, salsa::Update)]
pub struct CaptureInfo {
    other: CaptureComponents,
    ret: CaptureComponents,
}

impl CaptureInfo {
    pub const fn new(other: CaptureComponents, ret: CaptureComponents) -> Self {
        Self { other, ret }
    }

    /// Same components through the return value and every other path.
    pub const fn uniform(components: CaptureComponents) -> Self {
        Self::new(components, components)
    }

    /// Captures nothing.
    pub const fn none() -> Self {
        Self::uniform(CaptureComponents::NONE)
    }

    /// May capture everything through any path.
    pub const fn all() -> Self {
        Self::uniform(CaptureComponents::ALL)
    }

    /// May only capture `ret` components, and only through the return value.
    pub const fn ret_only(ret: CaptureComponents) -> Self {
        Self::new(CaptureComponents::NONE, ret)
    }

    /// Whether nothing escapes except through the return value.
    ///
    /// Also true when nothing is captured at all.
    pub const fn is_ret_only(self) -> bool {
        self.other.captures_nothing()
    }

    /// Components that may be captured by the return value.
    pub const fn ret_components(self) -> CaptureComponents {
        self.ret
    }

    /// Components that may be captured through paths other than the return
    /// value.
    pub const fn other_components(self) -> CaptureComponents {
        self.other
    }

    /// Components that may be captured through any path.
    pub const fn components(self) -> CaptureComponents {
        CaptureComponents(self.other.0 | self.ret.0)
    }

    /// Decode a value produced by [`to_int_value`](Self::to_int_value).
    ///
    /// Each path occupies a 4-bit field; bits above the low byte have no
    /// field and are dropped.
    pub fn from_int_value(data: u32) -> Self {
        if data >> (2 * CaptureComponents::BITS) != 0 {
            trace!(data, "capture info carries bits beyond the low byte");
        }
        Self::new(
            CaptureComponents::from_bits((data >> CaptureComponents::BITS) as u8),
            CaptureComponents::from_bits(data as u8),
        )
    }

    /// Encoded form stored in the captures attribute: the other-path
    /// components in bits 4..8, the return-path components in bits 0..4.
    pub const fn to_int_value(self) -> u32 {
        ((self.other.0 as u32) << CaptureComponents::BITS) | self.ret.0 as u32
    }
}

impl From<CaptureComponents> for CaptureInfo {
    fn from(components: CaptureComponents) -> Self {
        Self::uniform(components)
    }
}

impl From<CaptureInfo> for CaptureComponents {
    fn from(info: CaptureInfo) -> Self {
        info.components()
    }
}

/// Union, path by path.
impl BitOr for CaptureInfo {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::new(self.other | rhs.other, self.ret | rhs.ret)
    }
}

impl BitOrAssign for CaptureInfo {
    fn bitor_assign(&mut self, rhs: Self) {
        self.other |= rhs.other;
        self.ret |= rhs.ret;
    }
}

/// Intersection, path by path.
impl BitAnd for CaptureInfo {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::new(self.other & rhs.other, self.ret & rhs.ret)
    }
}

impl BitAndAssign for CaptureInfo {
    fn bitand_assign(&mut self, rhs: Self) {
        self.other &= rhs.other;
        self.ret &= rhs.ret;
    }
}

impl fmt::Display for CaptureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.other == self.ret {
            write!(f, "captures({})", self.other)
        } else if self.other.captures_nothing() {
            write!(f, "captures(ret: {})", self.ret)
        } else {
            write!(f, "captures({}, ret: {})", self.other, self.ret)
        }
    }
}

impl Serialize for CaptureInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.to_int_value())
    }
}

impl<'de> Deserialize<'de> for CaptureInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(Self::from_int_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const ADDRESS_LATTICE: [CaptureComponents; 3] = [
        CaptureComponents::NONE,
        CaptureComponents::ADDRESS_IS_NULL,
        CaptureComponents::ADDRESS,
    ];
    const PROVENANCE_LATTICE: [CaptureComponents; 3] = [
        CaptureComponents::NONE,
        CaptureComponents::READ_PROVENANCE,
        CaptureComponents::PROVENANCE,
    ];

    #[test]
    fn test_stronger_flags_imply_weaker() {
        assert!(CaptureComponents::ADDRESS.captures_address());
        assert!(!CaptureComponents::ADDRESS.captures_address_is_null_only());
        assert_eq!(
            CaptureComponents::ADDRESS & CaptureComponents::ADDRESS_IS_NULL,
            CaptureComponents::ADDRESS_IS_NULL
        );
        assert_eq!(
            CaptureComponents::PROVENANCE & CaptureComponents::READ_PROVENANCE,
            CaptureComponents::READ_PROVENANCE
        );
    }

    #[test]
    fn test_predicates_per_sub_lattice() {
        for addr in ADDRESS_LATTICE {
            for prov in PROVENANCE_LATTICE {
                let cc = addr | prov;
                assert_eq!(
                    cc.captures_nothing(),
                    addr == CaptureComponents::NONE && prov == CaptureComponents::NONE
                );
                assert_eq!(cc.captures_anything(), !cc.captures_nothing());
                assert_eq!(
                    cc.captures_address_is_null_only(),
                    addr == CaptureComponents::ADDRESS_IS_NULL
                );
                assert_eq!(cc.captures_address(), addr != CaptureComponents::NONE);
                assert_eq!(
                    cc.captures_read_provenance_only(),
                    prov == CaptureComponents::READ_PROVENANCE
                );
                assert_eq!(
                    cc.captures_full_provenance(),
                    prov == CaptureComponents::PROVENANCE
                );
                assert_eq!(cc.captures_any_provenance(), prov != CaptureComponents::NONE);
            }
        }
    }

    #[test]
    fn test_captures_all() {
        assert!(CaptureComponents::ALL.captures_all());
        assert!(!CaptureComponents::ADDRESS.captures_all());
        assert!(!(CaptureComponents::ADDRESS | CaptureComponents::READ_PROVENANCE).captures_all());
        assert!((CaptureComponents::ADDRESS | CaptureComponents::PROVENANCE).captures_all());
    }

    #[test]
    fn test_complement() {
        assert_eq!(!CaptureComponents::ADDRESS, CaptureComponents::PROVENANCE);
        assert_eq!(!CaptureComponents::NONE, CaptureComponents::ALL);
    }

    #[test]
    fn test_components_display_and_parse() {
        assert_snapshot!(CaptureComponents::NONE.to_string(), @"none");
        assert_snapshot!(CaptureComponents::ALL.to_string(), @"address, provenance");
        assert_snapshot!(
            (CaptureComponents::ADDRESS_IS_NULL | CaptureComponents::READ_PROVENANCE).to_string(),
            @"address_is_null, read_provenance"
        );

        for addr in ADDRESS_LATTICE {
            for prov in PROVENANCE_LATTICE {
                let cc = addr | prov;
                assert_eq!(cc.to_string().parse::<CaptureComponents>(), Ok(cc));
            }
        }
        assert_eq!(
            "address, everything".parse::<CaptureComponents>(),
            Err(ParseError::UnknownCaptureComponent {
                name: "everything".to_owned()
            })
        );
    }

    #[test]
    fn test_single_value_constructor() {
        for cc in [CaptureComponents::NONE, CaptureComponents::ADDRESS, CaptureComponents::ALL] {
            let info = CaptureInfo::from(cc);
            assert_eq!(info.other_components(), cc);
            assert_eq!(info.ret_components(), cc);
        }
    }

    #[test]
    fn test_ret_only() {
        for cc in [
            CaptureComponents::NONE,
            CaptureComponents::ADDRESS_IS_NULL,
            CaptureComponents::PROVENANCE,
            CaptureComponents::ALL,
        ] {
            let info = CaptureInfo::ret_only(cc);
            assert!(info.is_ret_only());
            assert_eq!(info.ret_components(), cc);
            assert_eq!(info.other_components(), CaptureComponents::NONE);
        }
        assert!(CaptureInfo::none().is_ret_only());
        assert!(!CaptureInfo::all().is_ret_only());
    }

    #[test]
    fn test_ret_only_union_with_none() {
        let info = CaptureInfo::ret_only(CaptureComponents::ADDRESS) | CaptureInfo::none();
        assert_eq!(info.other_components(), CaptureComponents::NONE);
        assert!(info.is_ret_only());
        assert_eq!(CaptureComponents::from(info), CaptureComponents::ADDRESS);
    }

    #[test]
    fn test_paths_combine_independently() {
        let a = CaptureInfo::new(CaptureComponents::ADDRESS, CaptureComponents::NONE);
        let b = CaptureInfo::new(CaptureComponents::NONE, CaptureComponents::PROVENANCE);

        let union = a | b;
        assert_eq!(union.other_components(), CaptureComponents::ADDRESS);
        assert_eq!(union.ret_components(), CaptureComponents::PROVENANCE);
        assert_eq!(union.components(), CaptureComponents::ALL);

        assert_eq!(a & b, CaptureInfo::none());

        let mut info = CaptureInfo::all();
        info &= a;
        assert_eq!(info, a);
        info |= b;
        assert_eq!(info, union);
    }

    #[test]
    fn test_int_value_layout() {
        let info = CaptureInfo::new(CaptureComponents::ADDRESS, CaptureComponents::PROVENANCE);
        assert_eq!(info.to_int_value(), 0x3c);
        assert_eq!(CaptureInfo::from_int_value(0x3c), info);
        assert_eq!(CaptureInfo::all().to_int_value(), 0xff);
        assert_eq!(CaptureInfo::from_int_value(0x1ff), CaptureInfo::all());
    }

    #[test]
    fn test_info_display() {
        assert_snapshot!(CaptureInfo::none().to_string(), @"captures(none)");
        assert_snapshot!(CaptureInfo::all().to_string(), @"captures(address, provenance)");
        assert_snapshot!(
            CaptureInfo::ret_only(CaptureComponents::ADDRESS).to_string(),
            @"captures(ret: address)"
        );
        assert_snapshot!(
            CaptureInfo::new(CaptureComponents::ADDRESS_IS_NULL, CaptureComponents::ALL).to_string(),
            @"captures(address_is_null, ret: address, provenance)"
        );
    }

    #[test]
    fn test_serde_uses_packed_value() {
        let info = CaptureInfo::ret_only(CaptureComponents::READ_PROVENANCE);
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, "4");
        let back: CaptureInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
