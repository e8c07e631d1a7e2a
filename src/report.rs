//! Human- and machine-readable views of packed attribute values.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;
use trunk_modref::{CaptureComponents, CaptureInfo, IrMemLocation, MemoryEffects, ModRefInfo};

use crate::{Error, Result};

/// Parse an attribute value written in decimal or as `0x`-prefixed hex.
pub fn parse_int(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|source| Error::InvalidInteger {
        text: text.to_owned(),
        source,
    })
}

/// A `Location=Kind` pair given on the command line, e.g. `ArgMem=Ref`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocationAccess {
    pub location: IrMemLocation,
    pub access: ModRefInfo,
}

impl FromStr for LocationAccess {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (location, access) = s
            .split_once('=')
            .ok_or_else(|| Error::MalformedAssignment { text: s.to_owned() })?;
        Ok(Self {
            location: location.trim().parse()?,
            access: access.trim().parse()?,
        })
    }
}

/// Build effects from location assignments.
///
/// Unlisted locations get no access. A location listed more than once gets
/// the union of its kinds.
pub fn encode_memory(assignments: &[LocationAccess]) -> MemoryEffects {
    assignments
        .iter()
        .fold(MemoryEffects::none(), |me, assignment| {
            debug!(
                location = %assignment.location,
                access = %assignment.access,
                "adding location access"
            );
            me | MemoryEffects::new(assignment.location, assignment.access)
        })
}

/// Build a capture descriptor from the components of each path.
pub fn encode_captures(other: CaptureComponents, ret: CaptureComponents) -> CaptureInfo {
    CaptureInfo::new(other, ret)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocationEntry {
    pub location: String,
    pub access: String,
}

/// Decoded view of a memory effects value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryReport {
    pub value: u32,
    pub summary: String,
    pub locations: Vec<LocationEntry>,
    pub does_not_access_memory: bool,
    pub only_reads_memory: bool,
    pub only_writes_memory: bool,
    pub only_accesses_arg_pointees: bool,
    pub only_accesses_inaccessible_or_arg_mem: bool,
}

impl MemoryReport {
    pub fn new(effects: MemoryEffects) -> Self {
        let locations = MemoryEffects::locations()
            .map(|loc| LocationEntry {
                location: loc.to_string(),
                access: effects.get_mod_ref(loc).to_string(),
            })
            .collect();
        Self {
            value: effects.to_int_value(),
            summary: effects.to_string(),
            locations,
            does_not_access_memory: effects.does_not_access_memory(),
            only_reads_memory: effects.only_reads_memory(),
            only_writes_memory: effects.only_writes_memory(),
            only_accesses_arg_pointees: effects.only_accesses_arg_pointees(),
            only_accesses_inaccessible_or_arg_mem: effects
                .only_accesses_inaccessible_or_arg_mem(),
        }
    }

    /// Decode a packed value as stored in a memory attribute.
    pub fn decode(value: u32) -> Self {
        debug!(value, "decoding memory effects");
        Self::new(MemoryEffects::from_int_value(value))
    }
}

impl fmt::Display for MemoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "memory {:#x}: {}", self.value, self.summary)?;
        for entry in &self.locations {
            writeln!(f, "  {:<16} {}", entry.location, entry.access)?;
        }
        writeln!(f, "does not access memory: {}", self.does_not_access_memory)?;
        writeln!(f, "only reads memory: {}", self.only_reads_memory)?;
        writeln!(f, "only writes memory: {}", self.only_writes_memory)?;
        writeln!(
            f,
            "only accesses arg pointees: {}",
            self.only_accesses_arg_pointees
        )?;
        write!(
            f,
            "only accesses inaccessible or arg mem: {}",
            self.only_accesses_inaccessible_or_arg_mem
        )
    }
}

/// Decoded view of a capture descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    pub value: u32,
    pub summary: String,
    pub other: String,
    pub ret: String,
    pub is_ret_only: bool,
    pub captures_all: bool,
}

impl CaptureReport {
    pub fn new(info: CaptureInfo) -> Self {
        Self {
            value: info.to_int_value(),
            summary: info.to_string(),
            other: info.other_components().to_string(),
            ret: info.ret_components().to_string(),
            is_ret_only: info.is_ret_only(),
            captures_all: info.components().captures_all(),
        }
    }

    /// Decode a packed value as stored in a captures attribute.
    pub fn decode(value: u32) -> Self {
        debug!(value, "decoding capture info");
        Self::new(CaptureInfo::from_int_value(value))
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "captures {:#04x}: {}", self.value, self.summary)?;
        writeln!(f, "  other: {}", self.other)?;
        writeln!(f, "  ret:   {}", self.ret)?;
        write!(f, "ret only: {}", self.is_ret_only)
    }
}

/// Render a report as pretty-printed JSON.
pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
