// SPDX-License-Identifier: MIT OR Apache-2.0
//! Composite labels for items that have no single unique field.
//!
//! Hooks, flows and snaps are addressed in the view by short strings built
//! from the layout keys of their endpoints:
//!
//! - hook label `"{origin_altitude}_{dest_altitude}_{latch_index}"`, e.g. `1_2_7`
//!   is the hook from the band at altitude 1 to altitude 2, anchored at block 7.
//!   Altitudes may carry a leading `-`.
//! - flow label `"{origin_index}_{dest_index}"`, e.g. `3_4`.
//! - snap key `"{block_index}{e|c}{order}"`, e.g. `3e0` is the first emitter of
//!   block 3.
//!
//! Decoding only accepts the exact strings the encoder produces: the whole
//! input must match, digits are ASCII only, and numbers must be canonical
//! (no leading zeros, no `-0`).

use crate::connection::Direction;
use crate::error::InvalidLabelError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

static HOOK_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?[0-9]+)_(-?[0-9]+)_([0-9]+)$").expect("hook label pattern"));
static FLOW_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)_([0-9]+)$").expect("flow label pattern"));
static SNAP_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)([ec])([0-9]+)$").expect("snap key pattern"));

/// Parse one captured field, rejecting overflow and non-canonical spellings
fn canonical<T>(field: &str, kind: &'static str, label: &str) -> Result<T, InvalidLabelError>
where
    T: FromStr + ToString,
{
    let value: T = field
        .parse()
        .map_err(|_| InvalidLabelError::new(kind, label))?;
    if value.to_string() != field {
        return Err(InvalidLabelError::new(kind, label));
    }
    Ok(value)
}

/// Key of a hook item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HookLabel {
    /// Altitude of the origin band
    pub origin_altitude: i32,
    /// Altitude of the destination band
    pub dest_altitude: i32,
    /// Position index of the latch block
    pub latch_index: u32,
}

impl HookLabel {
    /// Create a hook label
    pub fn new(origin_altitude: i32, dest_altitude: i32, latch_index: u32) -> Self {
        Self {
            origin_altitude,
            dest_altitude,
            latch_index,
        }
    }

    /// The higher of the two band altitudes
    pub fn top_altitude(&self) -> i32 {
        self.origin_altitude.max(self.dest_altitude)
    }

    /// The lower of the two band altitudes
    pub fn bottom_altitude(&self) -> i32 {
        self.origin_altitude.min(self.dest_altitude)
    }
}

impl fmt::Display for HookLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.origin_altitude, self.dest_altitude, self.latch_index)
    }
}

impl FromStr for HookLabel {
    type Err = InvalidLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "hooklabel";
        let caps = HOOK_LABEL_RE
            .captures(s)
            .ok_or_else(|| InvalidLabelError::new(KIND, s))?;
        Ok(Self {
            origin_altitude: canonical(&caps[1], KIND, s)?,
            dest_altitude: canonical(&caps[2], KIND, s)?,
            latch_index: canonical(&caps[3], KIND, s)?,
        })
    }
}

/// Key of a flow item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowLabel {
    /// Position index of the origin block
    pub origin_index: u32,
    /// Position index of the destination block
    pub dest_index: u32,
}

impl FlowLabel {
    /// Create a flow label
    pub fn new(origin_index: u32, dest_index: u32) -> Self {
        Self {
            origin_index,
            dest_index,
        }
    }
}

impl fmt::Display for FlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.origin_index, self.dest_index)
    }
}

impl FromStr for FlowLabel {
    type Err = InvalidLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "flowlabel";
        let caps = FLOW_LABEL_RE
            .captures(s)
            .ok_or_else(|| InvalidLabelError::new(KIND, s))?;
        Ok(Self {
            origin_index: canonical(&caps[1], KIND, s)?,
            dest_index: canonical(&caps[2], KIND, s)?,
        })
    }
}

/// Key of a snap item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapKey {
    /// Position index of the owning block
    pub block_index: u32,
    /// Emitter or collector container
    pub direction: Direction,
    /// Order within the container
    pub order: u32,
}

impl SnapKey {
    /// Create a snap key
    pub fn new(block_index: u32, direction: Direction, order: u32) -> Self {
        Self {
            block_index,
            direction,
            order,
        }
    }
}

impl fmt::Display for SnapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.block_index, self.direction.container_tag(), self.order)
    }
}

impl FromStr for SnapKey {
    type Err = InvalidLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const KIND: &str = "snapkey";
        let caps = SNAP_KEY_RE
            .captures(s)
            .ok_or_else(|| InvalidLabelError::new(KIND, s))?;
        let direction = caps[2]
            .chars()
            .next()
            .and_then(Direction::from_container_tag)
            .ok_or_else(|| InvalidLabelError::new(KIND, s))?;
        Ok(Self {
            block_index: canonical(&caps[1], KIND, s)?,
            direction,
            order: canonical(&caps[3], KIND, s)?,
        })
    }
}

/// Generate a hook label string
pub fn gen_hooklabel(origin_altitude: i32, dest_altitude: i32, latch_index: u32) -> String {
    HookLabel::new(origin_altitude, dest_altitude, latch_index).to_string()
}

/// Parse a hook label string into `(origin_altitude, dest_altitude, latch_index)`
pub fn parse_hooklabel(label: &str) -> Result<(i32, i32, u32), InvalidLabelError> {
    let parsed: HookLabel = label.parse()?;
    Ok((parsed.origin_altitude, parsed.dest_altitude, parsed.latch_index))
}

/// Generate a flow label string
pub fn gen_flowlabel(origin_index: u32, dest_index: u32) -> String {
    FlowLabel::new(origin_index, dest_index).to_string()
}

/// Parse a flow label string into `(origin_index, dest_index)`
pub fn parse_flowlabel(label: &str) -> Result<(u32, u32), InvalidLabelError> {
    let parsed: FlowLabel = label.parse()?;
    Ok((parsed.origin_index, parsed.dest_index))
}

/// Generate a snap key string
pub fn gen_snapkey(block_index: u32, direction: Direction, order: u32) -> String {
    SnapKey::new(block_index, direction, order).to_string()
}

/// Parse a snap key string into `(block_index, direction, order)`
pub fn parse_snapkey(key: &str) -> Result<(u32, Direction, u32), InvalidLabelError> {
    let parsed: SnapKey = key.parse()?;
    Ok((parsed.block_index, parsed.direction, parsed.order))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooklabel_format() {
        assert_eq!(gen_hooklabel(1, 2, 7), "1_2_7");
        assert_eq!(gen_hooklabel(-3, 2, 0), "-3_2_0");
        assert_eq!(parse_hooklabel("-3_-12_4").unwrap(), (-3, -12, 4));
    }

    #[test]
    fn test_hooklabel_rejects_garbage() {
        for bad in ["", "1_2", "1_2_3_4", "1_2_-3", "a_2_3", "1_2_3 ", " 1_2_3", "1__2_3", "01_2_3", "-0_1_2"] {
            let err = parse_hooklabel(bad).unwrap_err();
            assert_eq!(err.kind, "hooklabel", "accepted {bad:?}");
        }
    }

    #[test]
    fn test_hooklabel_rejects_overflow() {
        assert!(parse_hooklabel("1_2_99999999999").is_err());
        assert!(parse_hooklabel("2147483648_1_1").is_err());
    }

    #[test]
    fn test_hooklabel_bands() {
        let label = HookLabel::new(5, -2, 9);
        assert_eq!(label.top_altitude(), 5);
        assert_eq!(label.bottom_altitude(), -2);
    }

    #[test]
    fn test_flowlabel_format() {
        assert_eq!(gen_flowlabel(3, 4), "3_4");
        assert_eq!(parse_flowlabel("10_0").unwrap(), (10, 0));
    }

    #[test]
    fn test_flowlabel_rejects_signs_and_arity() {
        for bad in ["-1_2", "1_-2", "1_2_3", "1", "1_2x", "x1_2", "1_02"] {
            assert!(parse_flowlabel(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_non_ascii_digits_rejected() {
        // Arabic-Indic digits match `\d` but are not part of the format.
        assert!(parse_flowlabel("\u{661}_2").is_err());
    }

    #[test]
    fn test_snapkey_format() {
        assert_eq!(gen_snapkey(3, Direction::Source, 0), "3e0");
        assert_eq!(gen_snapkey(12, Direction::Sink, 4), "12c4");
        assert_eq!(parse_snapkey("12c4").unwrap(), (12, Direction::Sink, 4));
        assert!(parse_snapkey("12x4").is_err());
        assert!(parse_snapkey("12e").is_err());
    }
}
