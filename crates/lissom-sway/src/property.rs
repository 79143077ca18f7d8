//! Typed per-joint property access.
//!
//! Hosts that drive the engine from untyped data (UI panels, scripting,
//! persisted JSON) address fields by key string; everything past the
//! [`FromStr`] boundary is a typed enum.

use crate::config::{Gain, JointKind, Limit, ZoneConfig};
use crate::error::ConfigError;
use glam::Vec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Addressable per-joint configuration fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// The joint kind (key `"type"`).
    Kind,
    /// Spring stiffness (key `"stiffness"`).
    Stiffness,
    /// Spring damping (key `"damping"`).
    Damping,
    /// Reaction strength to parent motion (key `"externalFactor"`).
    ExternalFactor,
    /// Per-lane applied-value clamps (key `"limits"`).
    Limits,
    /// Constant parent-local bias (key `"deltaLocal"`).
    LocalOffset,
    /// Constant world-space bias (key `"deltaWorld"`).
    WorldOffset,
    /// Pivot mode (key `"pivot"`).
    Pivot,
    /// Exclusion zones (key `"excludeZones"`).
    ExcludeZones,
    /// Debug primitive emission (key `"debugVisible"`).
    DebugVisible,
}

impl PropertyKey {
    /// Returns the host-facing key string.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyKey::Kind => "type",
            PropertyKey::Stiffness => "stiffness",
            PropertyKey::Damping => "damping",
            PropertyKey::ExternalFactor => "externalFactor",
            PropertyKey::Limits => "limits",
            PropertyKey::LocalOffset => "deltaLocal",
            PropertyKey::WorldOffset => "deltaWorld",
            PropertyKey::Pivot => "pivot",
            PropertyKey::ExcludeZones => "excludeZones",
            PropertyKey::DebugVisible => "debugVisible",
        }
    }
}

impl FromStr for PropertyKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type" => Ok(PropertyKey::Kind),
            "stiffness" => Ok(PropertyKey::Stiffness),
            "damping" => Ok(PropertyKey::Damping),
            "externalFactor" => Ok(PropertyKey::ExternalFactor),
            "limits" => Ok(PropertyKey::Limits),
            "deltaLocal" => Ok(PropertyKey::LocalOffset),
            "deltaWorld" => Ok(PropertyKey::WorldOffset),
            "pivot" => Ok(PropertyKey::Pivot),
            "excludeZones" => Ok(PropertyKey::ExcludeZones),
            "debugVisible" => Ok(PropertyKey::DebugVisible),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}

/// One property value, tagged with the field it belongs to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Property {
    /// The joint kind.
    Kind(JointKind),
    /// Spring stiffness.
    Stiffness(Gain),
    /// Spring damping.
    Damping(Gain),
    /// Reaction strength to parent motion.
    ExternalFactor(f32),
    /// Per-lane applied-value clamps.
    Limits([Option<Limit>; 4]),
    /// Constant parent-local bias.
    LocalOffset(Option<Vec3>),
    /// Constant world-space bias.
    WorldOffset(Option<Vec3>),
    /// Pivot mode.
    Pivot(bool),
    /// Exclusion zones.
    ExcludeZones(Vec<ZoneConfig>),
    /// Debug primitive emission.
    DebugVisible(bool),
}

impl Property {
    /// Returns the key this value belongs to.
    pub fn key(&self) -> PropertyKey {
        match self {
            Property::Kind(_) => PropertyKey::Kind,
            Property::Stiffness(_) => PropertyKey::Stiffness,
            Property::Damping(_) => PropertyKey::Damping,
            Property::ExternalFactor(_) => PropertyKey::ExternalFactor,
            Property::Limits(_) => PropertyKey::Limits,
            Property::LocalOffset(_) => PropertyKey::LocalOffset,
            Property::WorldOffset(_) => PropertyKey::WorldOffset,
            Property::Pivot(_) => PropertyKey::Pivot,
            Property::ExcludeZones(_) => PropertyKey::ExcludeZones,
            Property::DebugVisible(_) => PropertyKey::DebugVisible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KEYS: [PropertyKey; 10] = [
        PropertyKey::Kind,
        PropertyKey::Stiffness,
        PropertyKey::Damping,
        PropertyKey::ExternalFactor,
        PropertyKey::Limits,
        PropertyKey::LocalOffset,
        PropertyKey::WorldOffset,
        PropertyKey::Pivot,
        PropertyKey::ExcludeZones,
        PropertyKey::DebugVisible,
    ];

    #[test]
    fn test_key_string_roundtrip() {
        for key in ALL_KEYS {
            assert_eq!(key.as_str().parse::<PropertyKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "gravity".parse::<PropertyKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_value_key_pairing() {
        assert_eq!(Property::Kind(JointKind::Full).key(), PropertyKey::Kind);
        assert_eq!(
            Property::Stiffness(Gain::Uniform(1.0)).key(),
            PropertyKey::Stiffness
        );
        assert_eq!(
            Property::LocalOffset(Some(Vec3::ONE)).key(),
            PropertyKey::LocalOffset
        );
        assert_eq!(Property::Pivot(true).key(), PropertyKey::Pivot);
    }
}
