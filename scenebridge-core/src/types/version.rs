//! Target engine versions
//!
//! The engine changed its scene dialect twice: 2.1 used format 1, the 3.x line
//! uses format 2 and 4.0 introduced format 3.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Engine version a scene is exported for
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GodotVersion {
    /// No Skeleton2D nodes or internal vertices
    #[serde(rename = "2.1")]
    V2_1,

    /// No Skeleton2D nodes or internal vertices
    #[serde(rename = "3.0")]
    V3_0,

    #[serde(rename = "3.1")]
    V3_1,

    #[serde(rename = "3.2")]
    V3_2,

    #[serde(rename = "3.3")]
    V3_3,

    #[serde(rename = "3.4")]
    V3_4,

    #[default]
    #[serde(rename = "3.5")]
    V3_5,

    #[serde(rename = "3.6")]
    V3_6,

    /// Versions beyond 4.0 may be unsupported
    #[serde(rename = "4.0", alias = "4.0+", alias = "4")]
    V4,
}

impl GodotVersion {
    /// All versions, oldest first
    pub const ALL: [GodotVersion; 9] = [
        GodotVersion::V2_1,
        GodotVersion::V3_0,
        GodotVersion::V3_1,
        GodotVersion::V3_2,
        GodotVersion::V3_3,
        GodotVersion::V3_4,
        GodotVersion::V3_5,
        GodotVersion::V3_6,
        GodotVersion::V4,
    ];

    /// Structural format number written to the scene descriptor
    pub fn scene_format(self) -> u32 {
        match self {
            GodotVersion::V2_1 => 1,
            GodotVersion::V4 => 3,
            _ => 2,
        }
    }

    /// Skeleton2D/Bone2D nodes exist from 3.1 on
    pub fn supports_skeletons(self) -> bool {
        self >= GodotVersion::V3_1
    }

    /// Polygon2D gained internal vertices and explicit polygons in 3.1
    pub fn supports_internal_vertices(self) -> bool {
        self >= GodotVersion::V3_1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GodotVersion::V2_1 => "2.1",
            GodotVersion::V3_0 => "3.0",
            GodotVersion::V3_1 => "3.1",
            GodotVersion::V3_2 => "3.2",
            GodotVersion::V3_3 => "3.3",
            GodotVersion::V3_4 => "3.4",
            GodotVersion::V3_5 => "3.5",
            GodotVersion::V3_6 => "3.6",
            GodotVersion::V4 => "4.0",
        }
    }
}

impl fmt::Display for GodotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized version string
#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown engine version '{0}' (expected one of 2.1, 3.0-3.6, 4.0)")]
pub struct UnknownVersion(pub String);

impl FromStr for GodotVersion {
    type Err = UnknownVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let normalized = trimmed.trim_end_matches('+');
        if normalized == "4" || normalized.starts_with("4.") {
            return Ok(GodotVersion::V4);
        }
        GodotVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| UnknownVersion(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_format() {
        assert_eq!(GodotVersion::V2_1.scene_format(), 1);
        assert_eq!(GodotVersion::V3_0.scene_format(), 2);
        assert_eq!(GodotVersion::V3_6.scene_format(), 2);
        assert_eq!(GodotVersion::V4.scene_format(), 3);
    }

    #[test]
    fn test_capabilities() {
        assert!(!GodotVersion::V2_1.supports_skeletons());
        assert!(!GodotVersion::V3_0.supports_internal_vertices());
        assert!(GodotVersion::V3_1.supports_skeletons());
        assert!(GodotVersion::V4.supports_internal_vertices());
    }

    #[test]
    fn test_parse_version() {
        assert_eq!("3.5".parse::<GodotVersion>().unwrap(), GodotVersion::V3_5);
        assert_eq!("4.0+".parse::<GodotVersion>().unwrap(), GodotVersion::V4);
        assert_eq!("4.2".parse::<GodotVersion>().unwrap(), GodotVersion::V4);
        assert!("1.0".parse::<GodotVersion>().is_err());
    }

    #[test]
    fn test_version_serde() {
        let json = serde_json::to_string(&GodotVersion::V3_1).unwrap();
        assert_eq!(json, "\"3.1\"");
        let parsed: GodotVersion = serde_json::from_str("\"4.0+\"").unwrap();
        assert_eq!(parsed, GodotVersion::V4);
    }
}
