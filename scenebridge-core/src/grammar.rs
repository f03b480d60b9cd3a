//! Version-dependent scene tokens
//!
//! Property names and array type names changed between scene formats. A
//! [`FormatGrammar`] is built once per export and borrowed by every emitter.

use crate::types::GodotVersion;

/// Tokens used when writing nodes for one engine version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatGrammar {
    pub version: GodotVersion,
    pub format: u32,
    pub vector_array: &'static str,
    pub int_array: &'static str,
    pub float_array: &'static str,
    pub position_key: &'static str,
    pub rotation_key: &'static str,
    pub scale_key: &'static str,
    pub texture_key: &'static str,
    pub bone_length_key: &'static str,
    pub texture_type: &'static str,
}

impl FormatGrammar {
    pub fn for_version(version: GodotVersion) -> Self {
        let format = version.scene_format();
        match format {
            1 => Self {
                version,
                format,
                vector_array: "Vector2Array",
                int_array: "PoolIntArray",
                float_array: "PoolRealArray",
                position_key: "transform/pos",
                rotation_key: "transform/rot",
                scale_key: "transform/scale",
                texture_key: "texture/texture",
                bone_length_key: "default_length",
                texture_type: "Texture",
            },
            3 => Self {
                version,
                format,
                vector_array: "PackedVector2Array",
                int_array: "PackedInt32Array",
                float_array: "PackedFloat32Array",
                position_key: "position",
                rotation_key: "rotation",
                scale_key: "scale",
                texture_key: "texture",
                bone_length_key: "length",
                texture_type: "Texture2D",
            },
            _ => Self {
                version,
                format,
                vector_array: "PoolVector2Array",
                int_array: "PoolIntArray",
                float_array: "PoolRealArray",
                position_key: "position",
                rotation_key: "rotation",
                scale_key: "scale",
                texture_key: "texture",
                bone_length_key: "default_length",
                texture_type: "Texture",
            },
        }
    }

    /// Format 1 stores rotations in degrees
    pub fn rotation_in_degrees(&self) -> bool {
        self.format == 1
    }

    /// Bone2D gained explicit length/angle settings in format 3
    pub fn has_bone_angle(&self) -> bool {
        self.format == 3
    }

    /// Format 3 writes resource ids as strings
    fn quotes_resource_ids(&self, key: &str) -> bool {
        self.format == 3 || !key.chars().all(|c| c.is_ascii_digit())
    }

    /// Value of an `ext_resource` header's `id` attribute
    pub fn resource_id_value(&self, key: &str) -> String {
        if self.quotes_resource_ids(key) {
            format!("\"{}\"", key)
        } else {
            key.to_string()
        }
    }

    /// Reference to an external resource from a node property
    pub fn ext_resource_ref(&self, key: &str) -> String {
        if self.quotes_resource_ids(key) {
            format!("ExtResource(\"{}\")", key)
        } else {
            format!("ExtResource( {} )", key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tiers() {
        let old = FormatGrammar::for_version(GodotVersion::V2_1);
        assert_eq!(old.vector_array, "Vector2Array");
        assert_eq!(old.position_key, "transform/pos");
        assert!(old.rotation_in_degrees());

        let mid = FormatGrammar::for_version(GodotVersion::V3_5);
        assert_eq!(mid.format, 2);
        assert_eq!(mid.vector_array, "PoolVector2Array");
        assert_eq!(mid.bone_length_key, "default_length");
        assert!(!mid.has_bone_angle());

        let new = FormatGrammar::for_version(GodotVersion::V4);
        assert_eq!(new.int_array, "PackedInt32Array");
        assert_eq!(new.float_array, "PackedFloat32Array");
        assert_eq!(new.bone_length_key, "length");
        assert_eq!(new.texture_type, "Texture2D");
        assert!(new.has_bone_angle());
    }

    #[test]
    fn test_resource_references() {
        let mid = FormatGrammar::for_version(GodotVersion::V3_5);
        assert_eq!(mid.resource_id_value("2"), "2");
        assert_eq!(mid.ext_resource_ref("2"), "ExtResource( 2 )");

        let new = FormatGrammar::for_version(GodotVersion::V4);
        assert_eq!(new.resource_id_value("2"), "\"2\"");
        assert_eq!(new.ext_resource_ref("2"), "ExtResource(\"2\")");
        assert_eq!(new.ext_resource_ref("1_r4l0k"), "ExtResource(\"1_r4l0k\")");
    }
}
