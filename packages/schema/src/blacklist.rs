use crate::node::{SchemaKind, SchemaNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fields hidden from the schema handed to automated prop generation.
///
/// Serialized as `{ "global": [..], "<component>": [..] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaBlacklist {
    #[serde(default)]
    pub global: Vec<String>,
    #[serde(flatten)]
    pub components: BTreeMap<String, Vec<String>>,
}

impl Default for SchemaBlacklist {
    fn default() -> Self {
        let seeds = ["positionSeed", "directionSeed", "extraPoints"];
        let mut components = BTreeMap::new();
        components.insert(
            "typography".to_string(),
            [
                "typo_fontSize",
                "typo_fontWeight",
                "typo_fontFamily",
                "typo_letter_spacing",
                "typo_textAlign",
                "typo_verticalAlign",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        );
        for mesh in ["gradientMesh", "singleColorGradientMesh", "multiColorGradientMesh"] {
            components.insert(mesh.to_string(), seeds.iter().map(|s| s.to_string()).collect());
        }
        Self {
            global: Vec::new(),
            components,
        }
    }
}

impl SchemaBlacklist {
    /// Global entries followed by the component's own entries.
    pub fn fields_for(&self, component: &str) -> Vec<&str> {
        self.global
            .iter()
            .chain(self.components.get(component).into_iter().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn is_blacklisted(&self, component: &str, field: &str) -> bool {
        self.fields_for(component).contains(&field)
    }

    /// Copy of `schema` without the component's blacklisted top-level
    /// fields. Non-object schemas are returned unchanged.
    pub fn prune(&self, component: &str, schema: &SchemaNode) -> SchemaNode {
        let hidden = self.fields_for(component);
        let mut pruned = schema.clone();
        if let SchemaKind::Object(object) = &mut pruned.kind {
            object.fields.retain(|(key, _)| !hidden.contains(&key.as_str()));
        }
        pruned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_hide_mesh_seeds() {
        let blacklist = SchemaBlacklist::default();
        assert!(blacklist.is_blacklisted("gradientMesh", "positionSeed"));
        assert!(!blacklist.is_blacklisted("gradientMesh", "speed"));
        assert!(blacklist.fields_for("plainBackground").is_empty());
    }

    #[test]
    fn test_global_applies_everywhere() {
        let blacklist: SchemaBlacklist =
            serde_json::from_str(r#"{"global": ["secret"], "pulse": ["speed"]}"#).unwrap();
        assert_eq!(blacklist.fields_for("pulse"), ["secret", "speed"]);
        assert_eq!(blacklist.fields_for("other"), ["secret"]);
    }

    #[test]
    fn test_prune() {
        let blacklist: SchemaBlacklist = serde_json::from_str(r#"{"pulse": ["speed"]}"#).unwrap();
        let schema = SchemaNode::object([
            ("speed", SchemaNode::number()),
            ("color", SchemaNode::color()),
        ]);
        let pruned = blacklist.prune("pulse", &schema);
        assert_eq!(pruned.as_object().unwrap().keys().collect::<Vec<_>>(), ["color"]);
        assert_eq!(schema.as_object().unwrap().fields.len(), 2);
    }
}
