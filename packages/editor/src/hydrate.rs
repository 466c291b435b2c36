//! # Hydration
//!
//! Converts between stored composition records (component named by string)
//! and live composition nodes (component resolved to its schema).

use crate::composition::{CompositionNode, LeafComposition};
use crate::errors::{EditorError, HydrateError};
use compedit_common::PropertyBag;
use compedit_schema::{unsupported_fields, SchemaRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub props: PropertyBag,
    pub duration: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub props: PropertyBag,
    pub duration: NonZeroU32,
}

/// On-disk project: an ordered list of composition records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub compositions: Vec<CompositionRecord>,
}

impl ProjectFile {
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    pub fn save(&self, path: &Path) -> Result<(), EditorError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Resolve every record's component against the registry.
///
/// Props are kept as stored even when they fail validation; the editor
/// reports that separately. Ids must be unique across both levels.
pub fn hydrate(
    records: &[CompositionRecord],
    registry: &SchemaRegistry,
) -> Result<Vec<Arc<CompositionNode>>, HydrateError> {
    let mut seen = HashSet::new();
    let mut check_id = |id: &str| {
        if seen.insert(id.to_string()) {
            Ok(())
        } else {
            Err(HydrateError::DuplicateId(id.to_string()))
        }
    };

    let mut out = Vec::with_capacity(records.len());
    for record in records {
        check_id(&record.id)?;
        let binding = registry
            .animation(&record.name)
            .ok_or_else(|| HydrateError::UnknownComponent {
                id: record.id.clone(),
                name: record.name.clone(),
            })?;
        warn_unsupported(&record.name, &binding.schema);

        let background = match &record.background {
            Some(bg) => {
                check_id(&bg.id)?;
                let binding = registry
                    .background(&bg.name)
                    .ok_or_else(|| HydrateError::UnknownBackground {
                        id: bg.id.clone(),
                        name: bg.name.clone(),
                    })?;
                warn_unsupported(&bg.name, &binding.schema);
                Some(Arc::new(LeafComposition {
                    id: bg.id.clone(),
                    component: bg.name.clone(),
                    schema: Arc::clone(&binding.schema),
                    props: Arc::new(bg.props.clone()),
                    duration: bg.duration,
                }))
            }
            None => None,
        };

        out.push(Arc::new(CompositionNode {
            id: record.id.clone(),
            component: record.name.clone(),
            schema: Arc::clone(&binding.schema),
            props: Arc::new(record.props.clone()),
            duration: record.duration,
            background,
        }));
    }

    debug!(count = out.len(), "hydrated compositions");
    Ok(out)
}

/// Inverse of [`hydrate`]: names replace resolved schemas.
pub fn dehydrate(compositions: &[Arc<CompositionNode>]) -> Vec<CompositionRecord> {
    compositions
        .iter()
        .map(|comp| CompositionRecord {
            id: comp.id.clone(),
            name: comp.component.clone(),
            props: PropertyBag::clone(&comp.props),
            duration: comp.duration,
            background: comp.background.as_ref().map(|bg| BackgroundRecord {
                id: bg.id.clone(),
                name: bg.component.clone(),
                props: PropertyBag::clone(&bg.props),
                duration: bg.duration,
            }),
        })
        .collect()
}

/// Validate stored props of every composition, returning one error per
/// composition whose props do not satisfy its schema.
pub fn audit(compositions: &[Arc<CompositionNode>]) -> Vec<HydrateError> {
    let mut errors = Vec::new();
    for comp in compositions {
        if let Err(error) = comp.schema.resolve_props(&comp.props) {
            errors.push(HydrateError::InvalidProps {
                id: comp.id.clone(),
                error,
            });
        }
        if let Some(bg) = &comp.background {
            if let Err(error) = bg.schema.resolve_props(&bg.props) {
                errors.push(HydrateError::InvalidProps {
                    id: bg.id.clone(),
                    error,
                });
            }
        }
    }
    errors
}

fn warn_unsupported(component: &str, schema: &compedit_schema::SchemaNode) {
    for field in unsupported_fields(schema) {
        warn!(component, field = %field, "schema field has no editor");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compedit_schema::catalog::builtin_registry;

    const PROJECT: &str = r##"{
        "compositions": [
            {
                "id": "intro",
                "name": "fadeInTransition",
                "props": { "text": "Hi", "fadeDuration": 2 },
                "duration": 90,
                "background": {
                    "id": "intro-bg",
                    "name": "gradientMesh",
                    "props": { "speed": 12 },
                    "duration": 90
                }
            },
            { "id": "outro", "name": "simpleTextTyping", "duration": 60 }
        ]
    }"##;

    #[test]
    fn test_hydrate_round_trip() {
        let registry = builtin_registry().unwrap();
        let project = ProjectFile::from_json(PROJECT).unwrap();
        let nodes = hydrate(&project.compositions, &registry).unwrap();

        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].background.as_ref().unwrap().component, "gradientMesh");
        assert!(nodes[1].props.is_empty());
        assert_eq!(dehydrate(&nodes), project.compositions);
    }

    #[test]
    fn test_unknown_names_rejected() {
        let registry = builtin_registry().unwrap();
        let mut project = ProjectFile::from_json(PROJECT).unwrap();
        project.compositions[1].name = "gradientMesh".into();
        let err = hydrate(&project.compositions, &registry).unwrap_err();
        assert!(matches!(err, HydrateError::UnknownComponent { ref name, .. } if name == "gradientMesh"));

        let mut project = ProjectFile::from_json(PROJECT).unwrap();
        project.compositions[0].background.as_mut().unwrap().name = "nope".into();
        let err = hydrate(&project.compositions, &registry).unwrap_err();
        assert!(matches!(err, HydrateError::UnknownBackground { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let registry = builtin_registry().unwrap();
        let mut project = ProjectFile::from_json(PROJECT).unwrap();
        project.compositions[1].id = "intro-bg".into();
        assert_eq!(
            hydrate(&project.compositions, &registry).unwrap_err(),
            HydrateError::DuplicateId("intro-bg".into())
        );
    }

    #[test]
    fn test_zero_duration_rejected() {
        let source = r#"{"compositions": [{"id": "a", "name": "fadeInTransition", "duration": 0}]}"#;
        assert!(ProjectFile::from_json(source).is_err());
    }

    #[test]
    fn test_audit_reports_invalid_props() {
        let registry = builtin_registry().unwrap();
        let mut project = ProjectFile::from_json(PROJECT).unwrap();
        project.compositions[0]
            .background
            .as_mut()
            .unwrap()
            .props
            .insert("size".into(), 500.into());
        let nodes = hydrate(&project.compositions, &registry).unwrap();
        let errors = audit(&nodes);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("intro-bg"));
    }
}
