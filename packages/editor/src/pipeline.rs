//! # Render Pipeline
//!
//! Coordinates the hand-off to the renderer: Commit → Resolve → Diff
//!
//! The Pipeline manages:
//! - Resolving each composition's props against its schema (defaults
//!   filled in, unknown keys dropped)
//! - Detecting which compositions changed since the last refresh, using
//!   pointer identity of the structurally shared tree
//! - Holding back compositions whose saved props do not validate

use crate::composition::{Composition, CompositionNode, TreeLevel};
use compedit_common::PropertyBag;
use compedit_schema::ValidationError;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};

/// What the renderer receives for one composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderInput {
    pub comp_id: String,
    pub component: String,
    pub layer: TreeLevel,
    pub duration: NonZeroU32,
    pub props: PropertyBag,
}

/// Result of pipeline execution
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    /// Bumped on every refresh
    pub version: u64,

    /// Resolved inputs, backgrounds before their foreground
    pub inputs: Vec<RenderInput>,

    /// Ids whose props are not the same `Arc` as in the previous refresh
    pub changed: Vec<String>,

    /// Compositions skipped because their props do not validate
    pub rejected: Vec<(String, ValidationError)>,
}

/// Tracks the last tree handed to the renderer
#[derive(Debug, Default)]
pub struct Pipeline {
    last: Vec<Arc<CompositionNode>>,
    version: u64,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the tree and report what changed since the last refresh.
    pub fn refresh(&mut self, tree: &[Arc<CompositionNode>]) -> PipelineResult {
        let previous: HashMap<&str, &Arc<CompositionNode>> =
            self.last.iter().map(|comp| (comp.id.as_str(), comp)).collect();

        let mut changed = Vec::new();
        for comp in tree {
            let old = previous.get(comp.id.as_str());
            if !old.map_or(false, |old| Arc::ptr_eq(&old.props, &comp.props)) {
                changed.push(comp.id.clone());
            }
            if let Some(background) = &comp.background {
                let old_background = old.and_then(|old| old.background.as_ref());
                if !old_background.map_or(false, |old| Arc::ptr_eq(old, background)) {
                    changed.push(background.id.clone());
                }
            }
        }

        let (inputs, rejected) = resolve_tree(tree);
        self.version += 1;
        self.last = tree.to_vec();
        debug!(version = self.version, changed = changed.len(), "pipeline refreshed");

        PipelineResult {
            version: self.version,
            inputs,
            changed,
            rejected,
        }
    }
}

fn resolve_tree(tree: &[Arc<CompositionNode>]) -> (Vec<RenderInput>, Vec<(String, ValidationError)>) {
    let mut inputs = Vec::new();
    let mut rejected = Vec::new();
    let mut push = |comp: &dyn Composition, layer: TreeLevel| match comp.schema().resolve_props(comp.props()) {
        Ok(props) => inputs.push(RenderInput {
            comp_id: comp.id().to_string(),
            component: comp.component().to_string(),
            layer,
            duration: comp.duration(),
            props,
        }),
        Err(error) => {
            warn!(comp_id = comp.id(), %error, "props do not validate, not rendering");
            rejected.push((comp.id().to_string(), error));
        }
    };

    for comp in tree {
        if let Some(background) = &comp.background {
            push(background.as_ref(), TreeLevel::Background);
        }
        push(comp.as_ref(), TreeLevel::Foreground);
    }
    (inputs, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{modify_props_in_tree, LeafComposition, TreeLocator};
    use compedit_common::PropValue;
    use compedit_schema::SchemaNode;

    fn node(id: &str, background: Option<&str>) -> Arc<CompositionNode> {
        let schema = Arc::new(SchemaNode::object([(
            "speed",
            SchemaNode::number().min(1.0).max(15.0).default(12),
        )]));
        let duration = NonZeroU32::new(60).unwrap();
        Arc::new(CompositionNode {
            id: id.into(),
            component: "scaleUpDownTransition".into(),
            schema: Arc::clone(&schema),
            props: Arc::new(PropertyBag::new()),
            duration,
            background: background.map(|bg| {
                Arc::new(LeafComposition {
                    id: bg.into(),
                    component: "gradientMesh".into(),
                    schema,
                    props: Arc::new(PropertyBag::new()),
                    duration,
                })
            }),
        })
    }

    #[test]
    fn test_initial_refresh_reports_everything() {
        let tree = vec![node("a", Some("a-bg")), node("b", None)];
        let mut pipeline = Pipeline::new();
        let result = pipeline.refresh(&tree);

        assert_eq!(result.version, 1);
        assert_eq!(result.changed, vec!["a", "a-bg", "b"]);
        assert_eq!(result.inputs.len(), 3);
        assert_eq!(result.inputs[0].layer, TreeLevel::Background);
        assert_eq!(result.inputs[1].props.get("speed"), Some(&PropValue::from(12)));
    }

    #[test]
    fn test_refresh_detects_changes_by_identity() {
        let tree = vec![node("a", Some("a-bg")), node("b", None)];
        let mut pipeline = Pipeline::new();
        pipeline.refresh(&tree);

        let next = modify_props_in_tree(&tree, &TreeLocator::background("a"), "a-bg", "speed", 3.into());
        let result = pipeline.refresh(&next);
        assert_eq!(result.changed, vec!["a-bg"]);

        assert!(pipeline.refresh(&next).changed.is_empty());
    }

    #[test]
    fn test_invalid_props_are_rejected() {
        let tree = vec![node("a", None)];
        let tree = modify_props_in_tree(&tree, &TreeLocator::foreground("a"), "a", "speed", 40.into());
        let result = Pipeline::new().refresh(&tree);
        assert!(result.inputs.is_empty());
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].0, "a");
    }
}
