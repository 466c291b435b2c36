//! # Composition Tree
//!
//! Compositions are immutable and shared through `Arc`. A foreground
//! composition may own one background; backgrounds never own anything.
//! Every update produces new nodes along the changed path and reuses the
//! rest, so consumers can detect changes with `Arc::ptr_eq`.

use compedit_common::{PropValue, PropertyBag};
use compedit_schema::SchemaNode;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;

/// What an editor needs from a composition at either level.
pub trait Composition {
    fn id(&self) -> &str;
    fn component(&self) -> &str;
    fn schema(&self) -> &SchemaNode;
    fn props(&self) -> &PropertyBag;
    fn duration(&self) -> NonZeroU32;
}

/// A background layer. Has no background of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafComposition {
    pub id: String,
    pub component: String,
    pub schema: Arc<SchemaNode>,
    pub props: Arc<PropertyBag>,
    pub duration: NonZeroU32,
}

/// A top-level composition in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionNode {
    pub id: String,
    pub component: String,
    pub schema: Arc<SchemaNode>,
    pub props: Arc<PropertyBag>,
    pub duration: NonZeroU32,
    pub background: Option<Arc<LeafComposition>>,
}

macro_rules! impl_composition {
    ($ty:ty) => {
        impl Composition for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn component(&self) -> &str {
                &self.component
            }

            fn schema(&self) -> &SchemaNode {
                &self.schema
            }

            fn props(&self) -> &PropertyBag {
                &self.props
            }

            fn duration(&self) -> NonZeroU32 {
                self.duration
            }
        }
    };
}

impl_composition!(LeafComposition);
impl_composition!(CompositionNode);

/// Which level of a top-level composition an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeLevel {
    Foreground,
    Background,
}

/// Address of an editable composition: the top-level composition that
/// owns it, and which level within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLocator {
    pub parent_id: String,
    pub level: TreeLevel,
}

impl TreeLocator {
    pub fn foreground(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            level: TreeLevel::Foreground,
        }
    }

    pub fn background(parent_id: impl Into<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            level: TreeLevel::Background,
        }
    }
}

/// Set `key` in the props of the composition addressed by `locator` and
/// `comp_id`.
///
/// At the foreground level the target must be the parent itself; at the
/// background level it must be the parent's background. When nothing
/// matches, every returned element is the input `Arc`.
pub fn modify_props_in_tree(
    compositions: &[Arc<CompositionNode>],
    locator: &TreeLocator,
    comp_id: &str,
    key: &str,
    value: PropValue,
) -> Vec<Arc<CompositionNode>> {
    update_props_in_tree(compositions, locator, comp_id, |props| {
        props.insert(key.to_string(), value.clone());
    })
}

/// Remove `key` from the addressed composition's props. Same addressing
/// and sharing rules as [`modify_props_in_tree`].
pub fn remove_prop_in_tree(
    compositions: &[Arc<CompositionNode>],
    locator: &TreeLocator,
    comp_id: &str,
    key: &str,
) -> Vec<Arc<CompositionNode>> {
    update_props_in_tree(compositions, locator, comp_id, |props| {
        props.remove(key);
    })
}

fn update_props_in_tree(
    compositions: &[Arc<CompositionNode>],
    locator: &TreeLocator,
    comp_id: &str,
    update: impl Fn(&mut PropertyBag),
) -> Vec<Arc<CompositionNode>> {
    let mut matched = false;
    let out = compositions
        .iter()
        .map(|comp| {
            if comp.id != locator.parent_id {
                return Arc::clone(comp);
            }
            match locator.level {
                TreeLevel::Foreground if comp.id == comp_id => {
                    matched = true;
                    let mut props = PropertyBag::clone(&comp.props);
                    update(&mut props);
                    Arc::new(CompositionNode {
                        props: Arc::new(props),
                        ..CompositionNode::clone(comp)
                    })
                }
                TreeLevel::Background => match &comp.background {
                    Some(background) if background.id == comp_id => {
                        matched = true;
                        let mut props = PropertyBag::clone(&background.props);
                        update(&mut props);
                        Arc::new(CompositionNode {
                            background: Some(Arc::new(LeafComposition {
                                props: Arc::new(props),
                                ..LeafComposition::clone(background)
                            })),
                            ..CompositionNode::clone(comp)
                        })
                    }
                    _ => Arc::clone(comp),
                },
                _ => Arc::clone(comp),
            }
        })
        .collect();

    if !matched {
        debug!(
            parent_id = %locator.parent_id,
            level = ?locator.level,
            comp_id,
            "tree address matched nothing"
        );
    }
    out
}

/// The composition addressed by `locator` and `comp_id`, at either level.
pub fn find_composition(
    compositions: &[Arc<CompositionNode>],
    locator: &TreeLocator,
    comp_id: &str,
) -> Option<Arc<dyn Composition>> {
    let parent = compositions.iter().find(|c| c.id == locator.parent_id)?;
    match locator.level {
        TreeLevel::Foreground if parent.id == comp_id => Some(Arc::clone(parent) as Arc<dyn Composition>),
        TreeLevel::Background => parent
            .background
            .as_ref()
            .filter(|background| background.id == comp_id)
            .map(|background| Arc::clone(background) as Arc<dyn Composition>),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compedit_schema::SchemaNode;

    fn node(id: &str, background: Option<&str>) -> Arc<CompositionNode> {
        let schema = Arc::new(SchemaNode::object([("speed", SchemaNode::number())]));
        let mut props = PropertyBag::new();
        props.insert("speed".into(), PropValue::from(1));
        Arc::new(CompositionNode {
            id: id.into(),
            component: "pulse".into(),
            schema: Arc::clone(&schema),
            props: Arc::new(props.clone()),
            duration: NonZeroU32::new(30).unwrap(),
            background: background.map(|bg| {
                Arc::new(LeafComposition {
                    id: bg.into(),
                    component: "plain".into(),
                    schema,
                    props: Arc::new(props),
                    duration: NonZeroU32::new(30).unwrap(),
                })
            }),
        })
    }

    #[test]
    fn test_foreground_update_shares_siblings() {
        let tree = vec![node("a", Some("a-bg")), node("b", None)];
        let out = modify_props_in_tree(&tree, &TreeLocator::foreground("a"), "a", "speed", 5.into());

        assert_eq!(out[0].props.get("speed"), Some(&PropValue::from(5)));
        assert!(!Arc::ptr_eq(&out[0], &tree[0]));
        assert!(Arc::ptr_eq(&out[1], &tree[1]));
        assert!(Arc::ptr_eq(
            out[0].background.as_ref().unwrap(),
            tree[0].background.as_ref().unwrap()
        ));
        assert_eq!(tree[0].props.get("speed"), Some(&PropValue::from(1)));
    }

    #[test]
    fn test_background_update_shares_foreground_props() {
        let tree = vec![node("a", Some("a-bg"))];
        let out = modify_props_in_tree(&tree, &TreeLocator::background("a"), "a-bg", "speed", 9.into());

        let background = out[0].background.as_ref().unwrap();
        assert_eq!(background.props.get("speed"), Some(&PropValue::from(9)));
        assert!(Arc::ptr_eq(&out[0].props, &tree[0].props));
    }

    #[test]
    fn test_miss_returns_same_elements() {
        let tree = vec![node("a", Some("a-bg")), node("b", None)];
        let misses = [
            (TreeLocator::foreground("zzz"), "zzz"),
            (TreeLocator::foreground("a"), "b"),
            (TreeLocator::background("a"), "a"),
            (TreeLocator::background("b"), "b-bg"),
        ];
        for (locator, comp_id) in misses {
            let out = modify_props_in_tree(&tree, &locator, comp_id, "speed", 5.into());
            assert_eq!(out, tree);
            assert!(out.iter().zip(&tree).all(|(x, y)| Arc::ptr_eq(x, y)));
        }
    }

    #[test]
    fn test_remove_and_find() {
        let tree = vec![node("a", Some("a-bg"))];
        let out = remove_prop_in_tree(&tree, &TreeLocator::foreground("a"), "a", "speed");
        let foreground = find_composition(&out, &TreeLocator::foreground("a"), "a").unwrap();
        assert!(foreground.props().is_empty());
        let background = find_composition(&out, &TreeLocator::background("a"), "a-bg").unwrap();
        assert_eq!(background.component(), "plain");
        assert!(find_composition(&out, &TreeLocator::background("a"), "a").is_none());
    }
}
