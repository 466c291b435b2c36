use crate::node::{SchemaKind, SchemaNode};
use std::fmt;

/// One step from a schema node to a nested node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStep {
    Field(String),
    Element,
    Variant(usize),
}

/// Trail of steps from the root schema, shown as `palette[]` or
/// `shape<1>.radius`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTrail(Vec<SchemaStep>);

impl SchemaTrail {
    pub fn push(&self, step: SchemaStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn steps(&self) -> &[SchemaStep] {
        &self.0
    }
}

impl fmt::Display for SchemaTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            match step {
                SchemaStep::Field(name) if i == 0 => write!(f, "{}", name)?,
                SchemaStep::Field(name) => write!(f, ".{}", name)?,
                SchemaStep::Element => write!(f, "[]")?,
                SchemaStep::Variant(index) => write!(f, "<{}>", index)?,
            }
        }
        Ok(())
    }
}

/// Visitor pattern for traversing schema trees
///
/// Default implementations walk the whole tree. Override specific visit_*
/// methods to act on nodes.
pub trait SchemaVisitor: Sized {
    fn visit_node(&mut self, trail: &SchemaTrail, node: &SchemaNode) {
        walk_node(self, trail, node);
    }

    fn visit_leaf(&mut self, _trail: &SchemaTrail, _node: &SchemaNode) {
        // Leaf node, no children to walk
    }

    fn visit_unsupported(&mut self, _trail: &SchemaTrail, _type_name: &str) {
        // Leaf node, no children to walk
    }
}

pub fn walk_node<V: SchemaVisitor>(visitor: &mut V, trail: &SchemaTrail, node: &SchemaNode) {
    match node.kind() {
        SchemaKind::Object(o) => {
            for (name, field) in &o.fields {
                visitor.visit_node(&trail.push(SchemaStep::Field(name.clone())), field);
            }
        }
        SchemaKind::Array(a) => visitor.visit_node(&trail.push(SchemaStep::Element), &a.element),
        SchemaKind::Optional(inner) | SchemaKind::Nullable(inner) => visitor.visit_node(trail, inner),
        SchemaKind::Union(u) => {
            for (i, variant) in u.variants.iter().enumerate() {
                visitor.visit_node(&trail.push(SchemaStep::Variant(i)), variant);
            }
        }
        SchemaKind::Unsupported(type_name) => visitor.visit_unsupported(trail, type_name),
        SchemaKind::String | SchemaKind::Number(_) | SchemaKind::Boolean | SchemaKind::Enum(_) => {
            visitor.visit_leaf(trail, node)
        }
    }
}

struct UnsupportedCollector {
    found: Vec<String>,
}

impl SchemaVisitor for UnsupportedCollector {
    fn visit_unsupported(&mut self, trail: &SchemaTrail, type_name: &str) {
        self.found.push(format!("{} ({})", trail, type_name));
    }
}

/// Every place in a schema this engine cannot edit, as `trail (type)`.
pub fn unsupported_fields(schema: &SchemaNode) -> Vec<String> {
    let mut collector = UnsupportedCollector { found: Vec::new() };
    collector.visit_node(&SchemaTrail::default(), schema);
    collector.found
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LeafCounter {
        count: usize,
    }

    impl SchemaVisitor for LeafCounter {
        fn visit_leaf(&mut self, _trail: &SchemaTrail, _node: &SchemaNode) {
            self.count += 1;
        }
    }

    #[test]
    fn test_counts_leaves_through_wrappers() {
        let schema = SchemaNode::object([
            ("a", SchemaNode::string().optional()),
            ("b", SchemaNode::array(SchemaNode::color())),
            ("c", SchemaNode::object([("d", SchemaNode::boolean().nullable())])),
        ]);
        let mut counter = LeafCounter { count: 0 };
        counter.visit_node(&SchemaTrail::default(), &schema);
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn test_unsupported_fields_trail() {
        let schema = SchemaNode::object([
            ("when", SchemaNode::unsupported("date")),
            ("items", SchemaNode::array(SchemaNode::unsupported("map"))),
        ]);
        assert_eq!(unsupported_fields(&schema), ["when (date)", "items[] (map)"]);
    }
}
