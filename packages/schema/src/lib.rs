pub mod blacklist;
pub mod catalog;
pub mod color;
pub mod defaults;
pub mod error;
pub mod node;
pub mod registry;
pub mod validate;
pub mod visitor;
pub mod wire;

pub use blacklist::SchemaBlacklist;
pub use color::Rgba8;
pub use error::*;
pub use node::*;
pub use registry::{describe, generation_context, ComponentBinding, SchemaRegistry};
pub use visitor::{unsupported_fields, walk_node, SchemaStep, SchemaTrail, SchemaVisitor};
