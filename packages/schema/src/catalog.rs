//! Built-in component schemas: text animations and background textures.

use crate::error::SchemaResult;
use crate::node::SchemaNode;
use crate::registry::{ComponentBinding, SchemaRegistry};

pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Props shared by every text animation, edited together as one group.
pub const TYPOGRAPHY_KEYS: [&str; 6] = ["text", "textColor", "fontSize", "fontWeight", "fontFamily", "textAlign"];

fn typography_fields() -> Vec<(&'static str, SchemaNode)> {
    vec![
        ("text", SchemaNode::string().default("Hello World")),
        ("textColor", SchemaNode::color().default("#fff")),
        ("fontSize", SchemaNode::number().optional()),
        ("fontWeight", SchemaNode::number().default(550)),
        ("fontFamily", SchemaNode::string().default(DEFAULT_FONT_FAMILY)),
        (
            "textAlign",
            SchemaNode::enumeration(["left", "center", "right"]).default("center"),
        ),
    ]
}

fn typography_with(extra: Vec<(&'static str, SchemaNode)>) -> SchemaNode {
    let mut fields = typography_fields();
    fields.extend(extra);
    SchemaNode::object(fields)
}

pub fn typography_schema() -> SchemaNode {
    typography_with(Vec::new())
}

pub fn simple_fade_schema() -> SchemaNode {
    typography_with(vec![
        ("fadeDuration", SchemaNode::number().default(80)),
        ("fadeAngle", SchemaNode::number().default(-45)),
    ])
}

pub fn simple_typing_schema() -> SchemaNode {
    typography_with(vec![
        ("typingDuration", SchemaNode::number().default(60)),
        ("damping", SchemaNode::number().default(100)),
    ])
}

pub fn slide_in_schema() -> SchemaNode {
    typography_with(vec![
        ("slideDistance", SchemaNode::number().default(1000)),
        ("slideDuration", SchemaNode::number().default(30)),
        ("damping", SchemaNode::number().default(400)),
    ])
}

pub fn fade_in_schema() -> SchemaNode {
    typography_with(vec![("fadeDuration", SchemaNode::number().default(1.5))])
}

pub fn scale_up_down_schema() -> SchemaNode {
    typography_schema()
}

fn background_color(default: &str) -> (&'static str, SchemaNode) {
    ("backgroundColor", SchemaNode::color().default(default))
}

pub fn plain_background_schema() -> SchemaNode {
    SchemaNode::object([background_color("#1e1e1e")])
}

fn gradient_mesh_with(extra: Vec<(&'static str, SchemaNode)>) -> SchemaNode {
    let mut fields = vec![
        ("extraPoints", SchemaNode::number().min(0.0).default(14)),
        ("size", SchemaNode::number().min(1.0).max(150.0).default(30)),
        ("speed", SchemaNode::number().min(0.0).default(12)),
        ("blur", SchemaNode::number().min(0.0).max(500.0).default(200)),
        ("edginess", SchemaNode::number().min(0.0).max(300.0).default(4)),
        ("positionSeed", SchemaNode::number().min(0.0).max(1000.0).default(3)),
        ("directionSeed", SchemaNode::number().min(0.0).max(1000.0).default(47)),
        background_color("#1e1e1e"),
    ];
    fields.extend(extra);
    SchemaNode::object(fields)
}

pub fn single_color_gradient_mesh_schema() -> SchemaNode {
    gradient_mesh_with(vec![("color", SchemaNode::color().default("#ff0000"))])
}

pub fn multi_color_gradient_mesh_schema() -> SchemaNode {
    gradient_mesh_with(vec![(
        "colors",
        SchemaNode::array(SchemaNode::color()).default(vec![
            "#6d213c", "#946846", "#baab68", "#e3c16f", "#faff70",
        ]),
    )])
}

pub fn twin_mesh_schema() -> SchemaNode {
    SchemaNode::object([background_color("#1e1e1e")])
}

pub fn growing_dark_schema() -> SchemaNode {
    SchemaNode::object([background_color("#1e1e1e")])
}

pub fn stairs_mesh_schema() -> SchemaNode {
    SchemaNode::object([
        background_color("#262234"),
        ("blob_1_background_color", SchemaNode::color().default("#5C4B9F")),
        ("blob_2_background_color", SchemaNode::color().default("#444D9E")),
    ])
}

/// Registry holding every built-in animation and background.
pub fn builtin_registry() -> SchemaResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();

    registry.register_animation(ComponentBinding::new(
        "slideInTransition",
        "Moving text into frame from left to right direction. Best for dramatic entrances or sequential reveals.",
        slide_in_schema(),
    ))?;
    registry.register_animation(ComponentBinding::new(
        "fadeInTransition",
        "Smooth fade in effects. Ideal for subtle transitions or gentle text appearances. soft.",
        fade_in_schema(),
    ))?;
    registry.register_animation(ComponentBinding::new(
        "scaleUpDownTransition",
        "Text scales up from the center. Text jumps out to present something.",
        scale_up_down_schema(),
    ))?;
    registry.register_animation(ComponentBinding::new(
        "simpleTextTyping",
        "Reveals text gradually. For points that visualize typing, manual entry, but also to highlight the written text, because the viewers wait to see the content unveiled.",
        simple_typing_schema(),
    ))?;
    registry.register_animation(ComponentBinding::new(
        "simpleFadeTransition",
        "Fades text in along an angle. Calm, directional reveal.",
        simple_fade_schema(),
    ))?;

    registry.register_background(ComponentBinding::new(
        "plainBackground",
        "use this sparingly, it is just a simple background, if you use it use also other colors than white",
        plain_background_schema(),
    ))?;
    registry.register_background(ComponentBinding::new(
        "gradientMesh",
        "gradients are aesthetic. more on the techy side. modern feel.",
        single_color_gradient_mesh_schema(),
    ))?;
    registry.register_background(ComponentBinding::new(
        "singleColorGradientMesh",
        "A moving mesh built around one accent color.",
        single_color_gradient_mesh_schema(),
    ))?;
    registry.register_background(ComponentBinding::new(
        "multiColorGradientMesh",
        "A moving mesh blending a palette of colors.",
        multi_color_gradient_mesh_schema(),
    ))?;
    registry.register_background(ComponentBinding::new(
        "twinTexture",
        "Two mirrored shapes over a flat color.",
        twin_mesh_schema(),
    ))?;
    registry.register_background(ComponentBinding::new(
        "growingDark",
        "Darkness spreading over a flat color. Moody.",
        growing_dark_schema(),
    ))?;
    for name in ["stairsTexture", "stairsTextureV2", "stairsTextureV3"] {
        registry.register_background(ComponentBinding::new(
            name,
            "Two soft blobs stepping across a dark backdrop.",
            stairs_mesh_schema(),
        ))?;
    }

    Ok(registry)
}
