//! Color fields: a hex text input split into an RGB swatch and an opacity
//! percentage. Either control recomposes a single `#rrggbbaa` string.

use crate::reducer::{EditContext, EventOutcome};
use crate::view::{FieldSnapshot, Widget};
use compedit_common::{EditPath, PropValue};
use compedit_schema::{Rgba8, SchemaNode};

pub(crate) fn widget(snapshot: &FieldSnapshot) -> Widget {
    let text = snapshot
        .display_value()
        .map(PropValue::display_text)
        .unwrap_or_default();
    let parsed = text.parse::<Rgba8>().ok();
    Widget::Color {
        rgb: parsed.map(|color| color.rgb_hex()),
        opacity_percent: parsed.map(|color| color.opacity_percent()),
        text,
    }
}

pub(crate) fn set_rgb(ctx: &mut EditContext<'_, '_>, path: &EditPath, node: &SchemaNode, rgb: &str) -> EventOutcome {
    let Ok(swatch) = rgb.parse::<Rgba8>() else {
        return EventOutcome::ignored(format!("`{}` is not a color", rgb));
    };
    recompose(ctx, path, node, |current| current.with_rgb(swatch))
}

pub(crate) fn set_opacity(
    ctx: &mut EditContext<'_, '_>,
    path: &EditPath,
    node: &SchemaNode,
    percent: f64,
) -> EventOutcome {
    if !percent.is_finite() {
        return EventOutcome::ignored("opacity must be a finite number");
    }
    recompose(ctx, path, node, |current| current.with_opacity_percent(percent))
}

fn recompose(
    ctx: &mut EditContext<'_, '_>,
    path: &EditPath,
    node: &SchemaNode,
    update: impl FnOnce(Rgba8) -> Rgba8,
) -> EventOutcome {
    let current_value = ctx.current(path);
    let color_node = node.unwrap_for(current_value.as_ref());
    if !color_node.is_color() {
        return EventOutcome::ignored(format!("`{}` is not a color field", path));
    }
    let current = current_color(color_node, current_value.as_ref());
    ctx.write(path, node, Some(PropValue::from(update(current).to_hex8())), false)
}

/// The color being edited. Text that does not parse yet falls back to the
/// field's default, then white.
fn current_color(node: &SchemaNode, value: Option<&PropValue>) -> Rgba8 {
    value
        .and_then(PropValue::as_str)
        .and_then(|text| text.parse().ok())
        .or_else(|| {
            node.synthesize_default()
                .as_ref()
                .and_then(PropValue::as_str)
                .and_then(|text| text.parse().ok())
        })
        .unwrap_or(Rgba8::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldStatus, Validation};

    fn snapshot(value: &str) -> FieldSnapshot {
        let unsaved = Some(PropValue::from(value));
        FieldSnapshot {
            validation: Validation::compute(&SchemaNode::color(), unsaved.as_ref()),
            saved: unsaved.clone(),
            unsaved,
            status: FieldStatus::Clean,
        }
    }

    #[test]
    fn test_widget_splits_alpha() {
        let Widget::Color {
            text,
            rgb,
            opacity_percent,
        } = widget(&snapshot("#1e3c7280"))
        else {
            panic!("expected color widget");
        };
        assert_eq!(text, "#1e3c7280");
        assert_eq!(rgb.as_deref(), Some("#1e3c72"));
        let percent = opacity_percent.unwrap();
        assert!((percent - 50.196).abs() < 0.01);
    }

    #[test]
    fn test_widget_keeps_unparsable_text() {
        let widget = widget(&snapshot("#12"));
        assert_eq!(
            widget,
            Widget::Color {
                text: "#12".into(),
                rgb: None,
                opacity_percent: None,
            }
        );
    }

    #[test]
    fn test_current_color_fallbacks() {
        let with_default = SchemaNode::color().default("#000000");
        assert_eq!(
            current_color(&with_default, Some(&"oops".into())),
            Rgba8::opaque(0, 0, 0)
        );
        assert_eq!(current_color(&SchemaNode::color(), None), Rgba8::WHITE);
    }
}
