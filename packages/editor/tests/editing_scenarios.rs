//! Editing scenarios driven through the store: events in, views out.
//!
//! This tests:
//! - Dirty/valid transitions and save gating
//! - Container editors (object, array, optional, union)
//! - Reconciliation against new saved props and revisions

use compedit_common::{EditPath, PropValue, PropertyBag};
use compedit_editor::{
    EditorEvent, EditorStore, EventOutcome, FieldGroup, FieldStatus, FieldView, LeafComposition, RootNotice, SaveRequest,
    Sentinel, Widget,
};
use compedit_schema::catalog::{simple_fade_schema, TYPOGRAPHY_KEYS};
use compedit_schema::SchemaNode;
use std::num::NonZeroU32;
use std::sync::Arc;

fn composition(schema: SchemaNode, props: &[(&str, PropValue)]) -> LeafComposition {
    LeafComposition {
        id: "comp".into(),
        component: "test".into(),
        schema: Arc::new(schema),
        props: Arc::new(
            props
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        ),
        duration: NonZeroU32::new(90).unwrap(),
    }
}

fn with_props(comp: &LeafComposition, props: PropertyBag) -> LeafComposition {
    LeafComposition {
        props: Arc::new(props),
        ..comp.clone()
    }
}

fn speed_and_color() -> LeafComposition {
    composition(
        SchemaNode::object([
            ("speed", SchemaNode::number().min(1.0).max(15.0).default(12)),
            ("color", SchemaNode::color()),
        ]),
        &[("speed", 12.into()), ("color", "#1e3c72".into())],
    )
}

fn path(text: &str) -> EditPath {
    text.parse().unwrap()
}

fn render(store: &mut EditorStore, comp: &LeafComposition) -> FieldView {
    store.render(comp).editor.expect("object schema renders an editor")
}

fn edit(store: &mut EditorStore, comp: &LeafComposition, at: &str, raw: impl Into<PropValue>) -> EventOutcome {
    store.handle(
        comp,
        EditorEvent::Edit {
            path: path(at),
            raw: raw.into(),
        },
    )
}

#[test]
fn test_out_of_range_edit_blocks_save() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    assert!(view.valid);
    assert!(!view.can_save);
    assert_eq!(view.find(&path("speed")).unwrap().status, FieldStatus::Clean);

    assert_eq!(edit(&mut store, &comp, "speed", "20"), EventOutcome::Updated);
    let view = render(&mut store, &comp);
    let speed = view.find(&path("speed")).unwrap();
    assert_eq!(speed.status, FieldStatus::DirtyInvalid);
    assert_eq!(
        speed.error.as_deref(),
        Some("Number must be less than or equal to 15")
    );
    assert_eq!(
        speed.widget,
        Widget::Number {
            text: "20".into(),
            min: Some(1.0),
            max: Some(15.0),
            step: 1.0,
        }
    );
    assert!(!view.valid);
    assert!(!view.can_save);
    assert!(store.is_dirty());
    assert!(matches!(
        store.handle(&comp, EditorEvent::Save { path: EditPath::root() }),
        EventOutcome::Blocked(_)
    ));
}

#[test]
fn test_valid_edit_saves_only_dirty_fields() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);

    edit(&mut store, &comp, "speed", "20");
    edit(&mut store, &comp, "speed", "9");
    let view = render(&mut store, &comp);
    assert_eq!(view.find(&path("speed")).unwrap().status, FieldStatus::DirtyValid);
    assert!(view.can_save);

    let expected = EventOutcome::SaveRequested(vec![SaveRequest {
        comp_id: "comp".into(),
        path: path("speed"),
        value: Some(9.into()),
    }]);
    let save = EditorEvent::Save { path: EditPath::root() };
    assert_eq!(store.handle(&comp, save.clone()), expected);
    // Nothing changed locally, so a second save asks for the same value.
    assert_eq!(store.handle(&comp, save), expected);
}

#[test]
fn test_persisted_save_becomes_clean() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);
    edit(&mut store, &comp, "speed", "9");

    let mut props = PropertyBag::clone(&comp.props);
    props.insert("speed".into(), 9.into());
    let saved = with_props(&comp, props);

    let view = render(&mut store, &saved);
    assert_eq!(view.find(&path("speed")).unwrap().status, FieldStatus::Clean);
    assert!(!store.is_dirty());

    store.props_updated_externally();
    let view = render(&mut store, &saved);
    let speed = view.find(&path("speed")).unwrap();
    assert_eq!(speed.status, FieldStatus::Clean);
    assert!(matches!(&speed.widget, Widget::Number { text, .. } if text == "9"));
}

#[test]
fn test_external_change_followed_unless_diverged() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);
    edit(&mut store, &comp, "color", "#ff0000");

    let mut props = PropertyBag::clone(&comp.props);
    props.insert("speed".into(), 3.into());
    props.insert("color".into(), "#00ff00".into());
    let changed = with_props(&comp, props);

    let view = render(&mut store, &changed);
    let speed = view.find(&path("speed")).unwrap();
    assert!(matches!(&speed.widget, Widget::Number { text, .. } if text == "3"));
    let color = view.find(&path("color")).unwrap();
    assert_eq!(color.status, FieldStatus::DirtyValid);
    assert!(matches!(&color.widget, Widget::Color { text, .. } if text == "#ff0000"));

    store.props_updated_externally();
    let view = render(&mut store, &changed);
    let color = view.find(&path("color")).unwrap();
    assert_eq!(color.status, FieldStatus::Clean);
    assert!(matches!(&color.widget, Widget::Color { text, .. } if text == "#00ff00"));
}

#[test]
fn test_reset_restores_saved_value() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);
    edit(&mut store, &comp, "speed", "20");

    assert_eq!(
        store.handle(&comp, EditorEvent::Reset { path: path("speed") }),
        EventOutcome::Updated
    );
    let view = render(&mut store, &comp);
    assert!(view.valid);
    assert!(!store.is_dirty());
}

#[test]
fn test_empty_number_is_invalid() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);
    edit(&mut store, &comp, "speed", "");

    let view = render(&mut store, &comp);
    assert_eq!(view.find(&path("speed")).unwrap().status, FieldStatus::DirtyInvalid);
}

#[test]
fn test_color_controls_recompose_hex() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    render(&mut store, &comp);

    store.handle(
        &comp,
        EditorEvent::SetOpacity {
            path: path("color"),
            percent: 50.0,
        },
    );
    let view = render(&mut store, &comp);
    assert_eq!(
        view.find(&path("color")).unwrap().widget,
        Widget::Color {
            text: "#1e3c7280".into(),
            rgb: Some("#1e3c72".into()),
            opacity_percent: Some(128.0 / 255.0 * 100.0),
        }
    );

    store.handle(
        &comp,
        EditorEvent::SetColorRgb {
            path: path("color"),
            rgb: "#FF0000".into(),
        },
    );
    let view = render(&mut store, &comp);
    assert!(matches!(
        &view.find(&path("color")).unwrap().widget,
        Widget::Color { text, .. } if text == "#ff000080"
    ));

    assert!(matches!(
        store.handle(
            &comp,
            EditorEvent::SetColorRgb {
                path: path("color"),
                rgb: "red".into(),
            },
        ),
        EventOutcome::Ignored(_)
    ));
}

#[test]
fn test_enum_accepts_declared_literals_only() {
    let comp = composition(
        SchemaNode::object([(
            "textAlign",
            SchemaNode::enumeration(["left", "center", "right"]).default("center"),
        )]),
        &[],
    );
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    assert_eq!(
        view.find(&path("textAlign")).unwrap().widget,
        Widget::Select {
            options: vec!["left".into(), "center".into(), "right".into()],
            selected: Some("center".into()),
        }
    );

    let select = |literal: &str| EditorEvent::SelectLiteral {
        path: path("textAlign"),
        literal: literal.into(),
    };
    assert!(matches!(store.handle(&comp, select("diagonal")), EventOutcome::Ignored(_)));
    assert_eq!(store.handle(&comp, select("left")), EventOutcome::Updated);

    let view = render(&mut store, &comp);
    let field = view.find(&path("textAlign")).unwrap();
    assert_eq!(field.status, FieldStatus::DirtyValid);
    assert!(!field.is_default);
}

#[test]
fn test_optional_toggle_seeds_valid_default() {
    let comp = composition(
        SchemaNode::object([("fontSize", SchemaNode::number().min(8.0).max(200.0).optional())]),
        &[],
    );
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    assert_eq!(
        view.find(&path("fontSize")).unwrap().widget,
        Widget::Nullish {
            sentinel: Sentinel::Undefined,
            absent: true,
            inner: None,
        }
    );

    let toggle = |absent| EditorEvent::SetNullish {
        path: path("fontSize"),
        absent,
    };
    assert_eq!(store.handle(&comp, toggle(false)), EventOutcome::Updated);
    let view = render(&mut store, &comp);
    let field = view.find(&path("fontSize")).unwrap();
    assert!(field.valid);
    assert_eq!(field.status, FieldStatus::DirtyValid);
    assert!(matches!(
        field.innermost().widget,
        Widget::Number { ref text, .. } if text == "8"
    ));
    assert!(matches!(store.handle(&comp, toggle(false)), EventOutcome::Ignored(_)));

    assert_eq!(store.handle(&comp, toggle(true)), EventOutcome::Updated);
    render(&mut store, &comp);
    assert!(!store.is_dirty());
}

#[test]
fn test_removing_invalid_item_restores_validity() {
    let comp = composition(
        SchemaNode::object([(
            "colors",
            SchemaNode::array(SchemaNode::color()).min_len(1).max_len(3),
        )]),
        &[("colors", vec!["#ffffff", "#000000"].into())],
    );
    let mut store = EditorStore::new();
    render(&mut store, &comp);

    edit(&mut store, &comp, "colors[1]", "oops");
    let view = render(&mut store, &comp);
    assert!(!view.valid);
    assert!(!view.find(&path("colors")).unwrap().valid);

    assert_eq!(
        store.handle(
            &comp,
            EditorEvent::RemoveItem {
                path: path("colors"),
                index: 1,
            },
        ),
        EventOutcome::Updated
    );
    let view = render(&mut store, &comp);
    assert!(view.valid);
    assert!(view.can_save);
    let colors = view.find(&path("colors")).unwrap();
    assert_eq!(colors.status, FieldStatus::DirtyValid);
    assert!(matches!(
        &colors.widget,
        Widget::Array { items, can_add: true, can_remove: false } if items.len() == 1
    ));
    assert_eq!(store.mounted_count("comp"), 3);

    assert!(matches!(
        store.handle(
            &comp,
            EditorEvent::RemoveItem {
                path: path("colors"),
                index: 0,
            },
        ),
        EventOutcome::Ignored(_)
    ));
}

#[test]
fn test_add_item_respects_max_length() {
    let comp = composition(
        SchemaNode::object([(
            "colors",
            SchemaNode::array(SchemaNode::color()).max_len(2),
        )]),
        &[("colors", vec!["#111111"].into())],
    );
    let mut store = EditorStore::new();
    render(&mut store, &comp);
    edit(&mut store, &comp, "colors[0]", "#222222");

    let add = || EditorEvent::AddItem { path: path("colors") };
    assert_eq!(store.handle(&comp, add()), EventOutcome::Updated);
    let view = render(&mut store, &comp);
    let colors = view.find(&path("colors")).unwrap();
    let Widget::Array { items, can_add, .. } = &colors.widget else {
        panic!("expected array widget");
    };
    assert!(!can_add);
    assert!(matches!(&items[0].widget, Widget::Color { text, .. } if text == "#222222"));
    assert!(matches!(&items[1].widget, Widget::Color { text, .. } if text == "#ffffff"));

    assert!(matches!(store.handle(&comp, add()), EventOutcome::Ignored(_)));
}

#[test]
fn test_union_follows_value_and_switches() {
    let size = SchemaNode::union(vec![
        SchemaNode::number().min(1.0).default(5),
        SchemaNode::enumeration(["auto", "fit"]),
    ])
    .unwrap();
    let comp = composition(SchemaNode::object([("size", size)]), &[("size", "auto".into())]);
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    let field = view.find(&path("size")).unwrap();
    assert!(matches!(&field.widget, Widget::Union { active: 1, .. }));

    let switch = |index| EditorEvent::SelectVariant {
        path: path("size"),
        index,
    };
    assert!(matches!(store.handle(&comp, switch(1)), EventOutcome::Ignored(_)));
    assert_eq!(store.handle(&comp, switch(0)), EventOutcome::Updated);

    let view = render(&mut store, &comp);
    let field = view.find(&path("size")).unwrap();
    assert!(matches!(&field.widget, Widget::Union { active: 0, .. }));
    assert!(matches!(&field.innermost().widget, Widget::Number { text, .. } if text == "5"));
}

#[test]
fn test_unsupported_field_blocks_save_but_not_render() {
    let comp = composition(
        SchemaNode::object([
            ("label", SchemaNode::string()),
            ("when", SchemaNode::unsupported("Date")),
        ]),
        &[("label", "x".into())],
    );
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    assert_eq!(
        view.find(&path("when")).unwrap().widget,
        Widget::Unsupported {
            type_name: "Date".into()
        }
    );
    assert!(!view.valid);
    assert_eq!(view.find(&path("when")).unwrap().status, FieldStatus::DirtyInvalid);
    assert_eq!(view.find(&path("label")).unwrap().status, FieldStatus::Clean);

    edit(&mut store, &comp, "label", "y");
    assert!(matches!(
        store.handle(&comp, EditorEvent::Save { path: EditPath::root() }),
        EventOutcome::Blocked(_)
    ));
    assert!(matches!(
        store.handle(&comp, EditorEvent::Save { path: path("label") }),
        EventOutcome::SaveRequested(_)
    ));
}

#[test]
fn test_root_notices() {
    let mut store = EditorStore::new();

    let scalar = composition(SchemaNode::number(), &[]);
    let view = store.render(&scalar);
    assert!(view.editor.is_none());
    assert_eq!(
        view.notice,
        Some(RootNotice::TopLevelNotObject {
            type_name: "number".into()
        })
    );

    let comp = speed_and_color();
    let mut props = PropertyBag::clone(&comp.props);
    props.insert("speed".into(), 40.into());
    let invalid = with_props(&comp, props);
    let view = store.render(&invalid);
    assert!(matches!(view.notice, Some(RootNotice::InvalidSavedProps { .. })));
    assert!(view.editor.is_some());
    assert!(store.is_dirty());
}

#[test]
fn test_stored_enum_outside_literals_is_dirty_invalid() {
    let comp = composition(
        SchemaNode::object([("align", SchemaNode::enumeration(["left", "right"]))]),
        &[("align", "diagonal".into())],
    );
    let mut store = EditorStore::new();
    let view = render(&mut store, &comp);
    let align = view.find(&path("align")).unwrap();
    assert_eq!(align.status, FieldStatus::DirtyInvalid);
    assert!(!align.valid);
    assert!(!align.can_save);
    assert!(store.is_dirty());

    assert_eq!(
        store.handle(
            &comp,
            EditorEvent::SelectLiteral {
                path: path("align"),
                literal: "right".into(),
            }
        ),
        EventOutcome::Updated
    );
    let view = render(&mut store, &comp);
    let align = view.find(&path("align")).unwrap();
    assert_eq!(align.status, FieldStatus::DirtyValid);
    assert!(align.can_save);
}

#[test]
fn test_typography_fields_render_as_one_group() {
    let comp = composition(simple_fade_schema(), &[("text", "Hi".into())]);
    let mut store = EditorStore::new();
    let Widget::Object { fields, groups } = render(&mut store, &comp).widget else {
        panic!("expected object widget");
    };
    assert_eq!(
        groups,
        vec![FieldGroup {
            label: "Typography".into(),
            keys: TYPOGRAPHY_KEYS.iter().map(|key| key.to_string()).collect(),
        }]
    );
    assert!(fields.iter().any(|field| field.path == path("fadeDuration")));

    let Widget::Object { groups, .. } = render(&mut EditorStore::new(), &speed_and_color()).widget else {
        panic!("expected object widget");
    };
    assert!(groups.is_empty());
}

#[test]
fn test_events_for_unknown_paths_are_ignored() {
    let comp = speed_and_color();
    let mut store = EditorStore::new();
    assert!(matches!(edit(&mut store, &comp, "speed", "3"), EventOutcome::Ignored(_)));

    render(&mut store, &comp);
    assert!(matches!(edit(&mut store, &comp, "nope", "3"), EventOutcome::Ignored(_)));
    assert!(matches!(
        store.handle(&comp, EditorEvent::AddItem { path: path("speed") }),
        EventOutcome::Ignored(_)
    ));
}
