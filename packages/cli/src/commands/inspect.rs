use crate::project::load_project;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use compedit_editor::{
    audit, EditSession, FieldGroup, FieldStatus, FieldView, HydrateError, RootNotice, RootView, SessionView, Widget,
};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Composition to show editors for (lists all compositions when omitted)
    pub id: Option<String>,

    /// Print the editor view as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &str) -> Result<()> {
    let project = load_project(cwd)?;

    let Some(id) = args.id else {
        let problems = audit(&project.compositions);
        for comp in &project.compositions {
            println!(
                "{} {} ({} frames){}",
                comp.id.bright_white().bold(),
                comp.component.cyan(),
                comp.duration,
                invalid_marker(&problems, &comp.id)
            );
            if let Some(bg) = &comp.background {
                println!(
                    "  └ {} {}{}",
                    bg.id.bright_white(),
                    bg.component.cyan(),
                    invalid_marker(&problems, &bg.id)
                );
            }
        }
        return Ok(());
    };

    let mut session = EditSession::new("cli", project.compositions);
    session.select(&id)?;
    let view = session.render()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_session(&view);
    }
    Ok(())
}

fn invalid_marker(problems: &[HydrateError], id: &str) -> String {
    let invalid = problems
        .iter()
        .any(|problem| matches!(problem, HydrateError::InvalidProps { id: bad, .. } if bad == id));
    if invalid {
        format!(" {}", "✗ invalid props".red())
    } else {
        String::new()
    }
}

pub(crate) fn print_session(view: &SessionView) {
    print_root(&view.foreground);
    if let Some(background) = &view.background {
        println!();
        print_root(background);
    }
}

fn print_root(root: &RootView) {
    println!(
        "{} {}",
        root.comp_id.bright_white().bold(),
        root.component.cyan()
    );
    match &root.notice {
        Some(RootNotice::TopLevelNotObject { type_name }) => {
            println!("  {} top-level value is `{}`, not an object", "⚠️".yellow(), type_name);
        }
        Some(RootNotice::InvalidSavedProps { message }) => {
            println!("  {} saved props are invalid: {}", "⚠️".yellow(), message);
        }
        None => {}
    }
    if let Some(editor) = &root.editor {
        for child in editor.children() {
            print_field(child, 1);
        }
    }
}

fn print_field(view: &FieldView, depth: usize) {
    let indent = "  ".repeat(depth);
    let marker = match view.status {
        FieldStatus::Clean => " ".normal(),
        FieldStatus::DirtyValid => "●".yellow(),
        FieldStatus::DirtyInvalid => "●".red(),
    };
    println!("{}{} {}: {}", indent, marker, view.label.bright_white(), summary(&view.widget));
    if let Some(error) = &view.error {
        println!("{}    {}", indent, error.red());
    }

    match &view.widget {
        Widget::Nullish { inner: Some(inner), .. } | Widget::Union { inner, .. } => {
            for child in inner.children() {
                print_field(child, depth + 1);
            }
        }
        Widget::Object { fields, groups } => {
            for group in groups {
                println!("{}  {}", indent, group.label.bold());
                for child in fields.iter().filter(|child| in_group(group, child)) {
                    print_field(child, depth + 2);
                }
            }
            let grouped = |child: &&FieldView| groups.iter().any(|group| in_group(group, child));
            for child in fields.iter().filter(|child| !grouped(child)) {
                print_field(child, depth + 1);
            }
        }
        Widget::Array { .. } => {
            for child in view.children() {
                print_field(child, depth + 1);
            }
        }
        _ => {}
    }
}

fn in_group(group: &FieldGroup, field: &FieldView) -> bool {
    group.keys.iter().any(|key| field.path.label() == *key)
}

fn summary(widget: &Widget) -> String {
    match widget {
        Widget::Text { value } => format!("{:?}", value),
        Widget::Number { text, min, max, .. } => {
            let mut out = text.clone();
            if let Some(min) = min {
                out.push_str(&format!(" (min {})", min));
            }
            if let Some(max) = max {
                out.push_str(&format!(" (max {})", max));
            }
            out
        }
        Widget::Checkbox { checked } => checked.to_string(),
        Widget::Color {
            text, opacity_percent, ..
        } => match opacity_percent {
            Some(percent) => format!("{} ({}%)", text, percent),
            None => text.clone(),
        },
        Widget::Select { options, selected } => format!(
            "{} [{}]",
            selected.as_deref().unwrap_or("-"),
            options.join(" | ")
        ),
        Widget::Nullish { absent: true, sentinel, .. } => format!("{:?}", sentinel).to_lowercase().dimmed().to_string(),
        Widget::Nullish { inner: Some(inner), .. } => summary(&inner.widget),
        Widget::Nullish { .. } => String::new(),
        Widget::Object { fields, .. } => format!("{{{} fields}}", fields.len()),
        Widget::Array { items, .. } => format!("[{} items]", items.len()),
        Widget::Union { variants, active, inner } => format!(
            "<{}> {}",
            variants.get(*active).map(String::as_str).unwrap_or("?"),
            summary(&inner.widget)
        ),
        Widget::Unsupported { type_name } => format!("unsupported `{}`", type_name).dimmed().to_string(),
    }
}
