use super::inspect::print_session;
use crate::project::load_project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use compedit_common::{EditPath, PropValue};
use compedit_editor::{
    dehydrate, EditSession, EditorEvent, EventOutcome, Notification, ProjectFile, TreeLevel, Widget,
};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Composition to edit
    pub id: String,

    /// Edit the composition's background instead
    #[arg(short, long)]
    pub background: bool,

    /// Set a field from text, e.g. `speed=9` or `colors[1]=#ff0000`
    #[arg(short, long = "set", value_name = "PATH=VALUE")]
    pub set: Vec<String>,

    /// Set a color field's opacity in percent, e.g. `textColor=50`
    #[arg(long, value_name = "PATH=PERCENT")]
    pub opacity: Vec<String>,

    /// Clear an optional or nullable field
    #[arg(long, value_name = "PATH")]
    pub unset: Vec<String>,

    /// Give a cleared optional or nullable field its default
    #[arg(long, value_name = "PATH")]
    pub enable: Vec<String>,

    /// Append a default item to an array field
    #[arg(long, value_name = "PATH")]
    pub add_item: Vec<String>,

    /// Remove an item from an array field, e.g. `colors=2`
    #[arg(long, value_name = "PATH=INDEX")]
    pub remove_item: Vec<String>,

    /// Switch a union field to another variant, e.g. `fill=1`
    #[arg(long, value_name = "PATH=INDEX")]
    pub variant: Vec<String>,

    /// Apply the edits without writing the project file
    #[arg(long)]
    pub dry_run: bool,

    /// Write the project to another file
    #[arg(short, long)]
    pub out: Option<String>,
}

pub fn edit(args: EditArgs, cwd: &str) -> Result<()> {
    let project = load_project(cwd)?;
    let level = if args.background {
        TreeLevel::Background
    } else {
        TreeLevel::Foreground
    };

    let mut session = EditSession::new("cli", project.compositions).with_undo_levels(project.config.undo_levels);
    session.select(&args.id)?;
    session.render()?;

    // Shape changes first so later `--set` paths can address new items
    for entry in &args.variant {
        let (path, index) = parse_assignment(entry)?;
        let index = parse_index(&index)?;
        apply(&mut session, level, EditorEvent::SelectVariant { path, index })?;
    }
    for entry in &args.enable {
        let path: EditPath = entry.parse()?;
        apply(&mut session, level, EditorEvent::SetNullish { path, absent: false })?;
    }
    for entry in &args.unset {
        let path: EditPath = entry.parse()?;
        apply(&mut session, level, EditorEvent::SetNullish { path, absent: true })?;
    }
    for entry in &args.remove_item {
        let (path, index) = parse_assignment(entry)?;
        let index = parse_index(&index)?;
        apply(&mut session, level, EditorEvent::RemoveItem { path, index })?;
    }
    for entry in &args.add_item {
        let path: EditPath = entry.parse()?;
        apply(&mut session, level, EditorEvent::AddItem { path })?;
    }
    for entry in &args.set {
        let (path, text) = parse_assignment(entry)?;
        let event = set_event(&mut session, level, path, text)?;
        apply(&mut session, level, event)?;
    }
    for entry in &args.opacity {
        let (path, percent) = parse_assignment(entry)?;
        let percent: f64 = percent
            .parse()
            .map_err(|_| anyhow!("Invalid opacity `{}`", percent))?;
        apply(&mut session, level, EditorEvent::SetOpacity { path, percent })?;
    }

    match session.handle(level, EditorEvent::Save { path: EditPath::root() })? {
        EventOutcome::SaveRequested(requests) => {
            for request in &requests {
                println!("  {} {}", "✓".green(), request.path);
            }
        }
        EventOutcome::Blocked(reason) => {
            print_session(&session.render()?);
            return Err(anyhow!("Cannot save: {}", reason));
        }
        EventOutcome::Ignored(_) | EventOutcome::Updated => {
            println!("{}", "Nothing to save".dimmed());
            return Ok(());
        }
    }

    let committed = session.confirm_all();
    tracing::info!(committed, "edits committed");
    for notification in session.take_notifications() {
        match notification {
            Notification::SaveFailed { path, message, .. } => {
                println!("  {} {}: {}", "✗".red(), path, message);
            }
            Notification::SaveDropped { comp_id, path } => {
                println!("  {} {} ({} is gone)", "✗".red(), path, comp_id);
            }
        }
    }
    println!();
    print_session(&session.render()?);

    if args.dry_run {
        println!();
        println!("{}", "(dry run, project file not written)".dimmed());
        return Ok(());
    }

    let out = match &args.out {
        Some(out) => PathBuf::from(cwd).join(out),
        None => project.path,
    };
    let file = ProjectFile {
        compositions: dehydrate(session.compositions()),
    };
    file.save(&out)?;
    println!();
    println!("{} Saved {} prop(s) to {}", "✅".green(), committed, out.display());
    Ok(())
}

fn apply(session: &mut EditSession, level: TreeLevel, event: EditorEvent) -> Result<()> {
    let path = event.path().clone();
    match session.handle(level, event)? {
        EventOutcome::Updated => {
            // Remount so fields created by this edit can be addressed
            session.render_level(level)?;
            Ok(())
        }
        EventOutcome::Ignored(reason) | EventOutcome::Blocked(reason) => {
            Err(anyhow!("Cannot edit `{}`: {}", path, reason))
        }
        EventOutcome::SaveRequested(_) => Ok(()),
    }
}

/// Pick the event for a textual value from the widget the field renders as.
fn set_event(session: &mut EditSession, level: TreeLevel, path: EditPath, text: String) -> Result<EditorEvent> {
    let root = session.render_level(level)?;
    let view = root
        .editor
        .as_ref()
        .and_then(|editor| editor.find(&path))
        .ok_or_else(|| anyhow!("No field at `{}`", path))?;

    match &view.innermost().widget {
        Widget::Select { .. } => Ok(EditorEvent::SelectLiteral { path, literal: text }),
        Widget::Checkbox { .. } => {
            let checked: bool = text
                .parse()
                .map_err(|_| anyhow!("`{}` expects true or false, got `{}`", path, text))?;
            Ok(EditorEvent::Edit {
                path,
                raw: PropValue::Bool(checked),
            })
        }
        Widget::Text { .. } | Widget::Number { .. } | Widget::Color { .. } => Ok(EditorEvent::Edit {
            path,
            raw: PropValue::String(text),
        }),
        _ => Err(anyhow!("`{}` is not a value field", path)),
    }
}

fn parse_assignment(entry: &str) -> Result<(EditPath, String)> {
    let (path, value) = entry
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected PATH=VALUE, got `{}`", entry))?;
    Ok((path.trim().parse()?, value.to_string()))
}

fn parse_index(text: &str) -> Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| anyhow!("Invalid index `{}`", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let (path, value) = parse_assignment("colors[1]=#ff0000").unwrap();
        assert_eq!(path, "colors[1]".parse::<EditPath>().unwrap());
        assert_eq!(value, "#ff0000");

        let (path, value) = parse_assignment("text=a=b").unwrap();
        assert_eq!(path, EditPath::key("text"));
        assert_eq!(value, "a=b");

        assert!(parse_assignment("speed").is_err());
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index(" 2").unwrap(), 2);
        assert!(parse_index("-1").is_err());
    }
}
