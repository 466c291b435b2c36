use crate::project::load_project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use compedit_editor::audit;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Only print failures
    #[arg(short, long)]
    pub quiet: bool,
}

/// Check every composition's stored props against its schema.
pub fn validate(args: ValidateArgs, cwd: &str) -> Result<()> {
    let project = load_project(cwd)?;
    let problems = audit(&project.compositions);

    if !args.quiet {
        println!(
            "{}",
            format!("🔍 Checking {}...", project.path.display()).bright_blue().bold()
        );
    }

    for problem in &problems {
        eprintln!("  {} {}", "✗".red(), problem.to_string().red());
    }

    let total: usize = project
        .compositions
        .iter()
        .map(|comp| 1 + usize::from(comp.background.is_some()))
        .sum();

    if problems.is_empty() {
        if !args.quiet {
            println!("{} {} composition(s) valid", "✅".green(), total);
        }
        Ok(())
    } else {
        Err(anyhow!("{} of {} composition(s) have invalid props", problems.len(), total))
    }
}
