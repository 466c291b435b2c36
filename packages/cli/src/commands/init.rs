use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use compedit_editor::ProjectFile;
use std::fs;
use std::path::PathBuf;

const EXAMPLE_PROJECT: &str = r##"{
  "compositions": [
    {
      "id": "intro",
      "name": "fadeInTransition",
      "props": { "text": "Hello World", "textColor": "#ffffff" },
      "duration": 90,
      "background": {
        "id": "intro-bg",
        "name": "multiColorGradientMesh",
        "props": { "speed": 12 },
        "duration": 90
      }
    }
  ]
}
"##;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project file to create
    #[arg(short, long, default_value = "project.json")]
    pub project_file: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing compedit project...".bright_blue().bold());

    let config = Config {
        project_file: args.project_file.clone(),
        ..Config::default()
    };

    // Create example project file
    let project_path = config.get_project_path(cwd);
    if !project_path.exists() {
        if let Some(parent) = project_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Parse before writing so the example always loads
        ProjectFile::from_json(EXAMPLE_PROJECT)?.save(&project_path)?;
        println!("  {} Created {}", "✓".green(), args.project_file);
    }

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: compedit inspect intro");
    println!("  2. Run: compedit edit intro --set text=\"Hi there\"");
    println!("  3. Run: compedit validate");

    Ok(())
}
