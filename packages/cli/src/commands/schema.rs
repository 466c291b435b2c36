use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use compedit_schema::catalog::builtin_registry;
use compedit_schema::wire::RawSchema;
use compedit_schema::{describe, generation_context, ComponentBinding, SchemaNode};

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Component to show (lists every component when omitted)
    pub name: Option<String>,

    /// Print the schema in its JSON wire form
    #[arg(long)]
    pub json: bool,

    /// Drop blacklisted fields, as handed to prop generation
    #[arg(short, long)]
    pub generation: bool,

    /// Print the generation prompt context for every animation
    #[arg(long, conflicts_with = "name")]
    pub context: bool,
}

pub fn schema(args: SchemaArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let registry = builtin_registry()?;
    let view = |binding: &ComponentBinding| -> SchemaNode {
        if args.generation {
            config.schema_blacklist.prune(&binding.name, &binding.schema)
        } else {
            binding.schema.as_ref().clone()
        }
    };

    if args.context {
        let bindings: Vec<ComponentBinding> = registry
            .animations()
            .iter()
            .map(|binding| ComponentBinding::new(binding.name.clone(), binding.usecase.clone(), view(binding)))
            .collect();
        print!("{}", generation_context(&bindings));
        return Ok(());
    }

    let Some(name) = args.name.as_deref() else {
        for (title, bindings) in [("Animations", registry.animations()), ("Backgrounds", registry.backgrounds())] {
            println!("{}", title.bright_blue().bold());
            for binding in bindings {
                println!("  {} {}", binding.name.bright_white(), describe(&view(binding)).dimmed());
            }
            println!();
        }
        return Ok(());
    };

    let binding = registry
        .get(name)
        .ok_or_else(|| anyhow!("Unknown component: {}", name))?;
    let schema = view(binding);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&RawSchema::from(schema))?);
    } else {
        println!("{}", binding.name.bright_white().bold());
        println!("  {}", binding.usecase.dimmed());
        println!("  {}", describe(&schema));
    }
    Ok(())
}
