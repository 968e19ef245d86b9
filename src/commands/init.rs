//! @acp:module "Init Command"
//! @acp:summary "Write a paramgr config file"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `paramgr init`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::config::{Config, CONFIG_FILE};

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Config file to write
    pub config_path: PathBuf,
    /// Force overwrite existing config
    pub force: bool,
    /// Skip interactive prompts
    pub yes: bool,
    /// Shared parameter definition file
    pub definition_file: Option<PathBuf>,
    /// Definition group for new parameters
    pub definition_group: Option<String>,
    /// Default model file
    pub model: Option<PathBuf>,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from(CONFIG_FILE),
            force: false,
            yes: false,
            definition_file: None,
            definition_group: None,
            model: None,
        }
    }
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    if options.config_path.exists() && !options.force {
        eprintln!(
            "{} Config file already exists. Use --force to overwrite.",
            style("✗").red()
        );
        std::process::exit(1);
    }

    let mut config = Config::default();
    apply_cli_options(&mut config, &options);

    let interactive = !options.yes
        && options.definition_file.is_none()
        && options.definition_group.is_none()
        && options.model.is_none();
    if interactive {
        run_interactive_init(&mut config)?;
    }

    config.save(&options.config_path)?;
    println!(
        "{} Created {}",
        style("✓").green(),
        options.config_path.display()
    );

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to list an element's parameters",
        style("paramgr show").cyan()
    );
    println!(
        "  2. Run {} to write them to a workbook",
        style("paramgr export params.xlsx").cyan()
    );
    Ok(())
}

fn apply_cli_options(config: &mut Config, options: &InitOptions) {
    if let Some(path) = &options.definition_file {
        config.definition_file = path.clone();
    }
    if let Some(group) = &options.definition_group {
        config.definition_group = group.clone();
    }
    if let Some(model) = &options.model {
        config.model = model.clone();
    }
}

fn run_interactive_init(config: &mut Config) -> Result<()> {
    println!("{} paramgr setup\n", style("→").cyan());
    let theme = ColorfulTheme::default();

    let model: String = Input::with_theme(&theme)
        .with_prompt("Model file")
        .default(config.model.display().to_string())
        .interact_text()?;
    config.model = PathBuf::from(model);

    let definition_file: String = Input::with_theme(&theme)
        .with_prompt("Shared parameter file")
        .default(config.definition_file.display().to_string())
        .interact_text()?;
    config.definition_file = PathBuf::from(definition_file);

    config.definition_group = Input::with_theme(&theme)
        .with_prompt("Definition group for new parameters")
        .default(config.definition_group.clone())
        .interact_text()?;

    config.create_definition_file = Confirm::with_theme(&theme)
        .with_prompt("Create the shared parameter file if it is missing?")
        .default(config.create_definition_file)
        .interact()?;

    println!();
    Ok(())
}
