#![forbid(unsafe_code)]
//! paramgr command line interface

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use paramgr::commands::{
    execute_add, execute_export, execute_import, execute_init, execute_remove, execute_set,
    execute_show, AddOptions, ExportOptions, ImportOptions, InitOptions, RemoveOptions,
    SetOptions, ShowOptions, Target,
};
use paramgr::config::CONFIG_FILE;
use paramgr::{Config, ElementId};

#[derive(Parser)]
#[command(name = "paramgr")]
#[command(about = "Typed parameter editor - inspect, edit, import and export element parameters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Model file (overrides the config)
    #[arg(short, long, global = true, env = "PARAMGR_MODEL")]
    model: Option<PathBuf>,

    /// Element to edit (default: first selected element)
    #[arg(short, long, global = true)]
    element: Option<ElementId>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Skip interactive prompts (use defaults + CLI args)
        #[arg(short = 'y', long)]
        yes: bool,

        /// Shared parameter definition file
        #[arg(long)]
        definition_file: Option<PathBuf>,

        /// Definition group for new parameters
        #[arg(long)]
        definition_group: Option<String>,
    },

    /// List the element's parameters
    Show {
        /// Only show parameters whose name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Hide read-only parameters
        #[arg(long)]
        editable_only: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set parameter values (NAME=VALUE)
    Set {
        /// Assignments, e.g. Comments="Checked"
        #[arg(required = true)]
        assignments: Vec<String>,

        /// Also apply to elements of the same category and type
        #[arg(long)]
        similar: bool,
    },

    /// Export parameters to a workbook (.xlsx or .csv)
    Export {
        /// Output workbook
        output: PathBuf,

        /// Only export parameters whose name contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Skip read-only parameters
        #[arg(long)]
        editable_only: bool,
    },

    /// Import parameters from a workbook (.xlsx or .csv)
    Import {
        /// Input workbook
        input: PathBuf,
    },

    /// Create a shared parameter and bind it to the element's category
    Add {
        /// Parameter name
        name: String,

        /// Data type (e.g. Text, Length, Yes/No)
        #[arg(long, default_value = "Text")]
        spec: String,

        /// Discipline
        #[arg(long, default_value = "Common")]
        discipline: String,

        /// Group the parameter is listed under
        #[arg(long, default_value = "Other")]
        group: String,

        /// Instance or Type
        #[arg(long, default_value = "Instance")]
        scope: String,
    },

    /// Remove shared/project parameter bindings
    Remove {
        /// Parameters to remove
        #[arg(required = true)]
        names: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "paramgr=info" } else { "paramgr=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = if cli.config == Path::new(CONFIG_FILE) {
        Config::load_or_default()
    } else if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    if cli.verbose {
        eprintln!(
            "{} config: {}",
            style("→").dim(),
            if cli.config.exists() {
                cli.config.display().to_string()
            } else {
                "defaults".to_string()
            }
        );
    }

    let target = Target {
        model: cli.model.clone(),
        element: cli.element,
    };

    match cli.command {
        Commands::Init {
            force,
            yes,
            definition_file,
            definition_group,
        } => {
            let options = InitOptions {
                config_path: cli.config,
                force,
                yes,
                definition_file,
                definition_group,
                model: cli.model,
            };
            execute_init(options)?;
        }

        Commands::Show {
            search,
            editable_only,
            json,
        } => {
            let options = ShowOptions {
                target,
                search,
                editable_only,
                json,
            };
            execute_show(options, config)?;
        }

        Commands::Set {
            assignments,
            similar,
        } => {
            let options = SetOptions {
                target,
                assignments,
                similar,
            };
            execute_set(options, config)?;
        }

        Commands::Export {
            output,
            search,
            editable_only,
        } => {
            let options = ExportOptions {
                target,
                output,
                search,
                editable_only,
            };
            execute_export(options, config)?;
        }

        Commands::Import { input } => {
            execute_import(ImportOptions { target, input }, config)?;
        }

        Commands::Add {
            name,
            spec,
            discipline,
            group,
            scope,
        } => {
            let options = AddOptions {
                target,
                name,
                spec,
                discipline,
                group,
                scope,
            };
            execute_add(options, config)?;
        }

        Commands::Remove { names, yes } => {
            execute_remove(RemoveOptions { target, names, yes }, config)?;
        }
    }

    Ok(())
}
