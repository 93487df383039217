use anyhow::Result;
use pymlint::cli::explain::{describe, list_plugins, suggest};
use pymlint::cli::{Cli, Commands};
use pymlint::config::{Config, CONFIG_FILE_NAME};
use pymlint::engine::{self, scanner};
use pymlint::plugins::manager::RuleSelection;
use pymlint::rules;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn init_tracing(stack_trace: bool) {
    let default_level = if stack_trace { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("PYMLINT_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.stack_trace);

    match cli.command {
        Commands::Scan {
            paths,
            format,
            config,
            enable_rules,
            disable_rules,
            list_files,
        } => {
            let config_root = paths
                .iter()
                .find(|p| p.is_dir())
                .cloned()
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            // Listing files must not depend on a valid rule configuration.
            let cfg = if list_files {
                Config::load(config.as_deref(), &config_root).unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring configuration while listing files");
                    Config::default()
                })
            } else {
                Config::load(config.as_deref(), &config_root)?
            };

            let discovery = scanner::collect_files(&paths, &cfg);
            for notice in &discovery.skipped {
                eprintln!("{notice}");
            }

            if list_files {
                if discovery.files.is_empty() {
                    eprintln!("No Markdown files found.");
                    std::process::exit(1);
                }
                for file in &discovery.files {
                    println!("{}", file.display());
                }
                return Ok(());
            }

            let selection = RuleSelection::from_lists(&enable_rules, &disable_rules);
            let summary = engine::run(&discovery.files, &cfg, &selection)?;

            let output_format = format.unwrap_or(cfg.format);
            pymlint::cli::output::render(&summary, output_format, cli.stack_trace);

            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Commands::Plugins { id: None } => {
            let manager = rules::build_manager(&Config::default(), &RuleSelection::default())?;
            println!("{}", list_plugins(&manager));
        }
        Commands::Plugins { id: Some(id) } => {
            let manager = rules::build_manager(&Config::default(), &RuleSelection::default())?;
            match manager.find(&id) {
                Some(plugin) => println!("{}", describe(plugin)),
                None => {
                    eprintln!("Unknown rule: {id}");
                    if let Some(suggestion) = suggest(&manager, &id) {
                        eprintln!("Did you mean '{suggestion}'?");
                    }
                    eprintln!();
                    eprintln!("{}", list_plugins(&manager));
                    std::process::exit(1);
                }
            }
        }
        Commands::Init => {
            let path = std::env::current_dir()?.join(CONFIG_FILE_NAME);
            if path.exists() {
                eprintln!("{CONFIG_FILE_NAME} already exists");
                std::process::exit(1);
            }
            std::fs::write(&path, Config::default_toml())?;
            println!("Created {CONFIG_FILE_NAME}");
        }
    }

    Ok(())
}
