use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use script_config::configs::BasicsConfig;
use script_config::db::ScriptDbRegistry;
use script_config::settings::{StoreSettings, load_settings_path};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Script configuration store CLI")]
struct Cli {
    /// Settings file (TOML). Falls back to SCRIPT_CONFIG_DATA_DIR.
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,
    /// Database directory; overrides the settings file.
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct Target {
    /// Script whose database to use.
    #[arg(long)]
    script: String,
}

#[derive(Subcommand)]
enum Cmd {
    /// Print every configuration as JSON.
    List(Target),
    /// Print one configuration as JSON.
    Show {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        id: String,
    },
    /// Insert a configuration from a JSON file.
    Import {
        #[command(flatten)]
        target: Target,
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        /// Update an existing configuration instead of inserting.
        #[arg(long)]
        replace: bool,
    },
    /// Delete a configuration and everything it owns.
    Delete {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        id: String,
    },
}

fn settings(cli: &Cli) -> Result<StoreSettings> {
    let mut s = match (&cli.settings, &cli.data_dir) {
        (Some(path), _) => load_settings_path(path)?,
        (None, Some(dir)) => StoreSettings::new(dir),
        (None, None) => StoreSettings::from_env()?,
    };
    if let Some(dir) = &cli.data_dir {
        s.data_dir = dir.clone();
    }
    Ok(s)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = ScriptDbRegistry::new(settings(&cli)?);

    match cli.cmd {
        Cmd::List(Target { script }) => {
            let all = registry.facade(&script)?.get_all()?;
            println!("{}", serde_json::to_string_pretty(&all)?);
        }
        Cmd::Show { target, id } => {
            let Some(cfg) = registry.facade(&target.script)?.get_by_id(&id)? else {
                bail!("no configuration with id {id}");
            };
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        Cmd::Import {
            target,
            file,
            replace,
        } => {
            let s = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let cfg = BasicsConfig::from_json(&s)?;
            cfg.validate()?;

            let facade = registry.facade(&target.script)?;
            if replace {
                if facade.update(&cfg)? == 0 {
                    bail!("no configuration with id {}", cfg.basic_id);
                }
            } else {
                facade.insert(&cfg)?;
            }
            println!("{}", cfg.basic_id);
        }
        Cmd::Delete { target, id } => {
            let n = registry.facade(&target.script)?.delete(&id)?;
            println!("{n}");
        }
    }

    registry.close_all();
    Ok(())
}
