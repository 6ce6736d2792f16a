use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};

use disksize::commands::{self, resize::ResizeOptions};
use disksize::config::{self, AppConfig, DisksizeConfig};
use disksize::notify::LogNotifier;

#[derive(Parser)]
#[command(name = "disksize")]
#[command(about = "Grow VirtualBox machine disks before boot", long_about = None)]
struct Cli {
    /// Path to VBoxManage (defaults to the installer location or PATH)
    #[arg(long, global = true, value_name = "PATH")]
    vboxmanage: Option<PathBuf>,

    /// Assume this VirtualBox version instead of asking VBoxManage
    #[arg(long, global = true, value_name = "X.Y")]
    vbox_version: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grow the machine's first disk, converting it to VDI if needed
    Resize {
        /// Machine name or UUID
        #[arg(value_name = "VM")]
        machine: Option<String>,

        /// Requested size (bytes or with KB/MB/GB/TB suffix)
        #[arg(short, long, value_name = "SIZE")]
        size: Option<String>,

        /// Provider managing the machine
        #[arg(long, value_name = "NAME")]
        provider: Option<String>,

        /// Boot the machine afterwards, even if resizing failed
        #[arg(long)]
        start: bool,

        /// Boot without a window
        #[arg(long, requires = "start")]
        headless: bool,
    },

    /// List hard disks attached to a machine
    Disks {
        #[arg(value_name = "VM")]
        machine: Option<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show the disk a resize would act on
    Info {
        #[arg(value_name = "VM")]
        machine: Option<String>,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Generate configuration file (.disksize.toml) in current directory
    Genconfig {
        /// Force overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logger, default info level, display file line number and time
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            let level_style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "[{} {level_style}{}{level_style:#} {}:{}] {level_style}{}{level_style:#}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();

    let app_config = match AppConfig::load_optional(config::CONFIG_FILE) {
        Ok(Some(cfg)) => {
            let abs_path = std::fs::canonicalize(config::CONFIG_FILE)
                .unwrap_or_else(|_| PathBuf::from(config::CONFIG_FILE));
            info!("Using configuration file: {}", abs_path.display());
            cfg
        }
        Ok(None) => AppConfig::default(),
        Err(e) => {
            error!("Failed to load configuration file: {}, using defaults", e);
            AppConfig::default()
        }
    };

    let vbox_config = app_config
        .vboxmanage
        .clone()
        .unwrap_or_default()
        .merge_cli(cli.vboxmanage, cli.vbox_version);

    match cli.command {
        Commands::Resize {
            machine,
            size,
            provider,
            start,
            headless,
        } => {
            let machine = machine_name(machine, &app_config)?;
            let disksize = match size {
                Some(size) => DisksizeConfig::with_size(size),
                None => app_config.disksize.clone().unwrap_or_default(),
            };

            let errors = disksize.validate();
            if !errors.is_empty() {
                bail!("{}: {}", config::VALIDATION_SECTION, errors.join("; "));
            }

            let provider = provider
                .or_else(|| app_config.machine.as_ref().and_then(|m| m.provider.clone()))
                .unwrap_or_else(|| config::DEFAULT_PROVIDER.to_string());

            if !commands::resize::check_provider(&provider, &LogNotifier) {
                return Ok(());
            }

            let (vbox, version) = commands::connect(&vbox_config)?;
            let options = ResizeOptions {
                machine,
                requested_mb: disksize.finalize()?,
                start,
                headless,
            };
            commands::resize::run(&vbox, version, &options, &LogNotifier)?;
        }

        Commands::Disks { machine, json } => {
            let machine = machine_name(machine, &app_config)?;
            let (vbox, _) = commands::connect(&vbox_config)?;
            commands::disks::disks(&vbox, &machine, json)?;
        }

        Commands::Info { machine, json } => {
            let machine = machine_name(machine, &app_config)?;
            let (vbox, version) = commands::connect(&vbox_config)?;
            commands::info::info(&vbox, &machine, version, json)?;
        }

        Commands::Genconfig { force } => {
            if let Err(e) = AppConfig::generate_config_file(Path::new(config::CONFIG_FILE), force) {
                error!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn machine_name(cli: Option<String>, config: &AppConfig) -> Result<String> {
    cli.or_else(|| config.machine.as_ref().and_then(|m| m.name.clone()))
        .ok_or_else(|| {
            anyhow::anyhow!("Machine not specified. Use argument or set machine.name in config file.")
        })
}
