use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use rowtile::actor::mouse::Mouse;
use rowtile::actor::overlay::{LogSurface, Overlay};
use rowtile::actor::reactor::simulate::simulate_on;
use rowtile::actor::reactor::{Command, Record};
use rowtile::common::config::{Config, config_file};
use rowtile::common::log;
use rowtile::sys::headless::scene::Scene;
use strum::IntoEnumIterator;
use tracing::warn;

#[derive(Parser)]
struct Cli {
    /// Disable animations.
    #[arg(long)]
    no_animate: bool,

    /// Check whether the config file is valid and exit.
    #[arg(long)]
    validate: bool,

    /// Record reactor events to the specified file path. Overwrites the file if
    /// exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a RON scene against the in-memory window system and print the
    /// resulting rows as JSON.
    Simulate {
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
    },
    /// List the names of the commands that can be bound to keys.
    ListCommands,
}

fn main() {
    sigpipe::reset();
    let opt = Cli::parse();

    if let Some(Commands::ListCommands) = &opt.command {
        for command in Command::iter() {
            println!("{command}");
        }
        return;
    }

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let mut config = if config_path.exists() {
        match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e:#}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };
    config.settings.animate &= !opt.no_animate;

    let issues = config.validate();
    if opt.validate {
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{}", issue);
            }
            process::exit(1);
        }
        return;
    }
    for issue in &issues {
        warn!("Config issue: {issue}");
    }

    match &opt.command {
        Some(Commands::Simulate { scene }) => {
            if let Err(e) = simulate(config, scene, opt.record.as_deref()) {
                eprintln!("{e:#}");
                process::exit(1);
            }
        }
        Some(Commands::ListCommands) => {}
        None => {
            eprintln!(
                "rowtile has no window system backend in this build. \
Run a scene with `rowtile simulate SCENE` instead."
            );
            process::exit(2);
        }
    }
}

fn simulate(config: Config, path: &Path, record: Option<&Path>) -> anyhow::Result<()> {
    let scene = Scene::load(path)?;
    let host = scene.build()?;
    let mouse = Mouse::new(
        &config.settings.cursor,
        config.settings.animate,
        Box::new(host.pointer_device()),
    );
    let mouse_tx = Mouse::spawn(mouse);
    let overlay_tx = Overlay::spawn(Overlay::new(Box::new(LogSurface)));
    let record = Record::new(record)?;

    let rows = simulate_on(&host, config, &scene, record, Some(mouse_tx), Some(overlay_tx))?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of leaving the actor threads running.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
