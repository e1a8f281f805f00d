use aov_compositor::cli::Args;
use aov_compositor::config::{self, PathConfig, Settings};
use aov_compositor::core::{BuildOutcome, MemoryGraph, NetworkBuilder, export};
use aov_compositor::entities::{AovTable, WorkingSet};
use aov_compositor::utils::media;
use aov_compositor::InputMode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

fn init_logger(args: &Args, path_config: &PathConfig) -> Result<()> {
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        // File logging: at least debug, more with -vvv
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, path_config));

        if let Some(dir) = log_path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            }
        }
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        env_logger::Builder::new()
            .filter_level(log_level.max(log::LevelFilter::Debug))
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {}", log_path.display());
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .format_timestamp_millis()
            .init();
    }

    Ok(())
}

fn print_table(table: &AovTable, set: &WorkingSet) {
    if table.is_empty() {
        println!("(no AOVs configured for this render engine)");
        return;
    }
    for (key, suffix) in set.iter() {
        let name = table
            .descriptor(key)
            .map(|d| d.display_name)
            .unwrap_or_default();
        println!("{:<20} {:<20} {}", key, name, suffix);
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    init_logger(&args, &path_config)?;
    debug!("Command-line args: {:?}", args);

    let settings_path = config::config_file(config::SETTINGS_FILE, &path_config);
    let mut settings = Settings::load(&settings_path)?;
    info!("Settings: {}", settings_path.display());

    let engine = args.engine.unwrap_or(settings.engine);
    let level = args.level.unwrap_or(settings.level);
    let mode = args.mode.unwrap_or(settings.mode);
    for (key, suffix) in &args.suffixes {
        settings.set_override(engine, key.clone(), suffix.clone());
    }

    let table = AovTable::builtin(engine);
    let working_set = WorkingSet::from_table(&table, level, &settings.overrides(engine))?;
    info!("{} {}: {} AOVs", engine, level, working_set.len());

    if args.list {
        print_table(&table, &working_set);
        return Ok(());
    }

    if let Some(file) = &args.file_path {
        if !media::is_image(file) {
            warn!("{} does not look like an image file", file.display());
        }
    }

    let mut graph = MemoryGraph::new().with_prompt_answer(args.file_path.clone());
    if mode == InputMode::Single && args.select {
        if let Some(file) = &args.file_path {
            graph.add_read(file, 0.0, 0.0, true);
        }
    }

    let mut builder = NetworkBuilder::new().with_extensions(settings.extensions.clone());
    builder.set_working_set(working_set);

    let outcome = builder.create_network(&mut graph, engine, level, mode, args.file_path.as_deref())?;
    match &outcome {
        BuildOutcome::Built(network) => {
            info!(
                "Built {} AOV columns, {} merges ({} nodes total)",
                network.columns.len(),
                network.merges.len(),
                graph.len()
            );
            match &args.output {
                Some(path) => export::write(&graph, path, args.format)?,
                None => println!("{}", export::render(&graph, args.format)?),
            }
        }
        BuildOutcome::NoMatches => eprintln!("No AOVs of the working set found; nothing created"),
        BuildOutcome::Cancelled => eprintln!("No file given; nothing created"),
        BuildOutcome::NotSupported { engine, level, mode } => {
            eprintln!("{} {} from {} file(s) is not supported yet", engine, level, mode)
        }
    }

    if args.save_settings {
        settings.engine = engine;
        settings.level = level;
        settings.mode = mode;
        settings.save(&settings_path)?;
        info!("Saved settings to {}", settings_path.display());
    }

    Ok(())
}
