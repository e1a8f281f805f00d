use clap::Parser;
use std::path::PathBuf;

use crate::core::{ExportFormat, InputMode};
use crate::entities::{Level, RenderEngine};

// Build version with backend info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "EXR:    exrs header reader (pure Rust)\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Build a Read -> Shuffle -> additive Merge network for a render's AOVs
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Multi-layer EXR (single mode) or any one of the per-AOV files (multi mode)
    #[arg(value_name = "FILE")]
    pub file_path: Option<PathBuf>,

    /// Render engine: arnold, vray, redshift (default: last used)
    #[arg(short = 'e', long = "engine", value_name = "ENGINE")]
    pub engine: Option<RenderEngine>,

    /// Compositing operation level: standard, advanced (default: last used)
    #[arg(long = "level", value_name = "LEVEL")]
    pub level: Option<Level>,

    /// Input mode: single (one multi-layer file) or multi (one file per AOV)
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<InputMode>,

    /// Override an AOV suffix (can be specified multiple times)
    #[arg(short = 's', long = "suffix", value_name = "KEY=SUFFIX", value_parser = parse_suffix)]
    pub suffixes: Vec<(String, String)>,

    /// Single mode: treat FILE as an already selected Read node
    #[arg(long = "select")]
    pub select: bool,

    /// Print the AOVs of the chosen engine/level and exit
    #[arg(long = "list")]
    pub list: bool,

    /// Output format of the generated graph
    #[arg(short = 'f', long = "format", value_enum, default_value = "json")]
    pub format: ExportFormat,

    /// Write the graph to a file instead of stdout
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Remember engine, level, mode and suffix overrides for next runs
    #[arg(long = "save-settings")]
    pub save_settings: bool,

    /// Enable debug logging to file (default: aov_compositor.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

/// Parse `key=suffix`
pub fn parse_suffix(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, suffix)) if !key.trim().is_empty() && !suffix.trim().is_empty() => {
            Ok((key.trim().to_string(), suffix.trim().to_string()))
        }
        _ => Err(format!("expected KEY=SUFFIX, got '{}'", s)),
    }
}
