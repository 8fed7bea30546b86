use clap::Parser;
use std::path::PathBuf;

use crate::model::DEFAULT_MODEL_PATH;

#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Photos to analyse (jpg, jpeg, png) or directories containing them
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    #[arg(short, long, default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Where certified images are written
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,

    /// Only print the classification, do not write certified images
    #[arg(long, default_value_t = false)]
    pub no_certificate: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn", value_parser = check_log_level)]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::parse()
    }
}

fn check_log_level(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(s.to_lowercase()),
        _ => Err(format!(
            "{s} is not a log level. Expected one of `trace`, `debug`, `info`, `warn`, `error`, `off`"
        )),
    }
}
