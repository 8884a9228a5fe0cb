//! Configuration loading from a plain `key=value` file.

use crate::{Result, TkvsError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_PORT: u16 = 1234;
const DEFAULT_THREAD_COUNT: u32 = 4;
const DEFAULT_PERSISTENCE_FILE: &str = "server.config";
const DEFAULT_DUMP_PERIOD_SECS: u64 = 10;

/// Runtime settings loaded from a plain `key=value` file.
///
/// One pair per line. Blank lines and lines starting with `#` are skipped,
/// unrecognized keys are ignored, and a line without a `=` is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port the server listens on
    pub port: u16,
    /// number of worker threads servicing connections
    pub thread_count: u32,
    /// path the periodic snapshot is written to and restored from
    pub persistence_file: PathBuf,
    /// seconds between snapshot dumps
    pub dump_period_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            thread_count: DEFAULT_THREAD_COUNT,
            persistence_file: PathBuf::from(DEFAULT_PERSISTENCE_FILE),
            dump_period_secs: DEFAULT_DUMP_PERIOD_SECS,
        }
    }
}

impl Config {
    /// reads and parses the config file at `path`
    ///
    /// # Errors
    /// returns [`TkvsError::Io`] if the file could not be read, and
    /// [`TkvsError::Config`] for a line that is not `key=value` or holds an
    /// unparseable number
    pub fn load(path: &Path) -> Result<Config> {
        let contents = fs::read_to_string(path)?;
        let config = Self::from_str_contents(&contents)?;
        debug!(?config, "loaded configuration from {:?}", path);
        Ok(config)
    }

    fn from_str_contents(contents: &str) -> Result<Config> {
        let mut config = Config::default();
        for line in contents.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| TkvsError::Config(line.to_string()))?;
            match key {
                "port" => config.port = parse_number(line, value)?,
                "thread_count" => config.thread_count = parse_number(line, value)?,
                "persistence_file" => config.persistence_file = PathBuf::from(value),
                "dump_period" => config.dump_period_secs = parse_number(line, value)?,
                _ => {}
            }
        }
        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(line: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| TkvsError::Config(line.to_string()))
}
