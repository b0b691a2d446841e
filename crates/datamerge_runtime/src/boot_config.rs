//! Boot Configuration
//!
//! Decides what one `datamerge` run works on: the document to edit, where the
//! records come from, where the result goes, and how copies are laid out.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: `--records rows.csv --gap 40`
//! 2. Environment variables: `DATAMERGE_RECORDS=rows.csv`
//! 3. Config file: `--config <path>`, else `datamerge.toml` or `.datamerge/datamerge.toml`
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [input]
//! document = "cards.json"
//! sheet_url = "https://docs.google.com/spreadsheets/d/<id>/edit#gid=0"
//! roots = ["Card"]          # node ids or names; empty uses the saved selection
//!
//! [merge]
//! space_between_items = true
//! gap = 20.0
//! max_concurrent_updates = 16
//!
//! [network]
//! proxy = "http://localhost:8080/"  # prefixed to every fetched URL
//! csv_export = false
//! state_path = ".datamerge/state.json"
//! ```

use datamerge_kernel::MergeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config files tried when none is named
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["datamerge.toml", ".datamerge/datamerge.toml"];

/// Where the last sheet link is remembered
const DEFAULT_STATE_PATH: &str = ".datamerge/state.json";

pub const USAGE: &str = "\
Usage: datamerge --document <file> [options]

Options:
  --document <file>    document JSON to merge into
  --records <file>     records as JSON, CSV or a saved sheet response
  --sheet-url <url>    Google Sheets link to fetch records from
  --output <file>      where to write the result (default: overwrite --document)
  --root <id|name>     node to copy; repeat for several (default: saved selection)
  --no-spacing         leave copies where they are cloned
  --gap <units>        space between copies (default 20)
  --csv-export         fetch the sheet's CSV export instead of its JSON feed
  --config <file>      config file to read
  --help               show this message";

/// Errors while assembling the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

/// What to read and write
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Document JSON to merge into
    pub document: Option<PathBuf>,
    /// Local records file; wins over `sheet_url`
    pub records: Option<PathBuf>,
    /// Spreadsheet link to fetch records from
    pub sheet_url: Option<String>,
    /// Result path; the document is overwritten when unset
    pub output: Option<PathBuf>,
    /// Roots to copy, by node id or name
    pub roots: Vec<String>,
}

impl InputConfig {
    /// Path the merged document is written to
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref().or(self.document.as_deref())
    }
}

/// Network and persisted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Prefix for every fetched URL
    pub proxy: Option<String>,
    /// Fetch sheets through the CSV export
    pub csv_export: bool,
    /// JSON file holding the last sheet link
    pub state_path: PathBuf,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            csv_export: false,
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
        }
    }
}

/// Complete boot configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    pub input: InputConfig,
    pub merge: MergeOptions,
    pub network: NetworkConfig,
    /// Print usage and exit
    #[serde(skip)]
    pub help: bool,
    /// Config file this was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Flags given on the command line
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    document: Option<PathBuf>,
    records: Option<PathBuf>,
    sheet_url: Option<String>,
    output: Option<PathBuf>,
    roots: Vec<String>,
    no_spacing: bool,
    gap: Option<f64>,
    csv_export: bool,
    config: Option<PathBuf>,
    help: bool,
}

impl CliArgs {
    fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            // --flag=value and --flag value are both accepted
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = || {
                inline
                    .clone()
                    .or_else(|| args.next())
                    .ok_or_else(|| ConfigError::MissingValue(flag.clone()))
            };

            match flag.as_str() {
                "--document" => parsed.document = Some(PathBuf::from(value()?)),
                "--records" => parsed.records = Some(PathBuf::from(value()?)),
                "--sheet-url" => parsed.sheet_url = Some(value()?),
                "--output" => parsed.output = Some(PathBuf::from(value()?)),
                "--root" => parsed.roots.push(value()?),
                "--gap" => parsed.gap = Some(parse_gap("--gap", &value()?)?),
                "--config" => parsed.config = Some(PathBuf::from(value()?)),
                "--no-spacing" => parsed.no_spacing = true,
                "--csv-export" => parsed.csv_export = true,
                "--help" | "-h" => parsed.help = true,
                _ => return Err(ConfigError::UnknownArgument(flag.clone())),
            }
        }
        Ok(parsed)
    }
}

fn parse_gap(key: &str, value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(gap) if gap.is_finite() => Ok(gap),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl BootConfig {
    /// Load boot configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Resolve from explicit arguments and an environment lookup
    pub fn resolve<I, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let cli = CliArgs::parse(args)?;

        // 1. Config file
        let mut config = match &cli.config {
            Some(path) => {
                let mut loaded = Self::load_from_file(path)?;
                loaded.config_path = Some(path.clone());
                log::info!("Loaded config from {}", path.display());
                loaded
            }
            None => Self::load_default_file(),
        };

        // 2. Environment variables
        config.apply_env(env);

        // 3. Command line
        config.apply_cli(cli);

        Ok(config)
    }

    fn load_default_file() -> Self {
        for path in DEFAULT_CONFIG_PATHS {
            let path = Path::new(path);
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(mut loaded) => {
                    loaded.config_path = Some(path.to_path_buf());
                    log::info!("Loaded config from {}", path.display());
                    return loaded;
                }
                Err(e) => log::warn!("{}", e),
            }
        }
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env<E: Fn(&str) -> Option<String>>(&mut self, env: E) {
        let non_empty = |name: &str| env(name).filter(|v| !v.is_empty());

        if let Some(document) = non_empty("DATAMERGE_DOCUMENT") {
            self.input.document = Some(PathBuf::from(document));
        }
        if let Some(records) = non_empty("DATAMERGE_RECORDS") {
            self.input.records = Some(PathBuf::from(records));
        }
        if let Some(sheet_url) = non_empty("DATAMERGE_SHEET_URL") {
            self.input.sheet_url = Some(sheet_url);
            log::info!("Sheet link from env");
        }
        if let Some(output) = non_empty("DATAMERGE_OUTPUT") {
            self.input.output = Some(PathBuf::from(output));
        }
        if let Some(gap) = non_empty("DATAMERGE_GAP") {
            match parse_gap("DATAMERGE_GAP", &gap) {
                Ok(gap) => self.merge.gap = gap,
                Err(e) => log::warn!("{}, keeping {}", e, self.merge.gap),
            }
        }
        if let Some(proxy) = non_empty("DATAMERGE_PROXY") {
            self.network.proxy = Some(proxy);
        }
        if let Some(state) = non_empty("DATAMERGE_STATE") {
            self.network.state_path = PathBuf::from(state);
        }
    }

    fn apply_cli(&mut self, cli: CliArgs) {
        if cli.document.is_some() {
            self.input.document = cli.document;
        }
        if cli.records.is_some() {
            self.input.records = cli.records;
        }
        if cli.sheet_url.is_some() {
            self.input.sheet_url = cli.sheet_url;
        }
        if cli.output.is_some() {
            self.input.output = cli.output;
        }
        if !cli.roots.is_empty() {
            self.input.roots = cli.roots;
        }
        if cli.no_spacing {
            self.merge.space_between_items = false;
        }
        if let Some(gap) = cli.gap {
            self.merge.gap = gap;
        }
        if cli.csv_export {
            self.network.csv_export = true;
        }
        self.help = cli.help;
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        log::info!("Boot Configuration:");
        if let Some(document) = &self.input.document {
            log::info!("  Document: {}", document.display());
        }
        if let Some(records) = &self.input.records {
            log::info!("  Records: {}", records.display());
        } else if let Some(sheet_url) = &self.input.sheet_url {
            log::info!("  Sheet: {}", sheet_url);
        }
        log::info!(
            "  Spacing: {}, gap {}, {} updates in flight",
            self.merge.space_between_items,
            self.merge.gap,
            self.merge.max_concurrent_updates
        );
        if let Some(proxy) = &self.network.proxy {
            log::info!("  Proxy: {}", proxy);
        }
        if let Some(path) = &self.config_path {
            log::info!("  Config: {}", path.display());
        }
    }
}
