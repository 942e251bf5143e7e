use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use pali_db::LoadMode;
use thiserror::Error;
use toml_edit::{DocumentMut, Item, value};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const HEADWORDS_FILE: &str = "headwords.json";
pub const TEMPLATES_FILE: &str = "templates.json";
pub const DERIVED_FILE: &str = "derived.json";
pub const ATTESTED_FILE: &str = "all_tipitaka_words.txt";
pub const STATE_DIR: &str = "state";

const REGENERATE_SECTION: &str = "regenerate";
const INFLECTIONS_KEY: &str = "inflections";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("failed to write config {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("config {}: [regenerate] inflections must be a boolean or yes/no, got {found}", .path.display())]
    InvalidSwitch { path: PathBuf, found: String },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "inflection-tables")]
#[command(about = "Regenerate inflection tables and inflection lists for changed headwords")]
pub struct Args {
    /// Directory holding headwords.json, templates.json and derived.json.
    #[arg(long, env = "PALI_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
    /// Attested word list (one word per line, or a .json array).
    #[arg(long, env = "PALI_ATTESTED_FORMS")]
    pub attested: Option<PathBuf>,
    /// Directory for change-detection snapshots.
    #[arg(long, env = "PALI_STATE_DIR")]
    pub state_dir: Option<PathBuf>,
    #[arg(long, env = "PALI_LOAD_MODE", value_enum, default_value_t = LoadModeArg::Mmap)]
    pub load_mode: LoadModeArg,
    /// Rebuild every headword instead of only changed ones.
    #[arg(long, env = "PALI_REGENERATE_ALL")]
    pub regenerate_all: bool,
    /// TOML settings file with a `[regenerate] inflections` switch.
    #[arg(long, env = "PALI_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum LoadModeArg {
    Mmap,
    Owned,
}

impl From<LoadModeArg> for LoadMode {
    fn from(arg: LoadModeArg) -> Self {
        match arg {
            LoadModeArg::Mmap => LoadMode::Mmap,
            LoadModeArg::Owned => LoadMode::Owned,
        }
    }
}

/// Resolved settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub attested_path: PathBuf,
    pub state_dir: PathBuf,
    pub load_mode: LoadMode,
    pub regenerate_all: bool,
    pub settings: Option<SettingsFile>,
}

impl Config {
    /// Defaults for a data directory: files inside it, state in `state/`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            attested_path: data_dir.join(ATTESTED_FILE),
            state_dir: data_dir.join(STATE_DIR),
            data_dir,
            load_mode: LoadMode::Mmap,
            regenerate_all: false,
            settings: None,
        }
    }

    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let mut config = Self::new(args.data_dir);
        if let Some(path) = args.attested {
            config.attested_path = path;
        }
        if let Some(dir) = args.state_dir {
            config.state_dir = dir;
        }
        config.load_mode = args.load_mode.into();
        config.settings = args.config.as_deref().map(SettingsFile::load).transpose()?;
        let requested = match &config.settings {
            Some(settings) => settings.regenerate_inflections()?,
            None => false,
        };
        config.regenerate_all = args.regenerate_all || requested;
        Ok(config)
    }

    pub fn headwords_path(&self) -> PathBuf {
        self.data_dir.join(HEADWORDS_FILE)
    }

    pub fn templates_path(&self) -> PathBuf {
        self.data_dir.join(TEMPLATES_FILE)
    }

    pub fn derived_path(&self) -> PathBuf {
        self.data_dir.join(DERIVED_FILE)
    }
}

/// Settings file whose regenerate switch is reset after a successful run.
///
/// Edits go through `toml_edit` so comments and unrelated keys survive.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    doc: DocumentMut,
}

impl SettingsFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = text
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `[regenerate] inflections`, accepting booleans or `yes`/`no`.
    pub fn regenerate_inflections(&self) -> Result<bool, ConfigError> {
        let Some(item) = self.switch() else {
            return Ok(false);
        };
        if let Some(flag) = item.as_bool() {
            return Ok(flag);
        }
        match item.as_str().map(str::to_ascii_lowercase).as_deref() {
            Some("yes") => Ok(true),
            Some("no") => Ok(false),
            _ => Err(ConfigError::InvalidSwitch {
                path: self.path.clone(),
                found: item.to_string().trim().to_string(),
            }),
        }
    }

    /// Turn the regenerate switch off and write the file back.
    pub fn reset_regenerate_inflections(&mut self) -> Result<(), ConfigError> {
        let as_string = self.switch().is_some_and(|item| item.is_str());
        self.doc[REGENERATE_SECTION][INFLECTIONS_KEY] = if as_string {
            value("no")
        } else {
            value(false)
        };
        fs::write(&self.path, self.doc.to_string()).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn switch(&self) -> Option<&Item> {
        self.doc
            .get(REGENERATE_SECTION)
            .and_then(|section| section.get(INFLECTIONS_KEY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_settings(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn derives_paths_from_data_dir() {
        let args = Args::parse_from(["inflection-tables", "--data-dir", "/srv/dpd"]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.headwords_path(), PathBuf::from("/srv/dpd/headwords.json"));
        assert_eq!(config.templates_path(), PathBuf::from("/srv/dpd/templates.json"));
        assert_eq!(
            config.attested_path,
            PathBuf::from("/srv/dpd/all_tipitaka_words.txt")
        );
        assert_eq!(config.state_dir, PathBuf::from("/srv/dpd/state"));
        assert_eq!(config.load_mode, LoadMode::Mmap);
        assert!(!config.regenerate_all);
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = Args::parse_from([
            "inflection-tables",
            "--attested",
            "words.json",
            "--state-dir",
            "/tmp/state",
            "--load-mode",
            "owned",
            "--regenerate-all",
        ]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.attested_path, PathBuf::from("words.json"));
        assert_eq!(config.state_dir, PathBuf::from("/tmp/state"));
        assert_eq!(config.load_mode, LoadMode::Owned);
        assert!(config.regenerate_all);
    }

    #[test]
    fn settings_switch_requests_full_rebuild_and_resets() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(
            dir.path(),
            "# run options\n[regenerate]\ninflections = true\ntransliterations = false\n",
        );
        let mut settings = SettingsFile::load(&path).unwrap();
        assert!(settings.regenerate_inflections().unwrap());

        settings.reset_regenerate_inflections().unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("# run options"));
        assert!(text.contains("transliterations = false"));
        assert!(!SettingsFile::load(&path).unwrap().regenerate_inflections().unwrap());
    }

    #[test]
    fn settings_accept_yes_no_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "[regenerate]\ninflections = \"yes\"\n");
        let mut settings = SettingsFile::load(&path).unwrap();
        assert!(settings.regenerate_inflections().unwrap());
        settings.reset_regenerate_inflections().unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("inflections = \"no\""));

        let bad = write_settings(dir.path(), "[regenerate]\ninflections = 3\n");
        assert!(matches!(
            SettingsFile::load(&bad).unwrap().regenerate_inflections(),
            Err(ConfigError::InvalidSwitch { .. })
        ));
    }

    #[test]
    fn missing_switch_means_incremental() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "[other]\nkey = 1\n");
        assert!(!SettingsFile::load(&path).unwrap().regenerate_inflections().unwrap());
    }
}
