//! Run configuration
//!
//! Optional file (`.httpcompat.toml` / `.httpcompat.json`) providing defaults
//! for the command line. Flags always win over file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Case corpus path
    pub cases: PathBuf,

    /// Reference server base URL
    pub node: Option<String>,

    /// Server under test base URL
    pub snode: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Headers that must be identical between node and snode
    pub critical_headers: Vec<String>,

    /// Headers shown when dumping a failing response
    pub dump_headers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cases: PathBuf::from("cases.json"),
            node: None,
            snode: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            critical_headers: vec!["x-demo".to_string()],
            dump_headers: ["content-type", "content-length", "x-demo", "x-powered-by"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location, falling back to built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load the first default candidate found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns error if a candidate file exists but cannot be read or parsed
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let candidates = [".httpcompat.toml", ".httpcompat.json"];

        for name in candidates {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }

        Ok(Self::default())
    }

    /// Example config file
    pub fn example() -> &'static str {
        r#"# httpcompat configuration

# Case corpus (.json, .yaml or .toml)
cases = "tests/cases.json"

# Reference server and server under test
node = "http://127.0.0.1:3000"
snode = "http://127.0.0.1:8080"

# Per-request timeout in seconds
# timeout_secs = 10

# Headers that must match between node and snode
# critical_headers = ["x-demo"]

# Headers printed by --dump-on-fail
# dump_headers = ["content-type", "content-length", "x-demo", "x-powered-by"]
"#
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
}
