//! # Config — TOML Run Files
//!
//! A run file fixes the sieve parameters and output options so repeated runs
//! do not need long command lines. Every field is optional; explicit CLI
//! flags win over the file, and the file wins over built-in defaults.
//!
//! ```toml
//! [sieve]
//! limit = 10000000
//! algorithm = "wheel"   # dense | packed | wheel
//! threads = 0           # 0 = auto-detect
//! parallel = true
//!
//! [output]
//! count = true
//! time = true
//! list = false
//! per_line = 10
//! file = "primes.txt"
//! json = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::engine::SieveKind;
use crate::DEFAULT_LIMIT;

/// Top-level run configuration: the `[sieve]` and `[output]` sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub sieve: SieveSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SieveSection {
    pub limit: u64,
    pub algorithm: SieveKind,
    pub threads: usize,
    pub parallel: bool,
}

impl Default for SieveSection {
    fn default() -> Self {
        SieveSection {
            limit: DEFAULT_LIMIT,
            algorithm: SieveKind::Dense,
            threads: 0,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub count: bool,
    pub time: bool,
    pub list: bool,
    pub per_line: usize,
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        OutputSection {
            count: false,
            time: false,
            list: false,
            per_line: 10,
            file: None,
            json: false,
        }
    }
}

/// Values given explicitly on the command line. `None` / `false` means
/// "not given" and leaves the file value in place.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub limit: Option<u64>,
    pub algorithm: Option<SieveKind>,
    pub threads: Option<usize>,
    pub no_parallel: bool,
    pub count: bool,
    pub time: bool,
    pub list: bool,
    pub per_line: Option<usize>,
    pub file: Option<PathBuf>,
    pub json: bool,
}

impl RunConfig {
    /// Apply CLI overrides and re-validate.
    pub fn merge(mut self, o: RunOverrides) -> Result<Self> {
        if let Some(limit) = o.limit {
            self.sieve.limit = limit;
        }
        if let Some(algorithm) = o.algorithm {
            self.sieve.algorithm = algorithm;
        }
        if let Some(threads) = o.threads {
            self.sieve.threads = threads;
        }
        if o.no_parallel {
            self.sieve.parallel = false;
        }
        self.output.count |= o.count;
        self.output.time |= o.time;
        self.output.list |= o.list;
        self.output.json |= o.json;
        if let Some(per_line) = o.per_line {
            self.output.per_line = per_line;
        }
        if o.file.is_some() {
            self.output.file = o.file;
        }
        validate_config(&self)?;
        Ok(self)
    }

    /// True when the summary count line should be printed: asked for
    /// explicitly, or nothing else was requested.
    pub fn shows_count(&self) -> bool {
        self.output.count || (!self.output.list && self.output.file.is_none())
    }
}

/// Parse a run configuration from a TOML string.
pub fn parse_toml(content: &str) -> Result<RunConfig> {
    let config: RunConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a run configuration from a TOML file path.
pub fn parse_toml_file(path: &Path) -> Result<RunConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
    parse_toml(&content)
}

fn validate_config(config: &RunConfig) -> Result<()> {
    if config.output.per_line == 0 {
        anyhow::bail!("output.per_line must be at least 1");
    }
    if config.output.file.as_ref().is_some_and(|f| f.as_os_str().is_empty()) {
        anyhow::bail!("output.file must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.sieve.limit, DEFAULT_LIMIT);
        assert_eq!(config.output.per_line, 10);
        assert!(config.shows_count());
    }

    #[test]
    fn full_file_parses() {
        let config = parse_toml(
            r#"
            [sieve]
            limit = 5000
            algorithm = "wheel"
            threads = 4
            parallel = false

            [output]
            list = true
            per_line = 8
            file = "out.txt"
            "#,
        )
        .unwrap();
        assert_eq!(config.sieve.limit, 5000);
        assert_eq!(config.sieve.algorithm, SieveKind::Wheel);
        assert_eq!(config.sieve.threads, 4);
        assert!(!config.sieve.parallel);
        assert_eq!(config.output.per_line, 8);
        assert_eq!(config.output.file, Some(PathBuf::from("out.txt")));
        assert!(!config.shows_count());
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let err = parse_toml("[sieve]\nalgorithm = \"segmented\"\n").unwrap_err();
        assert!(err.to_string().contains("segmented") || err.to_string().contains("variant"));
    }

    #[test]
    fn unknown_key_rejected() {
        assert!(parse_toml("[sieve]\nsegment_size = 10\n").is_err());
    }

    #[test]
    fn zero_per_line_rejected() {
        let err = parse_toml("[output]\nper_line = 0\n").unwrap_err();
        assert!(err.to_string().contains("per_line"));
    }

    #[test]
    fn cli_overrides_win() {
        let file = parse_toml("[sieve]\nlimit = 5000\nalgorithm = \"packed\"\nthreads = 2\n").unwrap();
        let merged = file
            .merge(RunOverrides {
                limit: Some(100),
                no_parallel: true,
                count: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(merged.sieve.limit, 100);
        assert_eq!(merged.sieve.algorithm, SieveKind::Packed);
        assert_eq!(merged.sieve.threads, 2);
        assert!(!merged.sieve.parallel);
        assert!(merged.output.count);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_toml_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read config"));
    }
}
