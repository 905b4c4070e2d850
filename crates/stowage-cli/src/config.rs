// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::{IntegerType, cli::Cli};
use anyhow::{Context, Result, bail};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, num::NonZeroUsize, path::Path, time::Duration};

/// Solver configuration, read from a JSON file.
///
/// Missing fields take their default values. A `null` time limit or
/// solution limit disables it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StowageConfig {
    pub time_limit_secs: Option<u64>,
    /// Number of parallel workers; the available parallelism when absent.
    pub num_workers: Option<usize>,
    /// Stops all workers once this many improving solutions were found.
    pub solution_limit: Option<u64>,
    /// Explored nodes between two progress lines of a worker; `0` disables them.
    pub log_interval_nodes: u64,
    /// Weight of the scalar objective `weight * (containers - 1) + coordinate sum`
    /// reported next to the lexicographic one.
    pub legacy_objective_weight: IntegerType,
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: Some(600),
            num_workers: None,
            solution_limit: None,
            log_interval_nodes: 1_000_000,
            legacy_objective_weight: 10_000,
        }
    }
}

impl StowageConfig {
    /// Reads the configuration from `path`, or returns the defaults when no
    /// path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            warn!("[MAIN] no config file provided, use --config to provide a custom config");
            return Ok(Self::default());
        };

        let file = File::open(path)
            .with_context(|| format!("could not open config file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file)).context("incorrect config file format")
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("incorrect config file format")
    }

    /// Applies the command-line overrides.
    pub fn with_overrides(mut self, args: &Cli) -> Self {
        if let Some(secs) = args.time_limit {
            self.time_limit_secs = Some(secs);
        }
        if let Some(workers) = args.workers {
            self.num_workers = Some(workers);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_workers == Some(0) {
            bail!("the number of workers must be at least 1");
        }
        if self.solution_limit == Some(0) {
            bail!("the solution limit must be at least 1");
        }
        if self.legacy_objective_weight <= 0 {
            bail!(
                "the legacy objective weight must be positive, got {}",
                self.legacy_objective_weight
            );
        }
        Ok(())
    }

    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }

    /// The configured number of workers, or the available parallelism.
    pub fn workers(&self) -> usize {
        self.num_workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = StowageConfig::default();
        assert_eq!(config.time_limit(), Some(Duration::from_secs(600)));
        assert_eq!(config.legacy_objective_weight, 10_000);
        assert!(config.workers() >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = StowageConfig::from_json(r#"{ "num_workers": 2, "time_limit_secs": null }"#)
            .unwrap();
        assert_eq!(config.workers(), 2);
        assert_eq!(config.time_limit(), None);
        assert_eq!(config.solution_limit, None);
        assert_eq!(config.legacy_objective_weight, 10_000);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(StowageConfig::from_json(r#"{ "workers": 2 }"#).is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("stowage-config-does-not-exist.json");
        assert!(StowageConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_no_file_gives_defaults() {
        assert_eq!(StowageConfig::load(None).unwrap(), StowageConfig::default());
    }

    #[test]
    fn test_cli_overrides() {
        let args =
            Cli::try_parse_from(["stowage", "a", "b", "--time-limit", "3", "--workers", "4"])
                .unwrap();
        let config = StowageConfig::default().with_overrides(&args);
        assert_eq!(config.time_limit(), Some(Duration::from_secs(3)));
        assert_eq!(config.workers(), 4);

        let args = Cli::try_parse_from(["stowage", "a", "b"]).unwrap();
        let config = StowageConfig::default().with_overrides(&args);
        assert_eq!(config, StowageConfig::default());
    }

    #[test_case(r#"{ "num_workers": 0 }"#; "zero workers")]
    #[test_case(r#"{ "solution_limit": 0 }"#; "zero solution limit")]
    #[test_case(r#"{ "legacy_objective_weight": -1 }"#; "negative weight")]
    fn test_validation_rejects(json: &str) {
        let config = StowageConfig::from_json(json).unwrap();
        assert!(config.validate().is_err());
    }
}
