//! Engine-wide configuration: the options that shape how lookups and
//! predicates are evaluated, loaded by merging a global and a repo-local
//! TOML file the same way the teacher's preset config did.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables for a query run. `strict` controls whether a predicate's
/// internal parse/compare failure propagates as an error or is swallowed
/// to `false` (the `on_exception` flag threaded through `predicates`).
/// `cache_regex` controls whether compiled lookup/predicate matchers are
/// kept in `matchers`'s process-wide cache. `extra_date_formats`/
/// `extra_time_formats` supplement the builtin `date(..)`/`time(..)`/
/// `datetime(..)` format lists with caller-supplied `chrono` format
/// strings, compiled into each comparator's
/// [`crate::predicates::datetime::DatetimeOptions`] at lookup/select
/// compile time.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct EngineOptions {
    pub strict: bool,
    pub cache_regex: bool,
    pub extra_date_formats: Vec<String>,
    pub extra_time_formats: Vec<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            strict: false,
            cache_regex: true,
            extra_date_formats: Vec::new(),
            extra_time_formats: Vec::new(),
        }
    }
}

/// Path to the global config file. Prefers a repo-local `.treeql/config.toml`
/// under the current working directory to avoid touching host-global dirs;
/// can be overridden with `TREEQL_TEST_CONFIG_DIR` for testing.
pub fn global_config_path() -> Option<PathBuf> {
    if let Ok(path_str) = env::var("TREEQL_TEST_CONFIG_DIR") {
        return Some(PathBuf::from(path_str).join("treeql/config.toml"));
    }
    if let Ok(cwd) = env::current_dir() {
        return Some(cwd.join(".treeql/config.toml"));
    }
    dirs::config_dir().map(|p| p.join("treeql/config.toml"))
}

/// Searches for a local `.treeql.toml` in `start_dir` and its ancestors.
fn find_local_config(start_dir: &Path) -> Option<PathBuf> {
    for ancestor in start_dir.ancestors() {
        let candidate = ancestor.join(".treeql.toml");
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

fn read_toml(path: &Path) -> Result<EngineOptions> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::NotFound(format!("reading config at {path:?}: {e}")))?;
    toml::from_str(&raw).map_err(|e| Error::PredicateArgument(format!("invalid config at {path:?}: {e}")))
}

/// Load engine options, merging the global config with a repo-local
/// override found by walking up from the current directory. The local
/// file, if present, wins wholesale over the global one; either may be
/// absent.
pub fn load_config() -> Result<EngineOptions> {
    let mut options = EngineOptions::default();

    if let Some(path) = global_config_path() {
        if path.exists() {
            options = read_toml(&path)?;
        }
    }

    let current_dir = env::current_dir()
        .map_err(|e| Error::NotFound(format!("reading current directory: {e}")))?;
    if let Some(path) = find_local_config(&current_dir) {
        options = read_toml(&path)?;
    }

    Ok(options)
}
