//! Compiled text/wildcard/regex matchers with an optional process-wide
//! cache, mirroring the teacher's `once_cell`-backed regex caching.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    Text,
    Wildcard,
    Regex,
}

type CacheKey = (MatcherKind, bool, String);

static CACHE: Lazy<Mutex<HashMap<CacheKey, Arc<Regex>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Arc<Regex>,
}

impl Matcher {
    pub fn matches(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    /// `use_cache` mirrors `EngineOptions::cache_regex`: when `false`, the
    /// process-wide cache is neither consulted nor populated, so every call
    /// recompiles its pattern from scratch.
    fn from_pattern(kind: MatcherKind, ignore_case: bool, pattern: String, use_cache: bool) -> Result<Matcher> {
        let key = (kind, ignore_case, pattern.clone());
        if use_cache {
            if let Some(hit) = CACHE.lock().unwrap().get(&key) {
                return Ok(Matcher { regex: hit.clone() });
            }
        }
        let anchored = if ignore_case {
            format!("(?i)^{pattern}$")
        } else {
            format!("^{pattern}$")
        };
        let regex = Arc::new(
            Regex::new(&anchored)
                .map_err(|e| Error::LookupSyntax(format!("invalid pattern {pattern:?}: {e}")))?,
        );
        if use_cache {
            CACHE.lock().unwrap().insert(key, regex.clone());
        }
        Ok(Matcher { regex })
    }
}

/// Escape every regex metacharacter in `s`; used for `_text`/`_itext`.
pub fn escape_text(s: &str) -> String {
    regex::escape(s)
}

pub fn compile_text(s: &str, ignore_case: bool, use_cache: bool) -> Result<Matcher> {
    Matcher::from_pattern(MatcherKind::Text, ignore_case, escape_text(s), use_cache)
}

/// Translate a wildcard pattern (`?`, `*`, `[...]`, `[!...]`) to a regex
/// fragment, mirroring `dlquery.utils.convert_wildcard_to_regex`.
pub fn wildcard_to_regex_pattern(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2);
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '.' => out.push_str(r"\."),
            '+' => out.push_str(r"\+"),
            '?' => out.push('.'),
            '*' => out.push_str(".*"),
            '[' => {
                if chars.get(i + 1) == Some(&'!') {
                    out.push_str("[^");
                    i += 1;
                } else {
                    out.push('[');
                }
            }
            c => out.push(c),
        }
        i += 1;
    }
    Regex::new(&out)
        .map_err(|e| Error::LookupSyntax(format!("invalid wildcard {pattern:?}: {e}")))?;
    Ok(out)
}

pub fn compile_wildcard(s: &str, ignore_case: bool, use_cache: bool) -> Result<Matcher> {
    let pattern = wildcard_to_regex_pattern(s)?;
    Matcher::from_pattern(MatcherKind::Wildcard, ignore_case, pattern, use_cache)
}

pub fn compile_regex(s: &str, ignore_case: bool, use_cache: bool) -> Result<Matcher> {
    // validate early so a bad embedded regex is a lookup-syntax error, not
    // a panic deep inside the anchored recompile.
    Regex::new(s).map_err(|e| Error::LookupSyntax(format!("invalid regex {s:?}: {e}")))?;
    Matcher::from_pattern(MatcherKind::Regex, ignore_case, s.to_string(), use_cache)
}
