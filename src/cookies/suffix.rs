//! Public suffix lookups.
//!
//! Request-wide cookie retrieval narrows candidates down to the *private
//! suffix* of the request host: the registrable part directly below a public
//! suffix (`a.b.example.co.uk` -> `example.co.uk`). Which suffixes are public
//! is answered by a [`PublicSuffixList`].
//!
//! [`SuffixList`] reads the `publicsuffix.org` list format:
//!
//! ```text
//! // comment
//! com
//! co.uk
//! *.ck        wildcard: every label directly below `ck` is public
//! !www.ck     exception to the wildcard above
//! ```
//!
//! Hosts whose TLD is not listed fall back to the implicit `*` rule, so the
//! TLD itself is treated as public.

use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;

use crate::errors::Result;

/// A handle to a public suffix list trait object.
pub type PublicSuffixHandle = Arc<dyn PublicSuffixList + Send + Sync>;

pub trait PublicSuffixList: Send + Sync {
    /// The registrable domain of `host`, or `None` when `host` is an IP
    /// address, empty, or itself a public suffix.
    fn private_suffix(&self, host: &str) -> Option<String>;

    /// Whether `suffix` is a public suffix (e.g. `com`, `co.uk`).
    fn is_public_suffix(&self, suffix: &str) -> bool;
}

/// The publicsuffix.org list (ICANN and private sections) compiled into the
/// crate. Embedders that track upstream more closely load a newer copy with
/// [`SuffixList::from_file`].
const BUILTIN_LIST: &str = include_str!("public_suffix_list.dat");

lazy_static! {
    static ref BUILTIN: SuffixList = SuffixList::parse(BUILTIN_LIST);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Rules {
    exact: HashSet<String>,
    wildcard: HashSet<String>,
    exception: HashSet<String>,
}

/// Rule-based [`PublicSuffixList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuffixList {
    rules: Rules,
}

impl Default for SuffixList {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

impl SuffixList {
    /// Parses a list in `publicsuffix.org` format. Only the first whitespace
    /// separated token of each line is used.
    pub fn parse(list: &str) -> Self {
        let mut rules = Rules::default();

        for line in list.lines() {
            let Some(rule) = line.split_whitespace().next() else {
                continue;
            };
            if rule.starts_with("//") {
                continue;
            }
            let rule = to_ascii_rule(rule);
            if let Some(rest) = rule.strip_prefix('!') {
                rules.exception.insert(rest.to_string());
            } else if let Some(rest) = rule.strip_prefix("*.") {
                rules.wildcard.insert(rest.to_string());
            } else if !rule.is_empty() {
                rules.exact.insert(rule);
            }
        }

        Self { rules }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents))
    }

    pub fn len(&self) -> usize {
        self.rules.exact.len() + self.rules.wildcard.len() + self.rules.exception.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of trailing labels of `labels` that form the public suffix.
    fn public_suffix_labels(&self, labels: &[&str]) -> usize {
        let n = labels.len();
        for i in 0..n {
            let candidate = labels[i..].join(".");
            if self.rules.exception.contains(&candidate) {
                return n - i - 1;
            }
            if self.rules.exact.contains(&candidate) {
                return n - i;
            }
            if i + 1 < n && self.rules.wildcard.contains(&labels[i + 1..].join(".")) {
                return n - i;
            }
        }
        // implicit "*" rule
        1
    }
}

impl PublicSuffixList for SuffixList {
    fn private_suffix(&self, host: &str) -> Option<String> {
        let host = normalize(host)?;
        let labels: Vec<&str> = host.split('.').collect();
        if labels.iter().any(|l| l.is_empty()) {
            return None;
        }

        let public = self.public_suffix_labels(&labels);
        if labels.len() <= public {
            return None;
        }
        Some(labels[labels.len() - public - 1..].join("."))
    }

    fn is_public_suffix(&self, suffix: &str) -> bool {
        let Some(suffix) = normalize(suffix) else {
            return false;
        };
        let labels: Vec<&str> = suffix.split('.').collect();
        if labels.iter().any(|l| l.is_empty()) {
            return false;
        }
        self.public_suffix_labels(&labels) == labels.len()
    }
}

/// Lowercases a rule and converts internationalized labels to punycode, the
/// form hosts take after URL parsing.
fn to_ascii_rule(rule: &str) -> String {
    let rule = rule.trim_matches('.');
    if rule.is_ascii() {
        return rule.to_ascii_lowercase();
    }
    let (prefix, name) = match rule.strip_prefix("*.") {
        Some(name) => ("*.", name),
        None => match rule.strip_prefix('!') {
            Some(name) => ("!", name),
            None => ("", rule),
        },
    };
    match url::Host::parse(name) {
        Ok(url::Host::Domain(ascii)) => format!("{prefix}{ascii}"),
        _ => rule.to_lowercase(),
    }
}

/// Lowercases and strips surrounding dots. IP addresses and empty names yield `None`.
fn normalize(host: &str) -> Option<String> {
    let host = host.trim_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    if host.trim_start_matches('[').trim_end_matches(']').parse::<IpAddr>().is_ok() {
        return None;
    }
    Some(host)
}
