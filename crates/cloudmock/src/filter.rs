//! List-query filtering.
//!
//! A list request matches a resource only if every supplied predicate holds.
//! The two kinds disagree on name matching and both behaviours are kept:
//! volumes compare names exactly, servers strip `^`/`$` anchors from the
//! requested name and then match it as a prefix.
//!
//! The metadata predicate arrives as a mapping written with single quotes,
//! e.g. `{'k8s.io/role/master':'1'}`. Quotes are swapped for double quotes and
//! the result parsed as JSON. A string that still fails to parse imposes no
//! constraint at all.

use std::collections::HashMap;

/// Query parameters of a request, first occurrence of each key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: HashMap<String, String>,
}

impl QueryParams {
    /// Parse a raw query string with form-urlencoded rules (`+` is a space).
    pub fn parse(query: Option<&str>) -> Self {
        let mut values = HashMap::new();
        for pair in query.unwrap_or("").split('&').filter(|s| !s.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = form_decode(key);
            let value = form_decode(value);
            values.entry(key).or_insert(value);
        }
        Self { values }
    }

    /// Value of `key`, or the empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }
}

fn form_decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(spaced)
}

/// How a requested name is compared with a resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    Any,
    Exact(String),
    Prefix(String),
}

impl NameFilter {
    /// Exact comparison; an empty name means no constraint.
    pub fn exact(requested: &str) -> Self {
        if requested.is_empty() {
            NameFilter::Any
        } else {
            NameFilter::Exact(requested.to_string())
        }
    }

    /// Prefix comparison after trimming every leading and trailing `^`/`$`.
    pub fn anchored_prefix(requested: &str) -> Self {
        let trimmed = requested.trim_matches(|c| c == '^' || c == '$');
        if trimmed.is_empty() {
            NameFilter::Any
        } else {
            NameFilter::Prefix(trimmed.to_string())
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Any => true,
            NameFilter::Exact(expected) => name == expected,
            NameFilter::Prefix(prefix) => name.starts_with(prefix.as_str()),
        }
    }
}

/// Parse a single-quoted metadata mapping. Unparseable input yields an empty
/// mapping, i.e. no constraint.
pub fn parse_metadata_filter(raw: &str) -> HashMap<String, String> {
    let normalized = raw.replace('\'', "\"");
    serde_json::from_str(&normalized).unwrap_or_default()
}

/// Conjunction of the predicates of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub name: NameFilter,
    pub metadata: HashMap<String, String>,
}

impl ListQuery {
    /// No predicates: everything matches.
    pub fn all() -> Self {
        Self {
            name: NameFilter::Any,
            metadata: HashMap::new(),
        }
    }

    /// Volume semantics: exact name plus metadata subset.
    pub fn for_volumes(params: &QueryParams) -> Self {
        Self {
            name: NameFilter::exact(params.get("name")),
            metadata: parse_metadata_filter(params.get("metadata")),
        }
    }

    /// Server semantics: anchored prefix name, no metadata predicate.
    pub fn for_servers(params: &QueryParams) -> Self {
        Self {
            name: NameFilter::anchored_prefix(params.get("name")),
            metadata: HashMap::new(),
        }
    }

    /// A requested key missing from the resource compares as the empty string.
    pub fn matches(&self, name: &str, metadata: &HashMap<String, String>) -> bool {
        self.name.matches(name)
            && self.metadata.iter().all(|(key, expected)| {
                metadata.get(key).map(String::as_str).unwrap_or("") == expected
            })
    }

    pub fn apply<'a, T: 'a>(
        &self,
        resources: impl Iterator<Item = &'a T>,
        fields: impl Fn(&T) -> (&str, &HashMap<String, String>),
    ) -> Vec<&'a T> {
        resources
            .filter(|resource| {
                let (name, metadata) = fields(*resource);
                self.matches(name, metadata)
            })
            .collect()
    }
}
