//! URL-shaped console locations.
//!
//! A [`Location`] is an immutable `path?query` snapshot. Query parameters keep
//! their first-seen order; a repeated key keeps its first value.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: Vec::new(),
        }
    }

    /// Parse an href. A full URL has its scheme and host dropped; the
    /// fragment is ignored.
    pub fn parse(href: &str) -> Self {
        let mut rest = href.trim();
        if let Some(scheme_end) = rest.find("://") {
            let after_scheme = &rest[scheme_end + 3..];
            rest = match after_scheme.find(['/', '?']) {
                Some(idx) => &after_scheme[idx..],
                None => "",
            };
        }
        if let Some(hash) = rest.find('#') {
            rest = &rest[..hash];
        }
        let (raw_path, raw_query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let path = if raw_path.is_empty() {
            "/".to_string()
        } else if raw_path.starts_with('/') {
            raw_path.to_string()
        } else {
            format!("/{}", raw_path)
        };

        let mut query: Vec<(String, String)> = Vec::new();
        for pair in raw_query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            if query.iter().any(|(existing, _)| *existing == key) {
                continue;
            }
            query.push((key, decode_component(value)));
        }

        Self { path, query }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path segments after the leading `/`. Empty segments are kept so a
    /// trailing or doubled slash never matches a shorter pattern; `/` alone
    /// has none.
    pub fn segments(&self) -> Vec<&str> {
        let rest = self.path.strip_prefix('/').unwrap_or(&self.path);
        if rest.is_empty() {
            return Vec::new();
        }
        rest.split('/').collect()
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// New location with `key` set to `value`, or removed when `value` is
    /// `None` or empty. An existing key keeps its position.
    pub fn with_query(&self, key: &str, value: Option<&str>) -> Self {
        let mut query = self.query.clone();
        match value.filter(|v| !v.is_empty()) {
            Some(value) => match query.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = value.to_string(),
                None => query.push((key.to_string(), value.to_string())),
            },
            None => query.retain(|(k, _)| k != key),
        }
        Self {
            path: self.path.clone(),
            query,
        }
    }

    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl From<String> for Location {
    fn from(href: String) -> Self {
        Location::parse(&href)
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Location::parse(href)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.href()
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
