//! Reader for `.edgerc` credential files.
//!
//! These are flat INI files with one section per API client:
//!
//! ```text
//! [default]
//! client_secret = xxxx
//! host = akab-xxxx.purge.akamaiapis.net
//! access_token = akab-xxxx
//! client_token = akab-xxxx
//! max-body = 131072
//! ```
use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
};

#[derive(Debug, thiserror::Error)]
pub enum EdgercError {
    #[error("credential file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("could not read credential file {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("section [{0}] not found in credential file")]
    MissingSection(String),

    #[error("key `{key}` missing in section [{section}]")]
    MissingKey { section: String, key: &'static str },

    #[error("invalid value for `{key}` in section [{section}]: {value}")]
    InvalidValue {
        section: String,
        key: &'static str,
        value: String,
    },
}

/// The key/value pairs of one edgerc section.
///
/// Keys are normalized to lowercase with `-` replaced by `_`, so
/// `max-body` and `max_body` are the same key.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EdgercSection {
    pub(crate) name: String,
    values: HashMap<String, String>,
}

impl EdgercSection {
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub(crate) fn require(&self, key: &'static str) -> Result<&str, EdgercError> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| EdgercError::MissingKey {
                section: self.name.clone(),
                key,
            })
    }
}

pub(crate) fn read_section(path: &Path, section: &str) -> Result<EdgercSection, EdgercError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(EdgercError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(EdgercError::Unreadable {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse_section(&content, section).ok_or_else(|| EdgercError::MissingSection(section.into()))
}

pub(crate) fn parse_section(content: &str, section: &str) -> Option<EdgercSection> {
    let mut found = false;
    let mut in_section = false;
    let mut values = HashMap::new();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            in_section = name.trim() == section;
            found |= in_section;
            continue;
        }

        if !in_section {
            continue;
        }

        let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(':')) else {
            continue;
        };

        values.insert(
            key.trim().to_ascii_lowercase().replace('-', "_"),
            unquote(value.trim()).to_string(),
        );
    }

    found.then(|| EdgercSection {
        name: section.to_string(),
        values,
    })
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
