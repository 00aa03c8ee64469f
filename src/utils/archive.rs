//! JSON archives that are computed once and loaded afterwards.
//!
//! Expensive results (simulation ensembles, grid scores) are cached on disk
//! the first time they are produced. Keyed archives store a map whose keys
//! carry their type as a prefix, e.g. `int__5` or `float__0.25`, so keys of
//! different types survive the round trip through a JSON object.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Ml4ScmError, Result};

const SEPARATOR: &str = "__";

/// Key of a keyed archive entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveKey {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ArchiveKey {
    fn tag(&self) -> &'static str {
        match self {
            ArchiveKey::Str(_) => "str",
            ArchiveKey::Int(_) => "int",
            ArchiveKey::Float(_) => "float",
            ArchiveKey::Bool(_) => "bool",
        }
    }

    /// Encode as `<tag>__<value>`.
    pub fn encode(&self) -> String {
        match self {
            ArchiveKey::Str(s) => format!("{}{}{}", self.tag(), SEPARATOR, s),
            ArchiveKey::Int(i) => format!("{}{}{}", self.tag(), SEPARATOR, i),
            ArchiveKey::Float(x) => format!("{}{}{:?}", self.tag(), SEPARATOR, x),
            ArchiveKey::Bool(b) => format!("{}{}{}", self.tag(), SEPARATOR, b),
        }
    }

    /// Decode a key written by [`encode`](Self::encode).
    ///
    /// A key without a separator is taken as a plain string. Booleans are
    /// true for `yes` or `true` in any case and false otherwise.
    pub fn decode(key: &str) -> Result<Self> {
        let Some((tag, value)) = key.split_once(SEPARATOR) else {
            return Ok(ArchiveKey::Str(key.to_string()));
        };

        let invalid =
            |msg: String| Ml4ScmError::InvalidInput(format!("archive key '{}': {}", key, msg));
        match tag {
            "str" => Ok(ArchiveKey::Str(value.to_string())),
            "int" => value
                .parse()
                .map(ArchiveKey::Int)
                .map_err(|e| invalid(e.to_string())),
            "float" => value
                .parse()
                .map(ArchiveKey::Float)
                .map_err(|e| invalid(e.to_string())),
            "bool" => Ok(ArchiveKey::Bool(matches!(
                value.to_lowercase().as_str(),
                "yes" | "true"
            ))),
            _ => Err(invalid(format!("unknown key type '{}'", tag))),
        }
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for ArchiveKey {
    fn from(s: &str) -> Self {
        ArchiveKey::Str(s.to_string())
    }
}

impl From<i64> for ArchiveKey {
    fn from(i: i64) -> Self {
        ArchiveKey::Int(i)
    }
}

impl From<f64> for ArchiveKey {
    fn from(x: f64) -> Self {
        ArchiveKey::Float(x)
    }
}

impl From<bool> for ArchiveKey {
    fn from(b: bool) -> Self {
        ArchiveKey::Bool(b)
    }
}

/// Load `path`, first writing the value produced by `f` if it does not exist.
///
/// The returned value is always the one read back from disk.
pub fn load_or_create<T, F>(path: impl AsRef<Path>, f: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    let path = path.as_ref();
    if !path.exists() {
        debug!("creating archive {}", path.display());
        fs::write(path, serde_json::to_string(&f()?)?)?;
    }
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Keyed variant of [`load_or_create`].
///
/// Entries come back ordered by their encoded key.
pub fn load_or_create_keyed<T, F>(path: impl AsRef<Path>, f: F) -> Result<Vec<(ArchiveKey, T)>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<Vec<(ArchiveKey, T)>>,
{
    let stored: BTreeMap<String, T> = load_or_create(path, || {
        Ok(f()?
            .into_iter()
            .map(|(k, v)| (k.encode(), v))
            .collect::<BTreeMap<_, _>>())
    })?;

    stored
        .into_iter()
        .map(|(k, v)| Ok((ArchiveKey::decode(&k)?, v)))
        .collect()
}
