use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Permission mode applied by `install -m` when a file entry omits `perm`.
pub const DEFAULT_PERM_MODE: &str = "0755";

/// Scheme separator that marks a source as a remote URL.
pub const URL_SCHEME_SEPARATOR: &str = "://";

/// A file to install on a host, as written in the cluster file.
///
/// `src` is either a local glob pattern or a URL. URLs are fetched by the
/// host itself; patterns are expanded on the controller and pushed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSpec {
    /// Optional human label used in progress output.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Local glob pattern or URL.
    pub src: String,
    /// Destination file. Absolute when `dst_dir` is empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dst: String,
    /// Destination directory.
    #[serde(default, rename = "dstDir", skip_serializing_if = "String::is_empty")]
    pub dst_dir: String,
    /// Octal permission mode, e.g. `"0644"`. An unquoted YAML number is
    /// taken digit for digit.
    #[serde(default = "default_perm_mode", deserialize_with = "deserialize_perm")]
    pub perm: String,
}

fn default_perm_mode() -> String {
    DEFAULT_PERM_MODE.to_string()
}

fn deserialize_perm<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Perm {
        Text(String),
        Number(u32),
    }
    Ok(match Perm::deserialize(deserializer)? {
        Perm::Text(text) => text,
        Perm::Number(n) => n.to_string(),
    })
}

impl FileSpec {
    /// Create a spec for `src` with no destination and the default mode.
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            src: src.into(),
            dst: String::new(),
            dst_dir: String::new(),
            perm: default_perm_mode(),
        }
    }

    /// Returns `true` when the source is a URL rather than a local pattern.
    #[must_use]
    pub fn is_url(&self) -> bool {
        self.src.contains(URL_SCHEME_SEPARATOR)
    }

    /// The label shown to the user: `name` when set, otherwise `src`.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.src
        } else {
            &self.name
        }
    }
}

impl fmt::Display for FileSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
