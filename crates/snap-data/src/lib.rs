use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod roster;

pub use roster::{find_missing_cards, load_card_names};

/// Errors raised while reading the static card files
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("The file {0} does not exist.")]
    NotFound(PathBuf),

    #[error("{path}:{line_number}: expected `Card Name: ability text`, got {line:?}")]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DataError>;

/// Card name → ability text lookup, built from `card_abilities.txt`.
///
/// Every load builds a fresh map; nothing is cached between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardAbilities {
    abilities: HashMap<String, String>,
}

impl CardAbilities {
    /// Load the ability file at `path`.
    ///
    /// Each non-blank line must follow `Card Name: ability text`. A line with
    /// no colon fails the whole load so a broken reference file is noticed
    /// instead of silently losing cards.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_existing(path)?;
        let abilities = Self::parse_lines(&content, path)?;
        tracing::debug!(
            "Loaded {} card abilities from {}",
            abilities.len(),
            path.display()
        );
        Ok(abilities)
    }

    /// Parse ability lines from in-memory text.
    pub fn parse(content: &str) -> Result<Self> {
        Self::parse_lines(content, Path::new("<memory>"))
    }

    fn parse_lines(content: &str, origin: &Path) -> Result<Self> {
        let mut abilities = HashMap::new();

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((name, ability)) = line.split_once(':') else {
                return Err(DataError::MalformedLine {
                    path: origin.to_path_buf(),
                    line_number: idx + 1,
                    line: line.to_string(),
                });
            };
            // Last occurrence wins on duplicate names
            abilities.insert(name.trim().to_string(), ability.trim().to_string());
        }

        Ok(Self { abilities })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.abilities.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.abilities.contains_key(name)
    }

    /// All known card names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.abilities
            .iter()
            .map(|(name, ability)| (name.as_str(), ability.as_str()))
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl FromIterator<(String, String)> for CardAbilities {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            abilities: iter.into_iter().collect(),
        }
    }
}

pub(crate) fn read_existing(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
