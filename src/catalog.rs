use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::skill_vector::SkillVector;

#[derive(Serialize, Deserialize)]
struct CatalogFile {
    sports: IndexMap<String, SkillVector>,
}

#[derive(Serialize)]
struct CatalogFileRef<'a> {
    sports: &'a IndexMap<String, SkillVector>,
}

/// Sports and their ideal skill weights, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SportCatalog {
    sports: IndexMap<String, SkillVector>,
    normalized: bool,
}

impl SportCatalog {
    /// Reads `{ "sports": { name: { skill: weight } } }` JSON from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let file: CatalogFile = serde_json::from_reader(reader)
            .map_err(|e| MatchError::MalformedCatalog(e.to_string()))?;
        Self::from_sports(file.sports)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_reader(json.as_bytes())
    }

    pub fn from_sports(sports: IndexMap<String, SkillVector>) -> Result<Self> {
        for (sport, weights) in &sports {
            if let Some((skill, weight)) = weights.iter().find(|(_, w)| !w.is_finite()) {
                return Err(MatchError::MalformedCatalog(format!(
                    "sport '{sport}' has a non-finite weight {weight} for '{skill}'"
                )));
            }
        }
        tracing::info!(sports = sports.len(), "sport catalog loaded");
        Ok(Self {
            sports,
            normalized: false,
        })
    }

    /// A copy with every sport vector scaled to unit length on its own.
    /// Sports with all-zero weights are kept as they are.
    pub fn normalize(&self) -> Self {
        let sports = self
            .sports
            .iter()
            .map(|(name, weights)| (name.clone(), weights.normalize_l2()))
            .collect();
        tracing::debug!(sports = self.sports.len(), "sport catalog normalized");
        Self {
            sports,
            normalized: true,
        }
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    pub fn get(&self, sport: &str) -> Result<&SkillVector> {
        self.sports
            .get(sport)
            .ok_or_else(|| MatchError::UnknownSport(sport.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sports.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SkillVector)> {
        self.sports.iter().map(|(name, weights)| (name.as_str(), weights))
    }

    pub fn len(&self) -> usize {
        self.sports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sports.is_empty()
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(
            writer,
            &CatalogFileRef {
                sports: &self.sports,
            },
        )
        .map_err(|e| MatchError::MalformedCatalog(e.to_string()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| MatchError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(|e| MatchError::io(path, e))
    }
}
