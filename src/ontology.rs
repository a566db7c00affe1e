use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::embedding::EmbeddingProvider;
use crate::error::{MatchError, Result};

#[derive(Debug, Clone)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub embedding: Vec<f32>,
}

/// Ordered set of skills with their description embeddings.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct SkillOntology {
    skills: Vec<Skill>,
    index: HashMap<String, usize>,
}

/// JSON object entries in document order, duplicates included.
struct OrderedEntries(Vec<(String, serde_json::Value)>);

impl<'de> Deserialize<'de> for OrderedEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = OrderedEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of skill name to description")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, serde_json::Value>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

impl SkillOntology {
    /// Reads `{ skill_name: description }` JSON from a file.
    pub fn load(path: impl AsRef<Path>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        Self::from_reader(BufReader::new(file), embedder)
    }

    pub fn from_reader<R: Read>(reader: R, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let entries: OrderedEntries = serde_json::from_reader(reader)
            .map_err(|e| MatchError::MalformedOntology(e.to_string()))?;

        let mut pairs = Vec::with_capacity(entries.0.len());
        for (name, value) in entries.0 {
            match value {
                serde_json::Value::String(description) => pairs.push((name, description)),
                other => {
                    return Err(MatchError::MalformedOntology(format!(
                        "description of '{name}' must be a string, got {other}"
                    )))
                }
            }
        }
        Self::from_descriptions(pairs, embedder)
    }

    pub fn from_json_str(json: &str, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        Self::from_reader(json.as_bytes(), embedder)
    }

    /// Validates the (name, description) pairs and embeds every description
    /// in a single batch.
    pub fn from_descriptions(
        pairs: Vec<(String, String)>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        if pairs.is_empty() {
            return Err(MatchError::MalformedOntology("no skills defined".into()));
        }

        let mut index = HashMap::with_capacity(pairs.len());
        for (position, (name, description)) in pairs.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(MatchError::MalformedOntology("empty skill name".into()));
            }
            if description.trim().is_empty() {
                return Err(MatchError::MalformedOntology(format!(
                    "skill '{name}' has an empty description"
                )));
            }
            if index.insert(name.clone(), position).is_some() {
                return Err(MatchError::MalformedOntology(format!(
                    "duplicate skill '{name}'"
                )));
            }
        }

        let descriptions: Vec<&str> = pairs.iter().map(|(_, d)| d.as_str()).collect();
        let embeddings = embedder.encode(&descriptions)?;
        if embeddings.len() != pairs.len() {
            return Err(anyhow::anyhow!(
                "embedding provider returned {} vectors for {} skill descriptions",
                embeddings.len(),
                pairs.len()
            )
            .into());
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != embeddings[0].len()) {
            return Err(anyhow::anyhow!(
                "embedding provider returned vectors of mixed dimensions ({} and {})",
                embeddings[0].len(),
                bad.len()
            )
            .into());
        }

        let skills: Vec<Skill> = pairs
            .into_iter()
            .zip(embeddings)
            .map(|((name, description), embedding)| Skill {
                name,
                description,
                embedding,
            })
            .collect();

        tracing::info!(
            skills = skills.len(),
            embedder = embedder.name(),
            "skill ontology loaded"
        );

        Ok(Self { skills, index })
    }

    /// Skill names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.index.contains_key(skill)
    }

    pub fn get(&self, skill: &str) -> Result<&Skill> {
        self.index
            .get(skill)
            .map(|&i| &self.skills[i])
            .ok_or_else(|| MatchError::UnknownSkill(skill.to_string()))
    }

    pub fn embedding_of(&self, skill: &str) -> Result<&[f32]> {
        self.get(skill).map(|s| s.embedding.as_slice())
    }

    /// Length shared by every skill embedding.
    pub fn dimension(&self) -> usize {
        self.skills.first().map_or(0, |s| s.embedding.len())
    }
}
