use std::sync::LazyLock;

use regex::Regex;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::ontology::SkillOntology;
use crate::skill_vector::SkillVector;
use crate::utils::{embedding_cosine_similarity, round_to};

/// Mean similarities are multiplied by this to land on a Likert-like 0-10 range.
pub const SEMANTIC_SCALE: f64 = 10.0;

// Literal pattern, compiled on first use.
static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence boundary pattern is valid"));

/// Scores free text against the skill descriptions of an ontology.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemanticScorer;

impl SemanticScorer {
    pub fn new() -> Self {
        Self
    }

    /// Splits on runs of `.`, `!` and `?`, dropping blank fragments.
    pub fn split_sentences<'t>(&self, text: &'t str) -> Vec<&'t str> {
        SENTENCE_BOUNDARY
            .split(text.trim())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Mean cosine similarity of each sentence to every skill, scaled by
    /// [`SEMANTIC_SCALE`] and rounded to two decimals. Text without any
    /// sentence maps every skill to `0.0`.
    pub fn score(
        &self,
        text: &str,
        ontology: &SkillOntology,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<SkillVector> {
        let sentences = self.split_sentences(text);
        if sentences.is_empty() {
            return Ok(SkillVector::zeros(ontology.names()));
        }

        let embeddings = embedder.encode(&sentences)?;
        if embeddings.len() != sentences.len() {
            return Err(anyhow::anyhow!(
                "embedding provider returned {} vectors for {} sentences",
                embeddings.len(),
                sentences.len()
            )
            .into());
        }
        let dimension = ontology.dimension();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimension) {
            return Err(anyhow::anyhow!(
                "embedding provider returned a {}-dimensional sentence vector, skills use {}",
                bad.len(),
                dimension
            )
            .into());
        }

        let mut totals = vec![0.0f64; ontology.len()];
        for embedding in &embeddings {
            for (total, skill) in totals.iter_mut().zip(ontology.skills()) {
                *total += embedding_cosine_similarity(embedding, &skill.embedding);
            }
        }

        let count = sentences.len() as f64;
        tracing::debug!(sentences = sentences.len(), "scored free text against skills");

        Ok(ontology
            .skills()
            .iter()
            .zip(totals)
            .map(|(skill, total)| {
                (
                    skill.name.clone(),
                    round_to(total / count * SEMANTIC_SCALE, 2),
                )
            })
            .collect())
    }
}
