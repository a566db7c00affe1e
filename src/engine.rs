//! The scoring pipeline as one immutable context object.
//!
//! A [`ScoringEngine`] owns the ontology, the catalog and the embedding
//! provider, and decides once whether profiles and sports live in raw or
//! L2-normalized space. Nothing per-request is stored on it, so a shared
//! reference can serve any number of submissions.

use serde::Serialize;

use crate::catalog::SportCatalog;
use crate::embedding::EmbeddingProvider;
use crate::error::{MatchError, Result};
use crate::numeric;
use crate::ontology::SkillOntology;
use crate::profile::{ProfileCombiner, DEFAULT_NUMERIC_WEIGHT, DEFAULT_SEMANTIC_WEIGHT};
use crate::questionnaire::Submission;
use crate::recommender::{Comparison, Recommendation, Recommender, DEFAULT_DIFF_SKILLS};
use crate::semantic::SemanticScorer;
use crate::skill_vector::SkillVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub semantic_weight: f64,
    pub numeric_weight: f64,
    /// Compare unit-length profiles against unit-length sports.
    pub normalize: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            numeric_weight: DEFAULT_NUMERIC_WEIGHT,
            normalize: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        ProfileCombiner::new(self.semantic_weight, self.numeric_weight).map(|_| ())
    }
}

/// How a profile differs from one sport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub sport: String,
    pub differences: SkillVector,
    pub largest_gaps: SkillVector,
    pub closest_matches: SkillVector,
}

/// Everything computed for one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub semantic: SkillVector,
    pub numeric: SkillVector,
    pub profile: SkillVector,
    pub recommendations: Vec<Recommendation>,
    /// Gap to the best recommendation, absent when the catalog is empty.
    pub explanation: Option<Explanation>,
}

pub struct ScoringEngine<E> {
    ontology: SkillOntology,
    catalog: SportCatalog,
    embedder: E,
    scorer: SemanticScorer,
    combiner: ProfileCombiner,
}

impl<E: EmbeddingProvider> ScoringEngine<E> {
    pub fn new(
        ontology: SkillOntology,
        catalog: SportCatalog,
        embedder: E,
        config: EngineConfig,
    ) -> Result<Self> {
        let combiner = ProfileCombiner::new(config.semantic_weight, config.numeric_weight)?
            .with_normalization(config.normalize);
        let catalog = if config.normalize {
            catalog.normalize()
        } else {
            catalog
        };

        let unknown: Vec<String> = catalog
            .iter()
            .flat_map(|(_, weights)| weights.keys())
            .filter(|skill| !ontology.contains(skill))
            .map(str::to_string)
            .collect();
        if !unknown.is_empty() {
            tracing::warn!(
                skills = ?unknown,
                "sport catalog mentions skills outside the ontology; they never match a profile"
            );
        }

        tracing::info!(
            skills = ontology.len(),
            sports = catalog.len(),
            normalize = config.normalize,
            embedder = embedder.name(),
            "scoring engine ready"
        );

        Ok(Self {
            ontology,
            catalog,
            embedder,
            scorer: SemanticScorer::new(),
            combiner,
        })
    }

    pub fn ontology(&self) -> &SkillOntology {
        &self.ontology
    }

    /// The catalog in the engine's vector space.
    pub fn catalog(&self) -> &SportCatalog {
        &self.catalog
    }

    pub fn normalizes(&self) -> bool {
        self.combiner.normalizes()
    }

    fn recommender(&self) -> Recommender<'_> {
        Recommender::new(&self.catalog)
    }

    pub fn semantic_scores(&self, text: &str) -> Result<SkillVector> {
        self.scorer.score(text, &self.ontology, &self.embedder)
    }

    pub fn numeric_scores(&self, contributions: &[SkillVector]) -> SkillVector {
        numeric::aggregate(contributions, &self.ontology)
    }

    /// Combines with explicit weights, keeping the engine's normalization policy.
    pub fn combine(
        &self,
        semantic: &SkillVector,
        numeric: &SkillVector,
        semantic_weight: f64,
        numeric_weight: f64,
    ) -> Result<SkillVector> {
        let combiner = ProfileCombiner::new(semantic_weight, numeric_weight)?
            .with_normalization(self.normalizes());
        Ok(combiner.combine(semantic, numeric, &self.ontology))
    }

    /// Combines with the configured weights.
    pub fn profile(&self, semantic: &SkillVector, numeric: &SkillVector) -> SkillVector {
        self.combiner.combine(semantic, numeric, &self.ontology)
    }

    /// Brings an externally stored profile into the engine's vector space.
    pub fn conform(&self, profile: &SkillVector) -> SkillVector {
        if self.normalizes() {
            profile.normalize_l2()
        } else {
            profile.clone()
        }
    }

    pub fn recommend(&self, profile: &SkillVector, top_n: usize) -> Result<Vec<Recommendation>> {
        self.recommender().recommend(profile, top_n)
    }

    pub fn explain(&self, profile: &SkillVector, sport: &str) -> Result<SkillVector> {
        self.recommender().explain(profile, sport)
    }

    pub fn top_diff_skills(&self, profile: &SkillVector, sport: &str, n: usize) -> Result<SkillVector> {
        self.recommender().top_diff_skills(profile, sport, n)
    }

    pub fn min_diff_skills(&self, profile: &SkillVector, sport: &str, n: usize) -> Result<SkillVector> {
        self.recommender().min_diff_skills(profile, sport, n)
    }

    pub fn compare(
        &self,
        profile: &SkillVector,
        sport: &str,
        skills: Option<&[String]>,
    ) -> Result<Comparison> {
        self.recommender().compare(profile, sport, skills)
    }

    pub fn explanation(&self, profile: &SkillVector, sport: &str) -> Result<Explanation> {
        Ok(Explanation {
            sport: sport.to_string(),
            differences: self.explain(profile, sport)?,
            largest_gaps: self.top_diff_skills(profile, sport, DEFAULT_DIFF_SKILLS)?,
            closest_matches: self.min_diff_skills(profile, sport, DEFAULT_DIFF_SKILLS)?,
        })
    }

    /// Runs embed, score, aggregate, combine and recommend for one submission,
    /// then explains the gap to the best sport.
    pub fn analyze(&self, submission: &Submission, top_n: usize) -> Result<Analysis> {
        if top_n == 0 {
            return Err(MatchError::InvalidArgument(
                "top_n must be at least 1".into(),
            ));
        }

        let semantic = self.semantic_scores(&submission.open_text())?;
        let numeric = self.numeric_scores(&submission.contributions());
        let profile = self.profile(&semantic, &numeric);
        let recommendations = self.recommend(&profile, top_n)?;

        let explanation = match recommendations.first() {
            Some(best) => Some(self.explanation(&profile, &best.sport)?),
            None => None,
        };

        tracing::info!(
            answers = submission.answers.len(),
            best = recommendations.first().map(|r| r.sport.as_str()),
            "submission analyzed"
        );

        Ok(Analysis {
            semantic,
            numeric,
            profile,
            recommendations,
            explanation,
        })
    }
}
