use crate::error::{MatchError, Result};
use crate::ontology::SkillOntology;
use crate::skill_vector::SkillVector;
use crate::utils::round_to;

pub const DEFAULT_SEMANTIC_WEIGHT: f64 = 0.6;
pub const DEFAULT_NUMERIC_WEIGHT: f64 = 0.4;

/// Weighted blend of semantic and numeric skill scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileCombiner {
    semantic_weight: f64,
    numeric_weight: f64,
    normalize: bool,
}

impl Default for ProfileCombiner {
    fn default() -> Self {
        Self {
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            numeric_weight: DEFAULT_NUMERIC_WEIGHT,
            normalize: false,
        }
    }
}

impl ProfileCombiner {
    /// Weights must be finite and non-negative. They need not sum to one.
    pub fn new(semantic_weight: f64, numeric_weight: f64) -> Result<Self> {
        for (label, weight) in [("semantic", semantic_weight), ("numeric", numeric_weight)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchError::InvalidArgument(format!(
                    "{label} weight must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(Self {
            semantic_weight,
            numeric_weight,
            normalize: false,
        })
    }

    /// L2-normalize combined profiles.
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    /// `round(w_sem * semantic + w_num * numeric, 2)` for every ontology skill,
    /// then optionally scaled to unit length.
    pub fn combine(
        &self,
        semantic: &SkillVector,
        numeric: &SkillVector,
        ontology: &SkillOntology,
    ) -> SkillVector {
        let combined: SkillVector = ontology
            .names()
            .into_iter()
            .map(|skill| {
                let score = self.semantic_weight * semantic.get(skill)
                    + self.numeric_weight * numeric.get(skill);
                (skill, round_to(score, 2))
            })
            .collect();

        if self.normalize {
            combined.normalize_l2()
        } else {
            combined
        }
    }
}
