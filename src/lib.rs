//! Skill-profile scoring and sport recommendation.
//!
//! Free-text and questionnaire answers are scored against a skill ontology,
//! blended into one profile vector and ranked against a sport catalog by
//! cosine similarity.

pub mod catalog;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod history;
pub mod numeric;
pub mod ontology;
pub mod profile;
pub mod questionnaire;
pub mod recommender;
pub mod semantic;
pub mod skill_vector;
pub mod utils;

pub use catalog::SportCatalog;
#[cfg(feature = "bert")]
pub use embedding::BertEmbedder;
pub use embedding::{EmbeddingProvider, HashEmbedder};
pub use engine::{Analysis, EngineConfig, Explanation, ScoringEngine};
pub use error::{MatchError, Result};
pub use ontology::{Skill, SkillOntology};
pub use profile::ProfileCombiner;
pub use questionnaire::{Answer, Question, QuestionKind, Questionnaire, RawAnswer, RawAnswers, Submission};
pub use recommender::{Comparison, Recommendation, Recommender};
pub use semantic::{SemanticScorer, SEMANTIC_SCALE};
pub use skill_vector::SkillVector;
pub use utils::compute_cosine_similarity;
