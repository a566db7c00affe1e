//! Sentence embedding providers.
//!
//! The engine only needs "strings in, unit vectors out". [`HashEmbedder`] is a
//! deterministic, model-free provider; [`BertEmbedder`] (feature `bert`) runs the
//! all-MiniLM-L6-v2 sentence model through rust-bert.

use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

use crate::utils::normalize_embedding;

/// Anything that maps strings to fixed-length unit vectors.
pub trait EmbeddingProvider {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Embeds every text in one batch. The output has one vector per input,
    /// in input order, all of the same dimension and unit length.
    fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        (**self).encode(texts)
    }
}

// Changing these keys changes every embedding.
const HASH_SEED_K0: u64 = 0x0123_4567_89ab_cdef;
const HASH_SEED_K1: u64 = 0xfedc_ba98_7654_3210;

pub const DEFAULT_HASH_DIMENSION: usize = 384;

/// Feature-hashing embedder over lowercase words and character trigrams.
///
/// No model files, fully deterministic. Texts sharing vocabulary land close
/// together, which is enough for offline runs and tests.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn hash_token(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = self.hash_token(feature);
        let idx = (hash % self.dimension as u64) as usize;
        // High bit picks the sign so collisions tend to cancel out.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[idx] += sign * weight;
    }

    pub fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        let words = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty());

        for word in words {
            self.add_feature(&mut vector, &format!("w:{word}"), 1.0);
            let padded: Vec<char> = format!("#{word}#").chars().collect();
            for gram in padded.windows(3) {
                let gram: String = gram.iter().collect();
                self.add_feature(&mut vector, &format!("g:{gram}"), 0.5);
            }
        }

        normalize_embedding(&mut vector);
        vector
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed(text)).collect())
    }
}

#[cfg(feature = "bert")]
pub use bert::BertEmbedder;

#[cfg(feature = "bert")]
mod bert {
    use rust_bert::pipelines::sentence_embeddings::{
        SentenceEmbeddingsBuilder, SentenceEmbeddingsModel, SentenceEmbeddingsModelType,
    };

    use super::EmbeddingProvider;
    use crate::utils::normalize_embedding;

    /// all-MiniLM-L6-v2 sentence embeddings, downloaded on first use.
    pub struct BertEmbedder {
        model: SentenceEmbeddingsModel,
    }

    impl BertEmbedder {
        pub fn remote() -> anyhow::Result<Self> {
            let model = SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL6V2)
                .create_model()?;
            Ok(Self { model })
        }
    }

    impl EmbeddingProvider for BertEmbedder {
        fn name(&self) -> &str {
            "all-MiniLM-L6-v2"
        }

        fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            let mut embeddings = self.model.encode(texts)?;
            for embedding in &mut embeddings {
                normalize_embedding(embedding);
            }
            Ok(embeddings)
        }
    }
}
