/// Cosine similarity of two equally sized vectors.
///
/// Returns 0.0 when either vector has zero length instead of dividing by zero.
pub fn compute_cosine_similarity(vec1: &[f64], vec2: &[f64]) -> f64 {
    let dot: f64 = vec1.iter().zip(vec2).map(|(a, b)| a * b).sum();
    let norm1 = l2_norm(vec1);
    let norm2 = l2_norm(vec2);
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }
    dot / (norm1 * norm2)
}

/// Same as [`compute_cosine_similarity`] for `f32` embeddings.
pub fn embedding_cosine_similarity(vec1: &[f32], vec2: &[f32]) -> f64 {
    if vec1.len() != vec2.len() {
        tracing::warn!(
            a_len = vec1.len(),
            b_len = vec2.len(),
            "embedding dimension mismatch; returning zero similarity"
        );
        return 0.0;
    }
    let dot: f64 = vec1
        .iter()
        .zip(vec2)
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum();
    let norm1 = vec1.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm2 = vec2.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }
    dot / (norm1 * norm2)
}

pub fn l2_norm(values: &[f64]) -> f64 {
    values.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Scales an embedding to unit length in place. Zero vectors are left alone.
pub fn normalize_embedding(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
