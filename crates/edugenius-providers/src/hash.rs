//! Hash-based embeddings — deterministic, offline, no API required.
//!
//! Each whitespace token is hashed into one of `dimension` buckets with a
//! sign bit, accumulated, then L2-normalized. Texts sharing tokens land in
//! shared buckets, so cosine over these vectors approximates token overlap.
//! Good enough for local setups and tests; swap in a real provider for
//! production-quality similarity.

use async_trait::async_trait;
use edugenius_core::error::Result;
use edugenius_core::traits::Embedder;
use sha2::{Digest, Sha256};

const MIN_DIMENSION: usize = 8;

pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(MIN_DIMENSION),
        }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;

        for token in text.to_lowercase().split_whitespace() {
            tokens += 1;
            let digest = Sha256::digest(token.as_bytes());
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&digest[..8]);
            let idx = (u64::from_le_bytes(raw) % self.dimension as u64) as usize;
            let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        // Nothing to embed; callers fall back to unranked results
        if tokens == 0 {
            return Ok(Vec::new());
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("What is photosynthesis?").await.unwrap();
        let b = embedder.embed("What is photosynthesis?").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_dimension_respected() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("hello world").await.unwrap();
        assert_eq!(v.len(), 64);
    }

    #[tokio::test]
    async fn test_dimension_floor() {
        let embedder = HashEmbedder::new(1);
        let v = embedder.embed("hello").await.unwrap();
        assert_eq!(v.len(), MIN_DIMENSION);
    }

    #[tokio::test]
    async fn test_unit_norm() {
        let embedder = HashEmbedder::new(384);
        let v = embedder.embed("solve for x in 2x + 3 = 7").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_blank_text_embeds_to_nothing() {
        let embedder = HashEmbedder::new(384);
        assert!(embedder.embed("").await.unwrap().is_empty());
        assert!(embedder.embed("   \t\n").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_case_insensitive_tokens() {
        let embedder = HashEmbedder::new(384);
        let a = embedder.embed("Quadratic Equation").await.unwrap();
        let b = embedder.embed("quadratic equation").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_repeated_token_accumulates() {
        let embedder = HashEmbedder::new(384);
        let once = embedder.embed("algebra").await.unwrap();
        let twice = embedder.embed("algebra algebra").await.unwrap();
        // Same direction after normalization
        assert!((dot(&once, &twice) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_token_overlap_scores_higher() {
        let embedder = HashEmbedder::new(384);
        let base = embedder.embed("solve the quadratic equation").await.unwrap();
        let near = embedder.embed("solve the linear equation").await.unwrap();
        let far = embedder.embed("ancient rome emperor list").await.unwrap();
        assert!(dot(&base, &near) > dot(&base, &far));
    }
}
