//! Exact cosine ranking over stored question embeddings.
//!
//! No index, no approximation: the candidate set is already narrowed by
//! metadata filters and fits in memory, so every candidate is scored
//! against the query vector and sorted.

use edugenius_core::types::{Question, ScoredQuestion};

/// Cosine similarity between two vectors.
///
/// Returns exactly 0.0 when either vector is empty, the lengths differ,
/// or either norm is zero. A mis-embedded row scores zero instead of
/// erroring so one bad vector cannot fail a whole search.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Similarity expressed as a percentage with two decimals.
/// Rounds half away from zero (`f32::round` semantics).
pub fn as_percentage(similarity: f32) -> f32 {
    (similarity * 10_000.0).round() / 100.0
}

/// Score candidates against the query vector and return the top `limit`
/// as percentages, sorted by descending similarity.
///
/// Sorting happens on the raw cosine before rounding, and the sort is
/// stable: candidates with equal scores keep their store order.
pub fn rank(candidates: Vec<Question>, query: &[f32], limit: usize) -> Vec<ScoredQuestion> {
    let mut scored: Vec<(f32, Question)> = candidates
        .into_iter()
        .map(|q| (cosine_similarity(query, &q.embedding), q))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
        .into_iter()
        .map(|(s, question)| ScoredQuestion {
            question,
            similarity: as_percentage(s),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use edugenius_core::types::QuestionType;

    fn question(id: i64, embedding: Vec<f32>) -> Question {
        Question {
            id,
            subject: "math".into(),
            grade_level: None,
            difficulty: 3,
            question_type: QuestionType::ShortAnswer,
            topic: None,
            question_text: format!("question {id}"),
            options: None,
            correct_answer: "42".into(),
            explanation: None,
            tags: None,
            embedding,
            usage_count: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_cosine_identity() {
        let v = vec![0.3, 0.5, 0.8, 0.1];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_symmetry() {
        let a = vec![0.2, 0.9, 0.4];
        let b = vec![0.7, 0.1, 0.5];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_zero_cases() {
        // Empty vectors
        assert_eq!(cosine_similarity(&[], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        // Zero norm
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        // Mismatched lengths score zero, never error
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite_is_negative() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(as_percentage(1.0), 100.0);
        assert_eq!(as_percentage(0.5), 50.0);
        assert_eq!(as_percentage(0.123456), 12.35);
        assert_eq!(as_percentage(-0.5), -50.0);
        assert_eq!(as_percentage(0.0), 0.0);
    }

    #[test]
    fn test_rank_orders_descending() {
        let candidates = vec![
            question(1, vec![0.0, 1.0]),
            question(2, vec![1.0, 0.0]),
            question(3, vec![0.9, 0.1]),
        ];
        let hits = rank(candidates, &[1.0, 0.0], 5);
        let ids: Vec<i64> = hits.iter().map(|h| h.question.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert_eq!(hits[0].similarity, 100.0);
        assert!(hits[1].similarity < 100.0);
        for pair in hits.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_rank_truncates_to_limit() {
        let candidates = (1..=10).map(|i| question(i, vec![1.0, 0.0])).collect();
        let hits = rank(candidates, &[1.0, 0.0], 3);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_rank_ties_keep_store_order() {
        let candidates = vec![
            question(7, vec![1.0, 0.0]),
            question(8, vec![1.0, 0.0]),
            question(9, vec![2.0, 0.0]),
        ];
        let hits = rank(candidates, &[1.0, 0.0], 5);
        // All three score 100%; stable sort preserves insertion order
        let ids: Vec<i64> = hits.iter().map(|h| h.question.id).collect();
        assert_eq!(ids, vec![7, 8, 9]);
    }

    #[test]
    fn test_rank_unscoreable_candidate_sorts_last() {
        let candidates = vec![question(1, vec![]), question(2, vec![1.0, 0.0])];
        let hits = rank(candidates, &[1.0, 0.0], 5);
        assert_eq!(hits[0].question.id, 2);
        assert_eq!(hits[1].question.id, 1);
        assert_eq!(hits[1].similarity, 0.0);
    }
}
