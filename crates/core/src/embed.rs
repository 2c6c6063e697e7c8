// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedding seam for the external semantic cache.
//!
//! The cache itself lives outside the control plane; this trait is the
//! contract it programs against. Selection between implementations is
//! configuration, never reflection. The token-frequency fallback keeps
//! semantic lookups working when no model-backed embedder is installed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Maps text to a fixed-width vector.
pub trait Embedder: Send + Sync {
    fn dimensions(&self) -> usize;

    /// Embed one text. The returned vector has `dimensions()` entries.
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Hashed token-frequency embedder.
///
/// Lowercased alphanumeric tokens are hashed into a fixed number of
/// buckets and the bucket counts L2-normalized. Crude, but queries that
/// share words land near each other, which is all the exact-ish cache
/// fallback needs.
#[derive(Debug, Clone)]
pub struct TokenFrequencyEmbedder {
    dimensions: usize,
}

impl Default for TokenFrequencyEmbedder {
    fn default() -> Self {
        Self { dimensions: 256 }
    }
}

impl TokenFrequencyEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Embedder for TokenFrequencyEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimensions;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

/// Cosine similarity between two vectors of equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
#[path = "embed_tests.rs"]
mod tests;
