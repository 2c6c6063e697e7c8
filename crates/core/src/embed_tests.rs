// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn vectors_have_configured_dimensions() {
    let embedder = TokenFrequencyEmbedder::new(64);
    assert_eq!(embedder.dimensions(), 64);
    assert_eq!(embedder.embed("hello world").len(), 64);
}

#[test]
fn embedding_is_deterministic() {
    let embedder = TokenFrequencyEmbedder::default();
    assert_eq!(
        embedder.embed("find the lock timeout"),
        embedder.embed("find the lock timeout")
    );
}

#[test]
fn vectors_are_normalized() {
    let embedder = TokenFrequencyEmbedder::default();
    let vector = embedder.embed("quota tracker state");
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let embedder = TokenFrequencyEmbedder::default();
    let vector = embedder.embed("   ");
    assert!(vector.iter().all(|v| *v == 0.0));
}

#[test]
fn similar_texts_score_higher_than_unrelated() {
    let embedder = TokenFrequencyEmbedder::default();
    let query = embedder.embed("search for lock timeout errors");
    let close = embedder.embed("lock timeout errors in search");
    let far = embedder.embed("banana smoothie recipe");

    assert!(
        cosine_similarity(&query, &close) > cosine_similarity(&query, &far)
    );
    assert!((cosine_similarity(&query, &close) - 1.0).abs() < 1e-5);
}

#[test]
fn cosine_similarity_edge_cases() {
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
}
