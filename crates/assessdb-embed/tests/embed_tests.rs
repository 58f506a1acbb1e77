use assessdb_core::config::EmbeddingConfig;
use assessdb_core::traits::Embedder;
use assessdb_embed::{get_default_embedder, FakeEmbedder, MINILM_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading the model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder(&EmbeddingConfig::default()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), MINILM_DIM);
    assert_eq!(embedder.dim(), MINILM_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_separates_different_texts() {
    let embedder = FakeEmbedder::new(64);
    let embs = embedder
        .embed_batch(&["numerical reasoning".to_string(), "java programming".to_string()])
        .unwrap();
    assert_ne!(embs[0], embs[1]);
    assert!(embedder.embed_batch(&[]).unwrap().is_empty());
}
