use docrank_embed::{get_default_embedder, EmbeddingOptions, FAKE_EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // Force fake embedder to avoid loading a large model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder("BAAI/bge-m3", &EmbeddingOptions::default()).expect("embedder");
    let embs = embedder.embed_batch(&["hello world", "hello world", "保險理賠"]).expect("embed_batch");
    let v1 = embs[0].as_ref().expect("encoded");
    let v2 = embs[1].as_ref().expect("encoded");

    assert_eq!(v1.len(), FAKE_EMBEDDING_DIM, "embedding dim matches");
    assert_eq!(embedder.dim(), FAKE_EMBEDDING_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
    assert!(embs[2].is_ok(), "CJK text encodes");
}
