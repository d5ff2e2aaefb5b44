use candle_core::{DType, Device, Tensor};
use docrank_embed::masked_mean_l2;

#[test]
fn masked_mean_l2_basic() {
    let dev = Device::Cpu;
    // Two tokens with hidden dim 4; second token is masked out.
    let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0,  // token 0
                                 5.0, 6.0, 7.0, 8.0],    // token 1
                               (1, 2, 4), &dev).unwrap();
    let mask = Tensor::from_slice(&[1i64, 0i64], (1, 2), &dev).unwrap()
        .to_dtype(DType::F32).unwrap();
    let out = masked_mean_l2(&h, &mask).unwrap();
    let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
    let v = &v[0];
    // Mean over unmasked tokens = first token [1,2,3,4], then L2 normalize
    let norm: f32 = (1.0f32*1.0 + 2.0*2.0 + 3.0*3.0 + 4.0*4.0).sqrt();
    let expected = [1.0/norm, 2.0/norm, 3.0/norm, 4.0/norm];
    for (a,b) in v.iter().cloned().zip(expected) {
        assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
    }
}

#[test]
fn pooling_follows_sentence_transformers_config() {
    use docrank_embed::Pooling;

    let tmp = tempfile::TempDir::new().unwrap();
    let cls = tmp.path().join("cls.json");
    std::fs::write(
        &cls,
        r#"{"word_embedding_dimension": 1024, "pooling_mode_cls_token": true, "pooling_mode_mean_tokens": false}"#,
    )
    .unwrap();
    let mean = tmp.path().join("mean.json");
    std::fs::write(&mean, r#"{"word_embedding_dimension": 768, "pooling_mode_cls_token": false, "pooling_mode_mean_tokens": true}"#)
        .unwrap();
    let garbage = tmp.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();

    assert_eq!(Pooling::from_config_file(Some(cls.as_path())), Pooling::Cls);
    assert_eq!(Pooling::from_config_file(Some(mean.as_path())), Pooling::Mean);
    assert_eq!(Pooling::from_config_file(Some(garbage.as_path())), Pooling::Mean);
    assert_eq!(Pooling::from_config_file(Some(tmp.path().join("missing.json").as_path())), Pooling::Mean);
    assert_eq!(Pooling::from_config_file(None), Pooling::Mean);
}
