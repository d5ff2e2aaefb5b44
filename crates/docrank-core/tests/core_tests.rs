use std::fs;
use tempfile::TempDir;

use docrank_core::answers::AnswerFile;
use docrank_core::config::{expand_path, Config, Settings};
use docrank_core::dataset::{load_ground_truths, Dataset};
use docrank_core::precision::calculate_precision;
use docrank_core::{Answer, Error};

fn write_fixture(dir: &std::path::Path) {
    fs::write(
        dir.join("questions.json"),
        r#"{"questions": [
            {"qid": 1, "source": [442, 115, 440], "query": "匯款銀行及中間行所收取之相關費用由誰負擔?", "category": "insurance"},
            {"qid": 2, "source": [7, 9], "query": "what is the deductible?", "category": "faq"}
        ]}"#,
    )
    .unwrap();
    let processed = dir.join("processed");
    fs::create_dir_all(&processed).unwrap();
    fs::write(
        processed.join("insurance.json"),
        r#"{"442": "匯款銀行及中間行所收取之相關費用，由要保人負擔。", "115": "", "440": "保險單借款"}"#,
    )
    .unwrap();
    fs::write(
        processed.join("faq.json"),
        r#"{"7": {"question": "deductible", "answers": ["a fixed amount"]}, "9": "card fees"}"#,
    )
    .unwrap();
}

#[test]
fn dataset_joins_questions_with_corpus_texts() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());

    let dataset = Dataset::load(&tmp.path().join("questions.json"), &tmp.path().join("processed")).expect("load");
    assert_eq!(dataset.len(), 2);

    let first = dataset.sample(0).expect("sample");
    assert_eq!(first.ids, vec![442, 115, 440]);
    assert_eq!(first.texts.len(), first.ids.len(), "texts stay parallel to ids");
    assert!(first.texts[0].starts_with("匯款銀行"));
    assert_eq!(first.texts[1], "", "empty documents are kept, not dropped");

    // structured faq entries are flattened to their JSON text
    let second = dataset.sample(1).expect("sample");
    assert!(second.texts[0].contains("deductible"));
    assert_eq!(second.texts[1], "card fees");
}

#[test]
fn missing_document_becomes_empty_text() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());
    fs::write(
        tmp.path().join("questions.json"),
        r#"{"questions": [{"qid": 3, "source": [442, 999], "query": "q", "category": "insurance"}]}"#,
    )
    .unwrap();

    let dataset = Dataset::load(&tmp.path().join("questions.json"), &tmp.path().join("processed")).unwrap();
    let sample = dataset.sample(0).unwrap();
    assert_eq!(sample.texts[1], "");
}

#[test]
fn stray_json_files_in_corpus_dir_are_skipped() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());
    let processed = tmp.path().join("processed");
    fs::write(processed.join("manifest.json"), r#"{"version": "2024-10", "files": 3}"#).unwrap();
    fs::write(processed.join("pages.json"), r#"[1, 2, 3]"#).unwrap();

    let dataset = Dataset::load(&tmp.path().join("questions.json"), &processed).expect("load");
    assert_eq!(dataset.sample(0).unwrap().ids, vec![442, 115, 440]);
    assert_eq!(dataset.sample(1).unwrap().texts[1], "card fees");
}

#[test]
fn unknown_category_is_an_error() {
    let tmp = TempDir::new().unwrap();
    write_fixture(tmp.path());
    fs::write(
        tmp.path().join("questions.json"),
        r#"{"questions": [{"qid": 4, "source": [1], "query": "q", "category": "legal"}]}"#,
    )
    .unwrap();

    let dataset = Dataset::load(&tmp.path().join("questions.json"), &tmp.path().join("processed")).unwrap();
    assert!(matches!(dataset.sample(0), Err(Error::Dataset(_))));
}

#[test]
fn answer_file_round_trip_preserves_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("bm25.json");

    let mut file = AnswerFile::new();
    for (qid, retrieve) in [(3, 17), (1, 392), (2, 5), (150, 0)] {
        file.push(Answer { qid, retrieve });
    }
    file.write(&path).expect("write");

    let back = AnswerFile::read(&path).expect("read");
    assert_eq!(back.len(), 4);
    assert_eq!(back, file);
    let qids: Vec<i64> = back.answers.iter().map(|a| a.qid).collect();
    assert_eq!(qids, vec![3, 1, 2, 150]);
}

#[test]
fn precision_against_ground_truth_file() {
    let tmp = TempDir::new().unwrap();
    let gt = tmp.path().join("ground_truths.json");
    fs::write(
        &gt,
        r#"{"ground_truths": [
            {"qid": 1, "retrieve": 392, "category": "insurance"},
            {"qid": 2, "retrieve": 428, "category": "finance"}
        ]}"#,
    )
    .unwrap();

    let truths = load_ground_truths(&gt).unwrap();
    let preds = vec![Answer { qid: 1, retrieve: 392 }, Answer { qid: 2, retrieve: 1 }];
    let report = calculate_precision(&truths, &preds).unwrap();
    assert_eq!(report.correct, 1);
    assert!((report.precision() - 0.5).abs() < 1e-9);
    assert_eq!(report.misses["finance"][0].predicted.retrieve, 1);
}

#[test]
fn config_file_overrides_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("docrank.toml"),
        "[chunking]\nwindow = 300\noverlap = 50\n\n[engine]\npool_size = 4\ntimeout_secs = 30\nwhole_document = true\n",
    )
    .unwrap();

    let settings = Config::load_from(tmp.path()).expect("config").settings().expect("settings");
    assert_eq!(settings.chunking.window, 300);
    assert_eq!(settings.chunking.overlap, 50);
    assert_eq!(settings.engine.pool_size, 4);
    assert_eq!(settings.engine.timeout().map(|d| d.as_secs()), Some(30));
    assert!(settings.engine.whole_document);
    assert_eq!(settings.model, Settings::default().model, "untouched sections keep defaults");
}

#[test]
fn config_rejects_invalid_chunking() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("docrank.toml"), "[chunking]\nwindow = 100\noverlap = 100\n").unwrap();
    assert!(matches!(Config::load_from(tmp.path()), Err(Error::Config(_))));
}

#[test]
fn model_dir_expands_environment_variables() {
    std::env::set_var("DOCRANK_TEST_MODEL_ROOT", "/data/models");
    assert_eq!(expand_path("${DOCRANK_TEST_MODEL_ROOT}/bge"), std::path::PathBuf::from("/data/models/bge"));
    assert_eq!(expand_path("$DOCRANK_UNSET_VARIABLE/bge"), std::path::PathBuf::from("$DOCRANK_UNSET_VARIABLE/bge"));
}
