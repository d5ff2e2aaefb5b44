use std::fs;

use tempfile::TempDir;

use docrank_cli::{run_retrieve, RetrieveArgs};
use docrank_core::answers::AnswerFile;
use docrank_core::config::Settings;
use docrank_engine::StrategyKind;

fn args(tmp: &TempDir) -> RetrieveArgs {
    fs::write(
        tmp.path().join("questions.json"),
        r#"{"questions": [
            {"qid": 11, "source": [4, 5], "query": "how is the deductible applied?", "category": "insurance"},
            {"qid": 12, "source": [6], "query": "anything", "category": "insurance"}
        ]}"#,
    )
    .unwrap();
    let source = tmp.path().join("processed");
    fs::create_dir_all(&source).unwrap();
    fs::write(
        source.join("insurance.json"),
        r#"{"4": "premiums are due monthly", "5": "the deductible is applied per claim", "6": ""}"#,
    )
    .unwrap();
    RetrieveArgs {
        question_path: tmp.path().join("questions.json"),
        source_dir: source,
        output_dir: tmp.path().join("out"),
        strategy: StrategyKind::Bm25,
        model_name: None,
        window: None,
        overlap: None,
        pool_size: None,
        timeout_secs: None,
        whole_document: false,
        quiet: true,
    }
}

#[test]
fn bm25_run_writes_named_answer_file() {
    let tmp = TempDir::new().unwrap();
    let args = args(&tmp);

    let path = run_retrieve(&args, Settings::default()).expect("run");
    assert_eq!(path, tmp.path().join("out").join("bm25.json"));

    let answers = AnswerFile::read(&path).unwrap();
    let pairs: Vec<(i64, i64)> = answers.answers.iter().map(|a| (a.qid, a.retrieve)).collect();
    assert_eq!(pairs, vec![(11, 5), (12, 6)]);
}

#[test]
fn concurrent_run_gives_the_same_answers() {
    let tmp = TempDir::new().unwrap();
    let mut args = args(&tmp);
    args.pool_size = Some(4);
    args.window = Some(16);
    args.overlap = Some(4);

    let path = run_retrieve(&args, Settings::default()).expect("run");
    let pairs: Vec<(i64, i64)> = AnswerFile::read(&path).unwrap().answers.iter().map(|a| (a.qid, a.retrieve)).collect();
    assert_eq!(pairs, vec![(11, 5), (12, 6)]);
}

#[test]
fn invalid_overrides_are_rejected() {
    let tmp = TempDir::new().unwrap();
    let mut args = args(&tmp);
    args.overlap = Some(450);
    assert!(run_retrieve(&args, Settings::default()).is_err());
}

#[test]
fn model_strategy_without_model_fails() {
    let tmp = TempDir::new().unwrap();
    let mut args = args(&tmp);
    args.strategy = StrategyKind::Reranker;
    let err = run_retrieve(&args, Settings::default()).unwrap_err();
    assert!(err.to_string().contains("requires a model name"), "{}", err);
}

#[test]
fn whole_document_run_answers() {
    let tmp = TempDir::new().unwrap();
    let mut args = args(&tmp);
    args.whole_document = true;

    let mut settings = Settings::default();
    args.apply(&mut settings);
    assert!(settings.engine.whole_document);

    let path = run_retrieve(&args, Settings::default()).expect("run");
    let pairs: Vec<(i64, i64)> = AnswerFile::read(&path).unwrap().answers.iter().map(|a| (a.qid, a.retrieve)).collect();
    assert_eq!(pairs, vec![(11, 5), (12, 6)]);

    args.pool_size = Some(3);
    let path = run_retrieve(&args, Settings::default()).expect("concurrent run");
    let pairs: Vec<(i64, i64)> = AnswerFile::read(&path).unwrap().answers.iter().map(|a| (a.qid, a.retrieve)).collect();
    assert_eq!(pairs, vec![(11, 5), (12, 6)]);
}
