//! Question and corpus loading.
//!
//! A processed corpus directory holds one JSON object per category
//! (`faq.json`, `finance.json`, `insurance.json`, ...) mapping the document id
//! (as a string key) to its extracted text.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{DocId, GroundTruth, Question, Sample};

#[derive(Deserialize)]
struct QuestionFile {
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct GroundTruthFile {
    ground_truths: Vec<GroundTruth>,
}

pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let file: QuestionFile = serde_json::from_str(&read_file_content(path)?)?;
    Ok(file.questions)
}

pub fn load_ground_truths(path: &Path) -> Result<Vec<GroundTruth>> {
    let file: GroundTruthFile = serde_json::from_str(&read_file_content(path)?)?;
    Ok(file.ground_truths)
}

fn read_file_content(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            Ok(String::from_utf8_lossy(&fs::read(path)?).to_string())
        }
        Err(e) => Err(Error::Dataset(format!("cannot read {}: {}", path.display(), e))),
    }
}

/// Document texts of one category.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: HashMap<DocId, String>,
}

impl Corpus {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
        let mut docs = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let id: DocId = key
                .trim()
                .parse()
                .map_err(|_| Error::Dataset(format!("document key '{}' is not an integer id", key)))?;
            let text = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            docs.insert(id, text);
        }
        Ok(Self { docs })
    }

    pub fn get(&self, id: DocId) -> Option<&str> {
        self.docs.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Ids whose text is empty, sorted.
    pub fn empty_ids(&self) -> Vec<DocId> {
        let mut ids: Vec<DocId> = self.docs.iter().filter(|(_, t)| t.is_empty()).map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids
    }
}

/// Questions joined with their per-category corpora.
#[derive(Debug, Clone)]
pub struct Dataset {
    questions: Vec<Question>,
    corpora: HashMap<String, Corpus>,
}

impl Dataset {
    /// Load `questions_path` and every `*.json` file under `processed_dir`
    /// (the file stem names the category). Files that are not id-to-text
    /// maps are skipped with a warning; a question naming their category
    /// then fails in [`Dataset::sample`].
    pub fn load(questions_path: &Path, processed_dir: &Path) -> Result<Self> {
        let questions = load_questions(questions_path)?;
        let mut corpora = HashMap::new();
        let mut entries: Vec<_> = fs::read_dir(processed_dir)
            .map_err(|e| Error::Dataset(format!("cannot list {}: {}", processed_dir.display(), e)))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        entries.sort();
        for path in entries {
            let Some(category) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else { continue };
            let corpus = match Corpus::from_json_str(&read_file_content(&path)?) {
                Ok(corpus) => corpus,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "not a corpus file, skipping");
                    continue;
                }
            };
            tracing::info!(category = %category, documents = corpus.len(), "loaded corpus");
            let empty = corpus.empty_ids();
            if !empty.is_empty() {
                tracing::debug!(category = %category, ?empty, "documents without text");
            }
            corpora.insert(category, corpus);
        }
        Ok(Self { questions, corpora })
    }

    pub fn len(&self) -> usize { self.questions.len() }

    pub fn is_empty(&self) -> bool { self.questions.is_empty() }

    pub fn questions(&self) -> &[Question] { &self.questions }

    /// Join question `index` with its candidate texts.
    ///
    /// An id absent from its category's corpus yields empty text, which ranks
    /// it last. An unknown category is an error.
    pub fn sample(&self, index: usize) -> Result<Sample> {
        let question = self
            .questions
            .get(index)
            .ok_or_else(|| Error::Dataset(format!("question index {} out of range", index)))?;
        let corpus = self.corpora.get(&question.category).ok_or_else(|| {
            Error::Dataset(format!("qid {}: unknown category '{}'", question.qid, question.category))
        })?;
        let texts = question
            .source
            .iter()
            .map(|id| match corpus.get(*id) {
                Some(text) => text.to_string(),
                None => {
                    tracing::warn!(qid = question.qid, doc = *id, category = %question.category, "document not found in corpus");
                    String::new()
                }
            })
            .collect();
        Ok(Sample {
            qid: question.qid,
            query: question.query.clone(),
            category: question.category.clone(),
            ids: question.source.clone(),
            texts,
        })
    }

    pub fn samples(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.questions.len()).map(move |i| self.sample(i))
    }
}
