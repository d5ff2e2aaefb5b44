//! The answer file: `{"answers": [{"qid": .., "retrieve": ..}, ...]}`.
//!
//! Written with four-space indentation and raw UTF-8 (non-ASCII is never
//! escaped).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Answer;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerFile {
    pub answers: Vec<Answer>,
}

impl AnswerFile {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, answer: Answer) { self.answers.push(answer); }

    pub fn len(&self) -> usize { self.answers.len() }

    pub fn is_empty(&self) -> bool { self.answers.is_empty() }

    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_four_space_indent() {
        let mut file = AnswerFile::new();
        file.push(Answer { qid: 1, retrieve: 392 });
        let json = file.to_json_string().unwrap();
        assert!(json.contains("\n    \"answers\""));
        assert!(json.contains("\"retrieve\": 392"));
    }

    #[test]
    fn serialized_text_parses_back() {
        let mut file = AnswerFile::new();
        file.push(Answer { qid: 7, retrieve: -3 });
        file.push(Answer { qid: 8, retrieve: 1024 });
        let json = file.to_json_string().unwrap();
        assert_eq!(AnswerFile::from_json_str(&json).unwrap(), file);
    }
}
