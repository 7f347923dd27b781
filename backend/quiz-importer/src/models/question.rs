use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// Grouping key of a source question.
///
/// Quiz banks carry chapter numbers as integers, but appendices and
/// similar sections use free text ("Appendix A"). Numeric ids sort before
/// text ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum ChapterId {
    Number(i64),
    Text(String),
}

impl ChapterId {
    /// Numeric value of the id, also for text ids that hold an integer ("07").
    pub fn as_number(&self) -> Option<i64> {
        match self {
            ChapterId::Number(n) => Some(*n),
            ChapterId::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Text ids holding an integer become numbers, so `7` and `"07"` are
    /// the same chapter.
    pub fn normalized(&self) -> ChapterId {
        match self.as_number() {
            Some(n) => ChapterId::Number(n),
            None => self.clone(),
        }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterId::Number(n) => write!(f, "{}", n),
            ChapterId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ChapterId {
    fn from(value: i64) -> Self {
        ChapterId::Number(value)
    }
}

impl From<&str> for ChapterId {
    fn from(value: &str) -> Self {
        ChapterId::Text(value.to_string())
    }
}

impl From<String> for ChapterId {
    fn from(value: String) -> Self {
        ChapterId::Text(value)
    }
}

impl<'de> Deserialize<'de> for ChapterId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ChapterIdVisitor;

        impl de::Visitor<'_> for ChapterIdVisitor {
            type Value = ChapterId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a string chapter id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<ChapterId, E> {
                Ok(ChapterId::Number(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<ChapterId, E> {
                i64::try_from(v)
                    .map(ChapterId::Number)
                    .map_err(|_| E::custom(format!("chapter id {} is out of range", v)))
            }

            // Exported banks often store chapter numbers as floats (7.0)
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<ChapterId, E> {
                if v.is_finite() && v.fract() == 0.0 {
                    Ok(ChapterId::Number(v as i64))
                } else {
                    Ok(ChapterId::Text(v.to_string()))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ChapterId, E> {
                Ok(ChapterId::Text(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<ChapterId, E> {
                Ok(ChapterId::Text(v))
            }
        }

        deserializer.deserialize_any(ChapterIdVisitor)
    }
}

/// One multiple-choice question from a quiz bank.
///
/// Field aliases accept the column names used by exported banks
/// (`chapter_no`, `question_text`, `answerIndex`, `CHAPTER_TITLE`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(alias = "chapter_no")]
    pub chapter_id: ChapterId,
    #[serde(alias = "question_text")]
    pub text: String,
    #[serde(deserialize_with = "deserialize_options")]
    pub options: Vec<String>,
    /// 1-based position of the correct option
    #[serde(alias = "answerIndex", alias = "correct_answer")]
    pub correct_option_index: usize,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default, alias = "CHAPTER_TITLE")]
    pub chapter_title: Option<String>,
    #[serde(default)]
    pub system_category: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

impl QuestionRecord {
    pub fn new(
        chapter_id: impl Into<ChapterId>,
        text: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
    ) -> Self {
        Self {
            chapter_id: chapter_id.into(),
            text: text.into(),
            options,
            correct_option_index,
            topic: None,
            chapter_title: None,
            system_category: None,
            tag: None,
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_chapter_title(mut self, title: impl Into<String>) -> Self {
        self.chapter_title = Some(title.into());
        self
    }

    pub fn with_system_category(mut self, category: impl Into<String>) -> Self {
        self.system_category = Some(category.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OptionsRepr {
    List(Vec<String>),
    Text(String),
}

/// Options arrive either as a list, as a string holding a JSON list, or as
/// a comma separated string.
fn deserialize_options<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match OptionsRepr::deserialize(deserializer)? {
        OptionsRepr::List(options) => Ok(options),
        OptionsRepr::Text(raw) => Ok(parse_options_str(&raw)),
    }
}

pub fn parse_options_str(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(options) => options,
        Err(_) => raw.split(',').map(|opt| opt.trim().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_id_ordering() {
        let mut ids = vec![
            ChapterId::from("Appendix A"),
            ChapterId::from(10),
            ChapterId::from(2),
            ChapterId::from("Appendix B"),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                ChapterId::from(2),
                ChapterId::from(10),
                ChapterId::from("Appendix A"),
                ChapterId::from("Appendix B"),
            ]
        );
    }

    #[test]
    fn test_chapter_id_as_number() {
        assert_eq!(ChapterId::from(7).as_number(), Some(7));
        assert_eq!(ChapterId::from(" 07 ").as_number(), Some(7));
        assert_eq!(ChapterId::from("Appendix A").as_number(), None);
    }

    #[test]
    fn test_chapter_id_normalized() {
        assert_eq!(ChapterId::from("07").normalized(), ChapterId::Number(7));
        assert_eq!(ChapterId::from(7).normalized(), ChapterId::Number(7));
        assert_eq!(
            ChapterId::from("Appendix A").normalized(),
            ChapterId::from("Appendix A")
        );
    }

    #[test]
    fn test_chapter_id_deserialize_variants() {
        let ids: Vec<ChapterId> = serde_json::from_str(r#"[3, 4.0, "Appendix A", 2.5]"#).unwrap();
        assert_eq!(ids[0], ChapterId::Number(3));
        assert_eq!(ids[1], ChapterId::Number(4));
        assert_eq!(ids[2], ChapterId::Text("Appendix A".to_string()));
        assert_eq!(ids[3], ChapterId::Text("2.5".to_string()));
    }

    #[test]
    fn test_record_accepts_bank_column_names() {
        let json = r#"{
            "chapter_no": 1,
            "question_text": "What is 2 + 2?",
            "options": ["3", "4", "5"],
            "answerIndex": 2,
            "CHAPTER_TITLE": "Arithmetic",
            "topic": "Addition"
        }"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.chapter_id, ChapterId::Number(1));
        assert_eq!(record.text, "What is 2 + 2?");
        assert_eq!(record.correct_option_index, 2);
        assert_eq!(record.chapter_title.as_deref(), Some("Arithmetic"));
        assert_eq!(record.topic.as_deref(), Some("Addition"));
        assert!(record.system_category.is_none());
    }

    #[test]
    fn test_options_from_json_string() {
        assert_eq!(
            parse_options_str(r#"["Option A", "Option B"]"#),
            vec!["Option A".to_string(), "Option B".to_string()]
        );
    }

    #[test]
    fn test_options_from_comma_string() {
        let json = r#"{"chapter_id": "Appendix A", "text": "Q?", "options": "red, green ,blue", "correct_option_index": 1}"#;
        let record: QuestionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.options, vec!["red", "green", "blue"]);
    }
}
