use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Column headers of the course dataset. Matching is exact and case-sensitive.
pub mod columns {
    pub const COURSE_NAME: &str = "Course Name";
    pub const ORGANIZATION: &str = "Organization";
    pub const SUBCATEGORY: &str = "Subcategory";
    pub const SKILLS: &str = "Skills";
    pub const RATINGS: &str = "Ratings";
    pub const DIFFICULTY: &str = "Difficulty";
    pub const DURATION: &str = "Duration";
    pub const TYPE: &str = "Type";
    pub const STUDENTS_ENROLLED: &str = "course_students_enrolled";
    pub const DESCRIPTION: &str = "course_description";
    pub const URL: &str = "course_url";

    /// Columns a row must carry (non-empty) to become a course.
    pub const REQUIRED: [&str; 3] = [COURSE_NAME, SUBCATEGORY, SKILLS];
}

/// A single raw cell as handed over by the tabular parser.
///
/// CSV tokenizers produce text; other producers (JSON fixtures, typed loaders) may
/// already hand over numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    /// Text content of the cell, `None` for numeric cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawField::Text(s) => Some(s),
            RawField::Number(_) => None,
        }
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

/// One parsed row: column header -> raw cell. Columns may be missing.
pub type RawRow = HashMap<String, RawField>;

/// Course rating as found in the source data.
///
/// `Absent` and `Unparsable` are both "unknown" for ranking purposes; they are never
/// treated as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rating {
    Known(f64),
    Absent,
    Unparsable(String),
}

impl Rating {
    pub fn value(&self) -> Option<f64> {
        match self {
            Rating::Known(v) => Some(*v),
            Rating::Absent | Rating::Unparsable(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Rating::Known(_))
    }
}

/// A validated learning resource (one row of the dataset after normalization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course title, always non-empty
    pub name: String,
    pub organization: Option<String>,
    /// Subcategory, always non-empty
    pub subcategory: String,
    /// Skill tokens in source order. May contain repeats; matching treats it as a set.
    pub skills: Vec<String>,
    pub rating: Rating,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    pub course_type: Option<String>,
    pub students_enrolled: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl CourseRecord {
    /// Deduplication key: the URL when present, otherwise the course name.
    pub fn identity_key(&self) -> &str {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.name,
        }
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// A course scored against the current skill selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCourse {
    pub course: Arc<CourseRecord>,
    /// Selected skills taught by the course, in selection order
    pub matched_skills: Vec<String>,
    pub match_count: usize,
    /// Percentage of the selection covered, in [0, 100]
    pub score: f64,
    /// Course skills outside the selection, in the course's own order
    pub bonus_skills: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(name: &str, url: Option<&str>) -> CourseRecord {
        CourseRecord {
            name: name.to_string(),
            organization: None,
            subcategory: "Programming".to_string(),
            skills: vec!["Python".to_string()],
            rating: Rating::Absent,
            difficulty: None,
            duration: None,
            course_type: None,
            students_enrolled: None,
            description: None,
            url: url.map(str::to_string),
        }
    }

    #[test]
    fn identity_key_prefers_url() {
        assert_eq!(
            course("Intro", Some("https://example.com/intro")).identity_key(),
            "https://example.com/intro"
        );
        assert_eq!(course("Intro", None).identity_key(), "Intro");
        assert_eq!(course("Intro", Some("")).identity_key(), "Intro");
    }

    #[test]
    fn raw_field_accepts_numbers_and_text() {
        let row: RawRow =
            serde_json::from_str(r#"{"Ratings": 4.5, "Course Name": "Intro"}"#).unwrap();
        assert_eq!(row["Ratings"], RawField::Number(4.5));
        assert_eq!(row["Course Name"].as_text(), Some("Intro"));
    }

    #[test]
    fn unknown_ratings_have_no_value() {
        assert_eq!(Rating::Known(4.2).value(), Some(4.2));
        assert_eq!(Rating::Absent.value(), None);
        assert_eq!(Rating::Unparsable("n/a".to_string()).value(), None);
    }
}
