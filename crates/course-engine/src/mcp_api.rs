use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{CourseRecord, Rating, ScoredCourse};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetSubcategoryParams {
    /// "All" or one of the names returned by list_subcategories.
    pub subcategory: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetQueryParams {
    /// Case-insensitive substring to filter skills by. Empty clears the filter.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SkillParams {
    /// Skill exactly as listed by available_skills.
    pub skill: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendParams {
    /// Maximum number of courses to return (default: server setting, max: 50).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCourseParams {
    /// Course key as returned in recommendations (URL, or name for courses without one).
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogStatusResponse {
    /// "ready" or "failed"
    pub state: String,
    pub course_count: usize,
    pub skill_count: usize,
    pub subcategory_count: usize,
    pub row_count: usize,
    pub dropped_rows: usize,
    pub duplicate_rows: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubcategoryListResponse {
    /// "All" first, then every subcategory in ascending order.
    pub subcategories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionResponse {
    pub subcategory: String,
    pub query: String,
    pub selected_skills: Vec<String>,
    /// Whether the call modified the selection.
    pub changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AvailableSkillsResponse {
    pub subcategory: String,
    pub query: String,
    pub count: usize,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RatingInfo {
    pub value: Option<f64>,
    /// Display text: the rating with one decimal, "No ratings" or "Invalid rating".
    pub label: String,
}

impl From<&Rating> for RatingInfo {
    fn from(rating: &Rating) -> Self {
        match rating {
            Rating::Known(v) => Self {
                value: Some(*v),
                label: format!("{v:.1}"),
            },
            Rating::Absent => Self {
                value: None,
                label: "No ratings".to_string(),
            },
            Rating::Unparsable(_) => Self {
                value: None,
                label: "Invalid rating".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseRecommendation {
    pub key: String,
    pub name: String,
    pub organization: Option<String>,
    pub subcategory: String,
    /// Score rounded to the nearest whole percent.
    pub match_percent: u32,
    pub score: f64,
    pub matched_count: usize,
    pub matched_skills: Vec<String>,
    pub bonus_skills: Vec<String>,
    pub rating: RatingInfo,
}

impl From<&ScoredCourse> for CourseRecommendation {
    fn from(scored: &ScoredCourse) -> Self {
        let course = &scored.course;
        Self {
            key: course.identity_key().to_string(),
            name: course.name.clone(),
            organization: course.organization.clone(),
            subcategory: course.subcategory.clone(),
            match_percent: scored.score.round() as u32,
            score: scored.score,
            matched_count: scored.match_count,
            matched_skills: scored.matched_skills.clone(),
            bonus_skills: scored.bonus_skills.clone(),
            rating: RatingInfo::from(&course.rating),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendationResponse {
    pub selected_count: usize,
    /// Number of matching courses before truncation to the limit.
    pub total_matches: usize,
    pub recommendations: Vec<CourseRecommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CourseDetailResponse {
    pub key: String,
    pub name: String,
    pub organization: Option<String>,
    pub subcategory: String,
    pub skills: Vec<String>,
    pub rating: RatingInfo,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    pub course_type: Option<String>,
    pub students_enrolled: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

impl From<&CourseRecord> for CourseDetailResponse {
    fn from(course: &CourseRecord) -> Self {
        Self {
            key: course.identity_key().to_string(),
            name: course.name.clone(),
            organization: course.organization.clone(),
            subcategory: course.subcategory.clone(),
            skills: course.skills.clone(),
            rating: RatingInfo::from(&course.rating),
            difficulty: course.difficulty.clone(),
            duration: course.duration.clone(),
            course_type: course.course_type.clone(),
            students_enrolled: course.students_enrolled.clone(),
            description: course.description.clone(),
            url: course.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReloadCatalogResponse {
    pub course_count: usize,
    pub skill_count: usize,
    pub dropped_rows: usize,
}
