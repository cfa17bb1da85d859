use course_engine::error::LoadError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("config error: {0}")]
    Config(String),

    #[error("unknown subcategory: {0}")]
    UnknownSubcategory(String),

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}
