use std::path::{Path, PathBuf};
use std::time::Duration;

use course_engine::ranking::RatingOrder;

use crate::error::AppError;

/// Hard cap on how many recommendations a single call may return.
pub const MAX_RECOMMENDATIONS: usize = 50;

/// Where the course dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` values are URLs; anything else is a filesystem path.
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::File(PathBuf::from(value))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: DataSource,
    pub recommendation_limit: usize,
    pub rating_order: RatingOrder,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Required:
    /// - `COURSE_DATA_SOURCE` (CSV file path or http(s) URL)
    ///
    /// Optional:
    /// - `RECOMMENDATION_LIMIT` (default: 10, max: 50)
    /// - `RATING_TIE_BREAK` (`in_place` or `unknown_last`, default: `in_place`)
    /// - `FETCH_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, AppError> {
        let source = std::env::var("COURSE_DATA_SOURCE").map_err(|_| {
            AppError::Config("COURSE_DATA_SOURCE environment variable is required".to_string())
        })?;

        Self::from_values(
            &source,
            std::env::var("RECOMMENDATION_LIMIT").ok().as_deref(),
            std::env::var("RATING_TIE_BREAK").ok().as_deref(),
            std::env::var("FETCH_TIMEOUT_SECS").ok().as_deref(),
        )
    }

    fn from_values(
        source: &str,
        limit: Option<&str>,
        tie_break: Option<&str>,
        timeout_secs: Option<&str>,
    ) -> Result<Self, AppError> {
        let source = DataSource::parse(source.trim());
        if let DataSource::File(path) = &source {
            if !Path::new(path).exists() {
                return Err(AppError::Config(format!(
                    "course data file not found: {}",
                    path.display()
                )));
            }
        }

        let recommendation_limit = match limit {
            None => 10,
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_RECOMMENDATIONS).contains(n))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "RECOMMENDATION_LIMIT must be between 1 and {MAX_RECOMMENDATIONS}, got '{raw}'"
                    ))
                })?,
        };

        let rating_order = match tie_break {
            None => RatingOrder::default(),
            Some(raw) => raw
                .parse::<RatingOrder>()
                .map_err(|e| AppError::Config(format!("RATING_TIE_BREAK: {e}")))?,
        };

        let fetch_timeout = timeout_secs
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        Ok(Self {
            source,
            recommendation_limit,
            rating_order,
            fetch_timeout,
        })
    }
}
