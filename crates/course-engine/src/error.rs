/// Fatal errors raised while loading the course catalog.
///
/// Per-row problems (missing name, subcategory or skills, unparsable ratings) are not
/// errors: the normalizer drops or degrades those rows. A `LoadError` means the raw
/// source as a whole could not be used, and no catalog is built from it.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("error loading file {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    #[error("error parsing CSV at line {line}: {message}")]
    Parse { line: u64, message: String },
}

impl LoadError {
    pub fn fetch(source_name: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(line: u64, message: impl ToString) -> Self {
        Self::Parse {
            line,
            message: message.to_string(),
        }
    }
}
