/// Catalog index: the deduplicated course list plus the derived skill taxonomy.
///
/// Built once from the raw rows and read-only afterwards. The subcategory set and the
/// skill vocabulary are collected from every valid row, before identity deduplication;
/// deduplication only affects which courses are listed.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::error::LoadError;
use crate::model::{CourseRecord, RawRow};
use crate::normalizer::normalize;

#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    courses: Vec<Arc<CourseRecord>>,
    by_key: HashMap<String, usize>,
    subcategories: Vec<String>,
    vocabulary: Vec<String>,
    row_count: usize,
    dropped_rows: usize,
    duplicate_rows: usize,
}

impl CatalogIndex {
    /// Build the index from already-parsed rows. Pure and deterministic in row order.
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut index = CatalogIndex::default();
        let mut subcategories = BTreeSet::new();
        let mut vocabulary = BTreeSet::new();

        for row in rows {
            index.row_count += 1;
            let Some(course) = normalize(&row) else {
                index.dropped_rows += 1;
                continue;
            };

            subcategories.insert(course.subcategory.clone());
            vocabulary.extend(course.skills.iter().cloned());

            let key = course.identity_key().to_string();
            if index.by_key.contains_key(&key) {
                index.duplicate_rows += 1;
                continue;
            }
            index.by_key.insert(key, index.courses.len());
            index.courses.push(Arc::new(course));
        }

        index.subcategories = subcategories.into_iter().collect();
        index.vocabulary = vocabulary.into_iter().collect();

        debug!(
            rows = index.row_count,
            courses = index.courses.len(),
            dropped = index.dropped_rows,
            duplicates = index.duplicate_rows,
            subcategories = index.subcategories.len(),
            skills = index.vocabulary.len(),
            "catalog index built"
        );
        index
    }

    /// Unique courses in first-seen order.
    pub fn courses(&self) -> &[Arc<CourseRecord>] {
        &self.courses
    }

    /// Distinct subcategories, ascending.
    pub fn subcategories(&self) -> &[String] {
        &self.subcategories
    }

    /// Distinct skill tokens across all valid rows, ascending.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn has_subcategory(&self, subcategory: &str) -> bool {
        self.subcategories
            .binary_search_by(|s| s.as_str().cmp(subcategory))
            .is_ok()
    }

    /// Look up a course by its identity key (URL, or name when there is no URL).
    pub fn course(&self, key: &str) -> Option<&Arc<CourseRecord>> {
        self.by_key.get(key).map(|&i| &self.courses[i])
    }

    /// Number of raw rows seen, valid or not.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Rows rejected for missing a required column.
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }

    /// Valid rows discarded because an earlier row had the same identity key.
    pub fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }
}

/// Build a catalog from the parser's row stream.
///
/// Any structural error from the parser aborts the whole load; no partially built
/// index escapes.
pub fn load_catalog<I>(rows: I) -> Result<CatalogIndex, LoadError>
where
    I: IntoIterator<Item = Result<RawRow, LoadError>>,
{
    let rows: Vec<RawRow> = rows.into_iter().collect::<Result<_, _>>()?;
    Ok(CatalogIndex::build(rows))
}
