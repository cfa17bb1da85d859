/// Mutable learner selection: subcategory, search query and chosen skills.
///
/// The session holds no derived state. Skill lists and rankings are recomputed from
/// (catalog, session) on every read, or memoized by [`SelectionSession::fingerprint`].
use sha2::{Digest, Sha256};

use crate::catalog::CatalogIndex;
use crate::filter::{available_skills, SubcategoryFilter};
use crate::model::ScoredCourse;
use crate::ranking::{rank_with, RatingOrder};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSession {
    subcategory: SubcategoryFilter,
    query: String,
    selected_skills: Vec<String>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subcategory(&self) -> &SubcategoryFilter {
        &self.subcategory
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Selected skills in insertion order.
    pub fn selected_skills(&self) -> &[String] {
        &self.selected_skills
    }

    pub fn set_subcategory(&mut self, subcategory: SubcategoryFilter) {
        self.subcategory = subcategory;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Append a skill. Returns `false` (and changes nothing) if it is already selected.
    pub fn add_skill(&mut self, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        if self.selected_skills.contains(&skill) {
            return false;
        }
        self.selected_skills.push(skill);
        true
    }

    /// Remove a skill. Returns `false` if it was not selected.
    pub fn remove_skill(&mut self, skill: &str) -> bool {
        let before = self.selected_skills.len();
        self.selected_skills.retain(|s| s != skill);
        self.selected_skills.len() != before
    }

    pub fn clear_skills(&mut self) {
        self.selected_skills.clear();
    }

    /// SHA-256 over the selected skills in order.
    ///
    /// Two sessions with the same fingerprint rank identically against the same
    /// catalog; the subcategory and query do not take part in ranking.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for skill in &self.selected_skills {
            hasher.update(skill.as_bytes());
            hasher.update(b"\x1f");
        }
        format!("{:x}", hasher.finalize())
    }

    /// Skill list for the current subcategory and query.
    pub fn available_skills(&self, catalog: &CatalogIndex) -> Vec<String> {
        available_skills(catalog, &self.subcategory, &self.query)
    }

    /// Ranked courses for the current selection.
    pub fn rank(&self, catalog: &CatalogIndex, order: RatingOrder) -> Vec<ScoredCourse> {
        rank_with(catalog, &self.selected_skills, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawField, RawRow};

    fn catalog() -> CatalogIndex {
        let rows = [
            ("Py", "Programming", "Python, SQL"),
            ("Viz", "Data Science", "Tableau, SQL"),
        ]
        .into_iter()
        .map(|(name, sub, skills)| {
            [("Course Name", name), ("Subcategory", sub), ("Skills", skills)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), RawField::from(v)))
                .collect::<RawRow>()
        });
        CatalogIndex::build(rows)
    }

    #[test]
    fn add_skill_is_idempotent_and_keeps_insertion_order() {
        let mut session = SelectionSession::new();
        assert!(session.add_skill("SQL"));
        assert!(session.add_skill("Python"));
        assert!(!session.add_skill("SQL"));
        assert_eq!(session.selected_skills(), ["SQL", "Python"]);
    }

    #[test]
    fn remove_absent_skill_is_noop() {
        let mut session = SelectionSession::new();
        session.add_skill("SQL");
        assert!(!session.remove_skill("Python"));
        assert!(session.remove_skill("SQL"));
        assert!(session.selected_skills().is_empty());
    }

    #[test]
    fn views_follow_every_mutation() {
        let idx = catalog();
        let mut session = SelectionSession::new();
        assert_eq!(session.available_skills(&idx), ["Python", "SQL", "Tableau"]);
        assert!(session.rank(&idx, RatingOrder::InPlace).is_empty());

        session.set_subcategory(SubcategoryFilter::parse("Data Science"));
        assert_eq!(session.available_skills(&idx), ["SQL", "Tableau"]);

        session.set_query("tab");
        assert_eq!(session.available_skills(&idx), ["Tableau"]);

        session.add_skill("Python");
        let ranked = session.rank(&idx, RatingOrder::InPlace);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].course.name, "Py");

        session.add_skill("SQL");
        assert_eq!(session.rank(&idx, RatingOrder::InPlace).len(), 2);

        session.remove_skill("Python");
        session.remove_skill("SQL");
        assert!(session.rank(&idx, RatingOrder::InPlace).is_empty());
    }

    #[test]
    fn fingerprint_tracks_selection_only() {
        let mut a = SelectionSession::new();
        a.add_skill("SQL");
        a.add_skill("Python");

        let mut b = a.clone();
        b.set_query("py");
        b.set_subcategory(SubcategoryFilter::parse("Programming"));
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut reordered = SelectionSession::new();
        reordered.add_skill("Python");
        reordered.add_skill("SQL");
        assert_ne!(a.fingerprint(), reordered.fingerprint());

        let mut joined = SelectionSession::new();
        joined.add_skill("SQLPython");
        assert_ne!(a.fingerprint(), joined.fingerprint());
    }
}
