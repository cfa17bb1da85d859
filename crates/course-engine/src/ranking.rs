/// Ranking engine: scores every catalog course against the selected skills.
///
/// Score is the share of the selection a course covers, as a percentage. Courses that
/// cover nothing are dropped. Ordering is by score descending, then rating descending,
/// and otherwise catalog order.
///
/// How unknown ratings take part in the tie-break is a policy, see [`RatingOrder`].
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogIndex;
use crate::model::ScoredCourse;

/// Placement of courses with an unknown rating inside a group of equal scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingOrder {
    /// Unknown-rated courses keep the slots they had in catalog order; known-rated
    /// courses are sorted by rating among the remaining slots.
    ///
    /// An unknown rating can therefore stay ahead of a known one, even a known 0.0,
    /// which does not honour "an unknown rating ranks no higher than any known
    /// rating". Which policy is right is still open; [`RatingOrder::UnknownLast`]
    /// honours that rule.
    #[default]
    InPlace,
    /// Unknown-rated courses come after every known-rated course of the same score.
    UnknownLast,
}

impl FromStr for RatingOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in_place" => Ok(RatingOrder::InPlace),
            "unknown_last" => Ok(RatingOrder::UnknownLast),
            other => Err(format!(
                "unknown rating order '{other}', expected 'in_place' or 'unknown_last'"
            )),
        }
    }
}

impl fmt::Display for RatingOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RatingOrder::InPlace => "in_place",
            RatingOrder::UnknownLast => "unknown_last",
        })
    }
}

/// Rank with the default rating order.
pub fn rank(catalog: &CatalogIndex, selected: &[String]) -> Vec<ScoredCourse> {
    rank_with(catalog, selected, RatingOrder::default())
}

/// Score and order every course against `selected`.
///
/// Returns the full ranked list; an empty selection ranks nothing.
pub fn rank_with(
    catalog: &CatalogIndex,
    selected: &[String],
    order: RatingOrder,
) -> Vec<ScoredCourse> {
    if selected.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredCourse> = catalog
        .courses()
        .iter()
        .filter_map(|course| {
            let matched_skills: Vec<String> = selected
                .iter()
                .filter(|skill| course.has_skill(skill))
                .cloned()
                .collect();
            if matched_skills.is_empty() {
                return None;
            }
            let match_count = matched_skills.len();
            let bonus_skills = course
                .skills
                .iter()
                .filter(|skill| !selected.contains(skill))
                .cloned()
                .collect();
            Some(ScoredCourse {
                course: course.clone(),
                matched_skills,
                match_count,
                score: match_count as f64 / selected.len() as f64 * 100.0,
                bonus_skills,
            })
        })
        .collect();

    // Same denominator for every course, so match count orders exactly like score.
    scored.sort_by(|a, b| b.match_count.cmp(&a.match_count));

    match order {
        RatingOrder::UnknownLast => {
            scored.sort_by(|a, b| {
                b.match_count
                    .cmp(&a.match_count)
                    .then_with(|| compare_ratings_desc(a, b))
            });
        }
        RatingOrder::InPlace => {
            let mut start = 0;
            while start < scored.len() {
                let count = scored[start].match_count;
                let end = scored[start..]
                    .iter()
                    .position(|s| s.match_count != count)
                    .map_or(scored.len(), |offset| start + offset);
                sort_known_in_place(&mut scored[start..end]);
                start = end;
            }
        }
    }

    scored
}

/// Descending by rating; unknown sorts below any known value.
fn compare_ratings_desc(a: &ScoredCourse, b: &ScoredCourse) -> Ordering {
    match (a.course.rating.value(), b.course.rating.value()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Reorder the known-rated entries of `group` by rating, leaving unknown-rated entries
/// in their slots.
fn sort_known_in_place(group: &mut [ScoredCourse]) {
    let slots: Vec<usize> = group
        .iter()
        .enumerate()
        .filter(|(_, s)| s.course.rating.is_known())
        .map(|(i, _)| i)
        .collect();
    if slots.len() < 2 {
        return;
    }

    let mut known: Vec<ScoredCourse> = slots.iter().map(|&i| group[i].clone()).collect();
    known.sort_by(compare_ratings_desc);
    for (slot, course) in slots.into_iter().zip(known) {
        group[slot] = course;
    }
}
