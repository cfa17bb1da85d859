/// Turns raw tabular rows into validated `CourseRecord`s.
///
/// A row becomes a course only when its name, subcategory and raw skills cells are all
/// present and non-empty. Everything else is passed through untouched, with empty cells
/// mapped to `None`.
use crate::model::{columns, CourseRecord, Rating, RawField, RawRow};

/// Normalize one raw row. Returns `None` for rows missing a required column.
pub fn normalize(row: &RawRow) -> Option<CourseRecord> {
    let raw_skills = cell_text(row, columns::SKILLS)?;
    let name = cell_text(row, columns::COURSE_NAME)?;
    let subcategory = cell_text(row, columns::SUBCATEGORY)?;

    Some(CourseRecord {
        name,
        organization: cell_text(row, columns::ORGANIZATION),
        subcategory,
        skills: split_skills(&raw_skills),
        rating: parse_rating(row.get(columns::RATINGS)),
        difficulty: cell_text(row, columns::DIFFICULTY),
        duration: cell_text(row, columns::DURATION),
        course_type: cell_text(row, columns::TYPE),
        students_enrolled: cell_text(row, columns::STUDENTS_ENROLLED),
        description: cell_text(row, columns::DESCRIPTION),
        url: cell_text(row, columns::URL),
    })
}

/// Split a raw skills cell into skill tokens.
///
/// Pieces are comma-separated and trimmed; empty pieces are dropped. Order and
/// repeats are kept.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Interpret a raw ratings cell. Never yields `Known(0.0)` for a missing value.
pub fn parse_rating(field: Option<&RawField>) -> Rating {
    match field {
        None => Rating::Absent,
        Some(RawField::Number(v)) if v.is_finite() => Rating::Known(*v),
        Some(RawField::Number(v)) => Rating::Unparsable(v.to_string()),
        Some(RawField::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Rating::Absent;
            }
            match trimmed.parse::<f64>() {
                Ok(v) if v.is_finite() => Rating::Known(v),
                _ => Rating::Unparsable(s.clone()),
            }
        }
    }
}

/// Non-empty cell content as text. Numeric cells are rendered back to text.
fn cell_text(row: &RawRow, column: &str) -> Option<String> {
    let text = match row.get(column)? {
        RawField::Text(s) => s.clone(),
        RawField::Number(v) => v.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), RawField::from(*v)))
            .collect()
    }

    fn minimal() -> RawRow {
        row(&[
            ("Course Name", "Python for Everybody"),
            ("Subcategory", "Programming"),
            ("Skills", " Python ,  Data Structures,,SQL , "),
        ])
    }

    #[test]
    fn splits_and_trims_skills() {
        let course = normalize(&minimal()).expect("row should be valid");
        assert_eq!(course.skills, vec!["Python", "Data Structures", "SQL"]);
        assert_eq!(course.name, "Python for Everybody");
        assert_eq!(course.subcategory, "Programming");
        assert_eq!(course.rating, Rating::Absent);
        assert!(course.url.is_none());
    }

    #[test]
    fn keeps_repeated_skills_in_order() {
        assert_eq!(split_skills("SQL, Python, SQL"), vec!["SQL", "Python", "SQL"]);
    }

    #[test]
    fn rejects_rows_missing_required_columns() {
        for column in columns::REQUIRED {
            let mut missing = minimal();
            missing.remove(column);
            assert!(normalize(&missing).is_none(), "missing {column} should be rejected");

            let mut empty = minimal();
            empty.insert(column.to_string(), RawField::from(""));
            assert!(normalize(&empty).is_none(), "empty {column} should be rejected");
        }
    }

    #[test]
    fn header_match_is_case_sensitive() {
        let lowercase = row(&[
            ("course name", "Intro"),
            ("Subcategory", "Programming"),
            ("Skills", "Python"),
        ]);
        assert!(normalize(&lowercase).is_none());
    }

    #[test]
    fn separators_only_skills_still_make_a_valid_course() {
        let mut r = minimal();
        r.insert("Skills".to_string(), RawField::from(" , ,"));
        let course = normalize(&r).expect("raw skills cell was non-empty");
        assert!(course.skills.is_empty());
    }

    #[test]
    fn parses_ratings() {
        assert_eq!(parse_rating(Some(&RawField::from("4.7"))), Rating::Known(4.7));
        assert_eq!(parse_rating(Some(&RawField::from(" 3 "))), Rating::Known(3.0));
        assert_eq!(parse_rating(Some(&RawField::Number(4.9))), Rating::Known(4.9));
        assert_eq!(parse_rating(Some(&RawField::from(""))), Rating::Absent);
        assert_eq!(parse_rating(None), Rating::Absent);
        assert_eq!(
            parse_rating(Some(&RawField::from("Not Rated"))),
            Rating::Unparsable("Not Rated".to_string())
        );
        assert!(!parse_rating(Some(&RawField::from("NaN"))).is_known());
    }

    #[test]
    fn blank_ratings_cell_means_no_rating() {
        assert_eq!(parse_rating(Some(&RawField::from("   "))), Rating::Absent);
        let course = normalize(&row(&[
            ("Course Name", "Intro"),
            ("Subcategory", "Programming"),
            ("Skills", "Python"),
            ("Ratings", ""),
        ]))
        .unwrap();
        assert_eq!(course.rating, Rating::Absent);
    }

    #[test]
    fn optional_columns_pass_through() {
        let mut r = minimal();
        r.insert("Organization".to_string(), RawField::from("University of Michigan"));
        r.insert("Difficulty".to_string(), RawField::from("Beginner"));
        r.insert("course_url".to_string(), RawField::from("https://example.com/py"));
        r.insert("course_description".to_string(), RawField::from(""));
        let course = normalize(&r).unwrap();
        assert_eq!(course.organization.as_deref(), Some("University of Michigan"));
        assert_eq!(course.difficulty.as_deref(), Some("Beginner"));
        assert_eq!(course.url.as_deref(), Some("https://example.com/py"));
        assert!(course.description.is_none());
    }
}
