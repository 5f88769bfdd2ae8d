//! Grade and comment validation.
//!
//! Grades live on a 0-10 scale with one-decimal granularity. Out-of-range
//! values are rejected; in-range values with extra precision are rounded
//! to one decimal before they are stored.

use crate::error::CoreError;

/// Lowest accepted grade.
pub const MIN_GRADE: f64 = 0.0;

/// Highest accepted grade.
pub const MAX_GRADE: f64 = 10.0;

/// Maximum length of an evaluation comment or finalization comments.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

/// Round a grade to one decimal place.
pub fn normalize_grade(grade: f64) -> f64 {
    (grade * 10.0).round() / 10.0
}

/// Validate a grade and return its normalized (one-decimal) value.
pub fn validate_grade(grade: f64) -> Result<f64, CoreError> {
    if !grade.is_finite() {
        return Err(CoreError::invalid_field("grade", "Grade must be a number"));
    }
    if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
        return Err(CoreError::invalid_field(
            "grade",
            format!("Grade {grade} is out of range. Must be between {MIN_GRADE} and {MAX_GRADE}"),
        ));
    }
    Ok(normalize_grade(grade))
}

/// Validate that a required free-text field is present and not too long.
pub fn validate_comment(field: &'static str, text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::invalid_field(field, "Must not be empty"));
    }
    if text.chars().count() > MAX_COMMENT_LENGTH {
        return Err(CoreError::invalid_field(
            field,
            format!("Exceeds maximum length of {MAX_COMMENT_LENGTH} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(validate_grade(0.0).unwrap(), 0.0);
        assert_eq!(validate_grade(10.0).unwrap(), 10.0);
        assert_eq!(validate_grade(8.5).unwrap(), 8.5);
    }

    #[test]
    fn just_outside_bounds_fails() {
        assert_matches!(
            validate_grade(-0.1),
            Err(CoreError::InvalidField { field: "grade", .. })
        );
        assert_matches!(
            validate_grade(10.1),
            Err(CoreError::InvalidField { field: "grade", .. })
        );
    }

    #[test]
    fn every_tenth_in_range_is_accepted() {
        for tenths in 0..=100 {
            let g = f64::from(tenths) / 10.0;
            assert_eq!(validate_grade(g).unwrap(), g, "grade {g}");
        }
    }

    #[test]
    fn non_finite_grades_fail() {
        assert!(validate_grade(f64::NAN).is_err());
        assert!(validate_grade(f64::INFINITY).is_err());
    }

    #[test]
    fn extra_precision_is_rounded() {
        assert_eq!(validate_grade(7.26).unwrap(), 7.3);
        assert_eq!(validate_grade(7.24).unwrap(), 7.2);
        assert_eq!(validate_grade(9.99).unwrap(), 10.0);
    }

    #[test]
    fn empty_and_blank_comments_fail() {
        assert_matches!(
            validate_comment("comment", ""),
            Err(CoreError::InvalidField { field: "comment", .. })
        );
        assert!(validate_comment("comments", "   \n").is_err());
    }

    #[test]
    fn overlong_comment_fails() {
        let long = "a".repeat(MAX_COMMENT_LENGTH + 1);
        let err = validate_comment("comment", &long).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn normal_comment_passes() {
        assert!(validate_comment("comment", "Buen trabajo").is_ok());
    }
}
