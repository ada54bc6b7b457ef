//! Draft validation.
//!
//! Rules run in a fixed order and stop at the first violation, so the
//! operator only ever sees one message per submit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{RATING_MAX, RATING_MIN, RELEASE_DATE_PATTERN};
use crate::error::ValidationError;
use crate::types::MovieDraft;

static RELEASE_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(RELEASE_DATE_PATTERN).expect("valid regex"));

/// Check a draft against the field rules. Pure; never touches the network.
pub fn validate(draft: &MovieDraft) -> Result<(), ValidationError> {
    require(&draft.name, ValidationError::MissingName)?;
    require(&draft.image_path, ValidationError::MissingImagePath)?;
    require(&draft.language, ValidationError::MissingLanguage)?;
    require(&draft.synopsis, ValidationError::MissingSynopsis)?;

    match draft.rating {
        Some(r) if is_valid_rating(r) => {}
        _ => return Err(ValidationError::InvalidRating),
    }

    require(&draft.duration, ValidationError::MissingDuration)?;
    require(&draft.cast, ValidationError::MissingCast)?;

    if !is_valid_release_date(&draft.release_date) {
        return Err(ValidationError::InvalidReleaseDate);
    }

    if draft.genres.is_empty() {
        return Err(ValidationError::MissingGenres);
    }
    if draft.directors.is_empty() {
        return Err(ValidationError::MissingDirectors);
    }

    Ok(())
}

fn require(value: &str, err: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(err)
    } else {
        Ok(())
    }
}

// NaN fails both comparisons
pub fn is_valid_rating(rating: f64) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&rating)
}

/// Pattern check only: `2024-02-30` passes.
pub fn is_valid_release_date(date: &str) -> bool {
    RELEASE_DATE.is_match(date.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationSet;

    fn valid_draft() -> MovieDraft {
        MovieDraft {
            name: "Dune".into(),
            image_path: "/img/dune.jpg".into(),
            language: "English".into(),
            synopsis: "Spice and sand".into(),
            rating: Some(8.1),
            duration: "155 min".into(),
            cast: "Timothée Chalamet".into(),
            release_date: "2021-10-22".into(),
            genres: RelationSet::parse_list("Sci-Fi, Adventure"),
            directors: RelationSet::parse_list("Denis Villeneuve"),
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert_eq!(validate(&valid_draft()), Ok(()));
    }

    fn break_rule(draft: &mut MovieDraft, rule: ValidationError) {
        match rule {
            ValidationError::MissingName => draft.name = "   ".into(),
            ValidationError::MissingImagePath => draft.image_path.clear(),
            ValidationError::MissingLanguage => draft.language.clear(),
            ValidationError::MissingSynopsis => draft.synopsis.clear(),
            ValidationError::InvalidRating => draft.rating = None,
            ValidationError::MissingDuration => draft.duration.clear(),
            ValidationError::MissingCast => draft.cast.clear(),
            ValidationError::InvalidReleaseDate => draft.release_date.clear(),
            ValidationError::MissingGenres => draft.genres = RelationSet::new(),
            ValidationError::MissingDirectors => draft.directors = RelationSet::new(),
        }
    }

    const RULES: [ValidationError; 10] = [
        ValidationError::MissingName,
        ValidationError::MissingImagePath,
        ValidationError::MissingLanguage,
        ValidationError::MissingSynopsis,
        ValidationError::InvalidRating,
        ValidationError::MissingDuration,
        ValidationError::MissingCast,
        ValidationError::InvalidReleaseDate,
        ValidationError::MissingGenres,
        ValidationError::MissingDirectors,
    ];

    #[test]
    fn test_each_rule_reports_its_own_message() {
        for rule in RULES {
            let mut draft = valid_draft();
            break_rule(&mut draft, rule);
            assert_eq!(validate(&draft), Err(rule));
        }
    }

    #[test]
    fn test_earlier_rule_reported_before_later_ones() {
        // break every rule from `i` onwards: only rule `i` is surfaced
        for (i, rule) in RULES.iter().enumerate() {
            let mut draft = valid_draft();
            for later in &RULES[i..] {
                break_rule(&mut draft, *later);
            }
            assert_eq!(validate(&draft), Err(*rule));
        }
    }

    #[test]
    fn test_first_violation_wins() {
        let mut draft = valid_draft();
        draft.synopsis.clear();
        draft.rating = Some(42.0);
        draft.directors = RelationSet::new();
        assert_eq!(validate(&draft), Err(ValidationError::MissingSynopsis));

        let blank = MovieDraft::default();
        assert_eq!(validate(&blank), Err(ValidationError::MissingName));
    }

    #[test]
    fn test_rating_bounds() {
        for ok in [0.0, 10.0, 5.5] {
            let mut draft = valid_draft();
            draft.rating = Some(ok);
            assert_eq!(validate(&draft), Ok(()), "rating {ok} should pass");
        }
        for bad in [-0.001, 10.001, f64::NAN, f64::INFINITY] {
            let mut draft = valid_draft();
            draft.rating = Some(bad);
            assert_eq!(
                validate(&draft),
                Err(ValidationError::InvalidRating),
                "rating {bad} should fail"
            );
        }
    }

    #[test]
    fn test_release_date_pattern() {
        assert!(is_valid_release_date("2024-03-05"));
        // no calendar check
        assert!(is_valid_release_date("2024-02-30"));
        assert!(!is_valid_release_date("2024-3-5"));
        assert!(!is_valid_release_date("05-03-2024"));
        assert!(!is_valid_release_date("2024-03-05T00:00"));
        assert!(!is_valid_release_date(""));
    }

    #[test]
    fn test_validation_message_text() {
        let mut draft = valid_draft();
        draft.release_date = "2024-3-5".into();
        let err = validate(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Release date must use the yyyy-mm-dd format");
    }
}
