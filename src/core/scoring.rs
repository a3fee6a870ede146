use crate::core::sports::parse_sports;
use crate::models::{country_display_name, MatchExplanation, MatchScore, Profile};

/// Minimum score a candidate needs to be stored as a recommendation
pub const ACCEPTANCE_THRESHOLD: f64 = 60.0;
pub const MAX_SCORE: f64 = 100.0;

/// Number of recommendations created per user when no limit is given
pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;

pub const POINTS_PER_COMMON_SPORT: u32 = 15;
pub const MAX_SPORTS_POINTS: u32 = 40;

pub const SAME_COUNTRY_POINTS: u32 = 15;
pub const SAME_CITY_POINTS: u32 = 10;

pub const SIMILAR_AGE_MAX_DIFF: u32 = 5;
pub const SIMILAR_AGE_POINTS: u32 = 20;
pub const COMPATIBLE_AGE_MAX_DIFF: u32 = 10;
pub const COMPATIBLE_AGE_POINTS: u32 = 15;
pub const NEARBY_AGE_MAX_DIFF: u32 = 15;
pub const NEARBY_AGE_POINTS: u32 = 10;

pub const POINTS_PER_COMMON_SLOT: u32 = 7;
pub const MAX_AVAILABILITY_POINTS: u32 = 15;
pub const AVAILABILITY_KEYWORDS: [&str; 5] = ["morning", "afternoon", "evening", "weekend", "flexible"];

pub const SAME_GENDER_POINTS: u32 = 5;

/// Calculate a compatibility score (0-100) between two profiles
///
/// Categories are evaluated in a fixed order and each one contributes at
/// most its cap:
///
/// | category     | points                              |
/// |--------------|-------------------------------------|
/// | sports       | 15 per shared sport, max 40         |
/// | location     | 15 same country, +10 same city      |
/// | age          | 20 / 15 / 10 for diff <= 5 / 10 / 15 |
/// | availability | 7 per shared time slot, max 15      |
/// | gender       | 5 when equal                        |
///
/// Reasons follow the same order. Missing optional attributes skip their
/// category. The sum is clamped to [0, 100].
pub fn calculate_match_score(profile: &Profile, partner: &Profile) -> MatchScore {
    let mut reasons = Vec::new();
    let mut explanation = MatchExplanation::default();

    let points = sports_points(profile, partner, &mut reasons, &mut explanation)
        + location_points(profile, partner, &mut reasons, &mut explanation)
        + age_points(profile, partner, &mut reasons, &mut explanation)
        + availability_points(profile, partner, &mut reasons, &mut explanation)
        + gender_points(profile, partner, &mut explanation);

    MatchScore {
        score: f64::from(points).clamp(0.0, MAX_SCORE),
        reasons,
        explanation,
    }
}

/// Whether a score is high enough to become a recommendation
#[inline]
pub fn meets_threshold(score: f64) -> bool {
    score >= ACCEPTANCE_THRESHOLD
}

fn sports_points(
    profile: &Profile,
    partner: &Profile,
    reasons: &mut Vec<String>,
    explanation: &mut MatchExplanation,
) -> u32 {
    let mine = parse_sports(&profile.sports);
    let theirs = parse_sports(&partner.sports);
    let common: Vec<&String> = mine.intersection(&theirs).collect();

    if common.is_empty() {
        explanation.sport_match = Some(false);
        return 0;
    }

    explanation.sport_match = Some(true);
    explanation.common_sports_count = Some(common.len());

    match common.as_slice() {
        [sport] => reasons.push(format!("Both practice {}", sport)),
        _ => reasons.push(format!("{} sports in common", common.len())),
    }

    let count = u32::try_from(common.len()).unwrap_or(u32::MAX);
    count.saturating_mul(POINTS_PER_COMMON_SPORT).min(MAX_SPORTS_POINTS)
}

fn location_points(
    profile: &Profile,
    partner: &Profile,
    reasons: &mut Vec<String>,
    explanation: &mut MatchExplanation,
) -> u32 {
    if profile.country != partner.country {
        explanation.same_country = Some(false);
        return 0;
    }

    explanation.same_country = Some(true);

    let same_city = match (profile.city(), partner.city()) {
        (Some(mine), Some(theirs)) => mine.to_lowercase() == theirs.to_lowercase(),
        _ => false,
    };

    if same_city {
        explanation.same_city = Some(true);
        reasons.push(format!("Both in {}", profile.city().unwrap_or_default()));
        SAME_COUNTRY_POINTS + SAME_CITY_POINTS
    } else {
        explanation.same_city = Some(false);
        reasons.push(format!("Same country ({})", country_display_name(&profile.country)));
        SAME_COUNTRY_POINTS
    }
}

fn age_points(
    profile: &Profile,
    partner: &Profile,
    reasons: &mut Vec<String>,
    explanation: &mut MatchExplanation,
) -> u32 {
    let (Some(mine), Some(theirs)) = (profile.age(), partner.age()) else {
        return 0;
    };

    let diff = mine.abs_diff(theirs);
    explanation.age_difference = Some(diff);

    if diff <= SIMILAR_AGE_MAX_DIFF {
        reasons.push("Similar age group".to_string());
        SIMILAR_AGE_POINTS
    } else if diff <= COMPATIBLE_AGE_MAX_DIFF {
        reasons.push("Compatible age range".to_string());
        COMPATIBLE_AGE_POINTS
    } else if diff <= NEARBY_AGE_MAX_DIFF {
        // Scored, but not worth mentioning to the user
        NEARBY_AGE_POINTS
    } else {
        0
    }
}

fn availability_points(
    profile: &Profile,
    partner: &Profile,
    reasons: &mut Vec<String>,
    explanation: &mut MatchExplanation,
) -> u32 {
    let (Some(mine), Some(theirs)) = (profile.availability(), partner.availability()) else {
        return 0;
    };

    let mine = mine.to_lowercase();
    let theirs = theirs.to_lowercase();

    let common_slots = AVAILABILITY_KEYWORDS
        .iter()
        .filter(|keyword| mine.contains(**keyword) && theirs.contains(**keyword))
        .count() as u32;

    if common_slots == 0 {
        explanation.availability_match = Some(false);
        return 0;
    }

    explanation.availability_match = Some(true);
    reasons.push("Similar availability".to_string());
    (common_slots * POINTS_PER_COMMON_SLOT).min(MAX_AVAILABILITY_POINTS)
}

fn gender_points(profile: &Profile, partner: &Profile, explanation: &mut MatchExplanation) -> u32 {
    match (profile.gender(), partner.gender()) {
        (Some(mine), Some(theirs)) if mine == theirs => {
            explanation.same_gender = Some(true);
            SAME_GENDER_POINTS
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SportsField;

    fn create_test_profile(user_id: &str, sports: &[&str], country: &str) -> Profile {
        Profile {
            user_id: user_id.to_string(),
            is_active: true,
            sports: SportsField::List(sports.iter().map(|s| s.to_string()).collect()),
            country: country.to_string(),
            city: None,
            age: None,
            availability: None,
            gender: None,
        }
    }

    fn paris_tennis_player(user_id: &str) -> Profile {
        Profile {
            city: Some("Paris".to_string()),
            age: Some(30),
            availability: Some("mornings".to_string()),
            gender: Some("male".to_string()),
            ..create_test_profile(user_id, &["Tennis"], "FR")
        }
    }

    #[test]
    fn test_full_scenario_scores_72() {
        let a = paris_tennis_player("a");
        let b = Profile {
            sports: SportsField::List(vec!["Tennis".to_string(), "Golf".to_string()]),
            age: Some(32),
            availability: Some("morning flexible".to_string()),
            ..paris_tennis_player("b")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 72.0);
        assert_eq!(
            result.reasons,
            vec!["Both practice Tennis", "Both in Paris", "Similar age group", "Similar availability"]
        );
        assert_eq!(result.explanation.sport_match, Some(true));
        assert_eq!(result.explanation.common_sports_count, Some(1));
        assert_eq!(result.explanation.same_country, Some(true));
        assert_eq!(result.explanation.same_city, Some(true));
        assert_eq!(result.explanation.age_difference, Some(2));
        assert_eq!(result.explanation.availability_match, Some(true));
        assert_eq!(result.explanation.same_gender, Some(true));
    }

    #[test]
    fn test_nothing_in_common_scores_zero() {
        let a = Profile {
            gender: Some("male".to_string()),
            ..create_test_profile("a", &["tennis"], "FR")
        };
        let b = Profile {
            gender: Some("female".to_string()),
            ..create_test_profile("b", &["golf"], "TN")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 0.0);
        assert!(result.reasons.is_empty());
        assert_eq!(result.explanation.sport_match, Some(false));
        assert_eq!(result.explanation.same_country, Some(false));
        assert_eq!(result.explanation.same_gender, None);
        assert_eq!(result.explanation.age_difference, None);
    }

    #[test]
    fn test_sports_points_capped() {
        let sports = ["tennis", "golf", "yoga", "gym"];
        let a = create_test_profile("a", &sports, "FR");
        let b = create_test_profile("b", &sports, "TN");

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 40.0);
        assert_eq!(result.reasons, vec!["4 sports in common"]);
        assert_eq!(result.explanation.common_sports_count, Some(4));
    }

    #[test]
    fn test_two_common_sports() {
        let a = create_test_profile("a", &["tennis", "golf"], "FR");
        let b = create_test_profile("b", &["golf", "tennis", "yoga"], "TN");

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 30.0);
        assert_eq!(result.reasons, vec!["2 sports in common"]);
    }

    #[test]
    fn test_same_country_different_city() {
        let a = Profile {
            city: Some("Tunis".to_string()),
            ..create_test_profile("a", &[], "TN")
        };
        let b = Profile {
            city: Some("Sfax".to_string()),
            ..create_test_profile("b", &[], "TN")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 15.0);
        assert_eq!(result.reasons, vec!["Same country (Tunisia)"]);
        assert_eq!(result.explanation.same_city, Some(false));
    }

    #[test]
    fn test_city_match_is_case_insensitive() {
        let a = Profile {
            city: Some("PARIS".to_string()),
            ..create_test_profile("a", &[], "FR")
        };
        let b = Profile {
            city: Some("paris".to_string()),
            ..create_test_profile("b", &[], "FR")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 25.0);
        assert_eq!(result.reasons, vec!["Both in PARIS"]);
    }

    #[test]
    fn test_missing_city_falls_back_to_country_reason() {
        let a = Profile {
            city: Some("Paris".to_string()),
            ..create_test_profile("a", &[], "FR")
        };
        let b = create_test_profile("b", &[], "FR");

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 15.0);
        assert_eq!(result.reasons, vec!["Same country (France)"]);
    }

    #[test]
    fn test_age_buckets() {
        let cases = [
            (30, 35, 20.0, Some("Similar age group")),
            (30, 40, 15.0, Some("Compatible age range")),
            (30, 45, 10.0, None),
            (30, 46, 0.0, None),
        ];

        for (age_a, age_b, expected, reason) in cases {
            let a = Profile { age: Some(age_a), ..create_test_profile("a", &[], "FR") };
            let b = Profile { age: Some(age_b), ..create_test_profile("b", &[], "TN") };

            let result = calculate_match_score(&a, &b);

            assert_eq!(result.score, expected, "ages {} / {}", age_a, age_b);
            assert_eq!(result.reasons.first().map(String::as_str), reason);
            assert_eq!(result.explanation.age_difference, Some(age_a.abs_diff(age_b)));
        }
    }

    #[test]
    fn test_missing_age_skips_category() {
        let a = Profile { age: Some(30), ..create_test_profile("a", &[], "FR") };
        let b = create_test_profile("b", &[], "TN");

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.explanation.age_difference, None);
    }

    #[test]
    fn test_zero_age_counts_as_unset() {
        let a = Profile { age: Some(0), ..create_test_profile("a", &[], "FR") };
        let b = Profile { age: Some(3), ..create_test_profile("b", &[], "FR") };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 15.0);
        assert_eq!(result.reasons, vec!["Same country (France)"]);
        assert_eq!(result.explanation.age_difference, None);
    }

    #[test]
    fn test_availability_points_capped() {
        let a = Profile {
            availability: Some("Morning, Evening and Weekend".to_string()),
            ..create_test_profile("a", &[], "FR")
        };
        let b = Profile {
            availability: Some("weekend mornings, evenings".to_string()),
            ..create_test_profile("b", &[], "TN")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 15.0);
        assert_eq!(result.reasons, vec!["Similar availability"]);
    }

    #[test]
    fn test_availability_without_common_slot() {
        let a = Profile {
            availability: Some("mornings".to_string()),
            ..create_test_profile("a", &[], "FR")
        };
        let b = Profile {
            availability: Some("evenings".to_string()),
            ..create_test_profile("b", &[], "TN")
        };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, 0.0);
        assert_eq!(result.explanation.availability_match, Some(false));
    }

    #[test]
    fn test_gender_is_case_sensitive() {
        let a = Profile { gender: Some("male".to_string()), ..create_test_profile("a", &[], "FR") };
        let b = Profile { gender: Some("Male".to_string()), ..create_test_profile("b", &[], "TN") };

        assert_eq!(calculate_match_score(&a, &b).score, 0.0);
    }

    #[test]
    fn test_score_clamped_to_100() {
        let sports = ["tennis", "golf", "yoga"];
        let a = Profile {
            city: Some("Lyon".to_string()),
            age: Some(25),
            availability: Some("morning evening".to_string()),
            gender: Some("female".to_string()),
            ..create_test_profile("a", &sports, "FR")
        };
        let b = Profile { user_id: "b".to_string(), ..a.clone() };

        let result = calculate_match_score(&a, &b);

        assert_eq!(result.score, MAX_SCORE);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(meets_threshold(60.0));
        assert!(meets_threshold(72.0));
        assert!(!meets_threshold(59.0));
    }
}
