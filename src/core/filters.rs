use crate::core::sports::parse_sports;
use crate::models::Profile;

/// Most profiles a partner search returns
pub const MAX_SEARCH_RESULTS: usize = 20;

/// Outcome of a partner search
#[derive(Debug, Clone, Default)]
pub struct PartnerSearch {
    /// Matching profiles before the result cap
    pub total_results: usize,
    pub results: Vec<Profile>,
}

/// Check if a profile lists the requested sport
///
/// Comparison is exact. An empty or absent sport matches every profile.
#[inline]
pub fn matches_sport(profile: &Profile, sport: Option<&str>) -> bool {
    match sport.filter(|s| !s.is_empty()) {
        Some(sport) => parse_sports(&profile.sports).contains(sport),
        None => true,
    }
}

/// Find active partners for `user_id`, optionally narrowed to one sport
///
/// Candidates keep their incoming order. At most `limit` are returned,
/// while `total_results` counts every match.
pub fn search_partners(
    user_id: &str,
    candidates: Vec<Profile>,
    sport: Option<&str>,
    limit: usize,
) -> PartnerSearch {
    let matching: Vec<Profile> = candidates
        .into_iter()
        .filter(|profile| profile.user_id != user_id)
        .filter(|profile| profile.is_active)
        .filter(|profile| matches_sport(profile, sport))
        .collect();

    let total_results = matching.len();
    let results = matching.into_iter().take(limit).collect();

    PartnerSearch { total_results, results }
}
