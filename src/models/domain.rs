use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Sports interests as they arrive from storage or clients
///
/// Newer rows carry a structured list. Older rows stored a JSON-encoded
/// array inside a text column, which is kept readable for compatibility.
/// Deserialization never fails: anything that is not a list or a string
/// becomes `Missing`, and non-string list elements are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SportsField {
    List(Vec<String>),
    Encoded(String),
    #[default]
    Missing,
}

impl From<Value> for SportsField {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => SportsField::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(sport) => Some(sport),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::String(text) => SportsField::Encoded(text),
            _ => SportsField::Missing,
        }
    }
}

impl<'de> Deserialize<'de> for SportsField {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(SportsField::from)
    }
}

impl From<Vec<String>> for SportsField {
    fn from(sports: Vec<String>) -> Self {
        SportsField::List(sports)
    }
}

/// Profile attributes used for partner matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sports: SportsField,
    pub country: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl Profile {
    /// City, treating an empty string as absent
    pub fn city(&self) -> Option<&str> {
        non_empty(self.city.as_deref())
    }

    /// Age in years, treating zero as unset
    pub fn age(&self) -> Option<u32> {
        self.age.filter(|age| *age > 0)
    }

    /// Availability description, treating an empty string as absent
    pub fn availability(&self) -> Option<&str> {
        non_empty(self.availability.as_deref())
    }

    /// Gender, treating an empty string as absent
    pub fn gender(&self) -> Option<&str> {
        non_empty(self.gender.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn default_true() -> bool { true }

/// Facts recorded while scoring a pair of profiles
///
/// Only the facts that were actually evaluated are present, so the
/// serialized object mirrors which scoring categories applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchExplanation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_sports_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_country: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_city: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_difference: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_match: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_gender: Option<bool>,
}

/// Score, reasons and explanation for one pair of profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchScore {
    #[serde(rename = "matchScore")]
    pub score: f64,
    pub reasons: Vec<String>,
    pub explanation: MatchExplanation,
}

/// Persisted partner suggestion for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "recommendedUserId")]
    pub recommended_user_id: String,
    #[serde(rename = "matchScore")]
    pub match_score: f64,
    pub explanation: MatchExplanation,
    pub reasons: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "isViewed")]
    pub is_viewed: bool,
    #[serde(rename = "isDismissed")]
    pub is_dismissed: bool,
}

impl Recommendation {
    /// Build a fresh, unviewed recommendation from a scored pair
    pub fn new(
        user_id: &str,
        recommended_user_id: &str,
        score: MatchScore,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            recommended_user_id: recommended_user_id.to_string(),
            match_score: score.score,
            explanation: score.explanation,
            reasons: score.reasons,
            created_at,
            is_viewed: false,
            is_dismissed: false,
        }
    }
}

/// Country codes known to the application and their display names
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("TN", "Tunisia"),
    ("DZ", "Algeria"),
    ("MA", "Morocco"),
    ("EG", "Egypt"),
    ("LY", "Libya"),
    ("FR", "France"),
    ("DE", "Germany"),
    ("GB", "United Kingdom"),
    ("US", "United States"),
    ("CA", "Canada"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("PT", "Portugal"),
    ("BE", "Belgium"),
    ("NL", "Netherlands"),
    ("SA", "Saudi Arabia"),
    ("AE", "United Arab Emirates"),
    ("QA", "Qatar"),
    ("KW", "Kuwait"),
    ("TR", "Turkey"),
    ("XX", "Other"),
];

/// Display name for a country code, falling back to the code itself
pub fn country_display_name(code: &str) -> &str {
    COUNTRY_NAMES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_display_name() {
        assert_eq!(country_display_name("FR"), "France");
        assert_eq!(country_display_name("ae"), "United Arab Emirates");
        assert_eq!(country_display_name("ZZ"), "ZZ");
    }

    #[test]
    fn test_sports_field_from_json_value() {
        let value = serde_json::json!(["tennis", 3, "golf"]);
        assert_eq!(
            SportsField::from(value),
            SportsField::List(vec!["tennis".to_string(), "golf".to_string()])
        );

        let legacy = serde_json::json!("[\"tennis\"]");
        assert_eq!(
            SportsField::from(legacy),
            SportsField::Encoded("[\"tennis\"]".to_string())
        );

        assert_eq!(SportsField::from(Value::Null), SportsField::Missing);
    }

    #[test]
    fn test_profile_deserialize_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"userId":"u1","country":"TN"}"#).unwrap();

        assert!(profile.is_active);
        assert_eq!(profile.sports, SportsField::Missing);
        assert_eq!(profile.city(), None);
        assert_eq!(profile.age, None);
    }

    #[test]
    fn test_profile_tolerates_odd_sports_payloads() {
        let mixed: Profile =
            serde_json::from_str(r#"{"userId":"u","country":"FR","sports":["tennis",7]}"#).unwrap();
        assert_eq!(mixed.sports, SportsField::List(vec!["tennis".to_string()]));

        let number: Profile = serde_json::from_str(r#"{"userId":"u","country":"FR","sports":5}"#).unwrap();
        assert_eq!(number.sports, SportsField::Missing);

        let null: Profile = serde_json::from_str(r#"{"userId":"u","country":"FR","sports":null}"#).unwrap();
        assert_eq!(null.sports, SportsField::Missing);

        let legacy: Profile =
            serde_json::from_str(r#"{"userId":"u","country":"FR","sports":"[\"golf\"]"}"#).unwrap();
        assert_eq!(legacy.sports, SportsField::Encoded(r#"["golf"]"#.to_string()));
    }

    #[test]
    fn test_empty_optional_strings_are_absent() {
        let profile = Profile {
            user_id: "u1".to_string(),
            is_active: true,
            sports: SportsField::Missing,
            country: "FR".to_string(),
            city: Some(String::new()),
            age: None,
            availability: Some(String::new()),
            gender: Some(String::new()),
        };

        assert_eq!(profile.city(), None);
        assert_eq!(profile.availability(), None);
        assert_eq!(profile.gender(), None);
    }

    #[test]
    fn test_explanation_skips_unevaluated_facts() {
        let explanation = MatchExplanation {
            sport_match: Some(false),
            same_country: Some(true),
            ..Default::default()
        };

        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json, serde_json::json!({"sport_match": false, "same_country": true}));
    }
}
