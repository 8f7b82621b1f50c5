use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A competition page. Top level rows (`level` 1) are events or multi-stage
/// series; stages hang off their series through `parent_id` with `level` 2.
///
/// `processing_class` selects the rule set that knows how to compute
/// standings, team points and diplomas for this family of competitions.
/// `params` carries per-competition configuration such as age groups and
/// whether finisher diplomas are offered.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: i32,
    pub name: String,
    pub slug: String,
    pub level: i16,
    pub parent_id: Option<i32>,
    pub competition_date: chrono::NaiveDate,
    pub processing_class: Option<String>,
    #[schema(value_type = Object)]
    pub params: serde_json::Value,
    pub created_at: chrono::NaiveDateTime,
}

impl Competition {
    /// True when diplomas can be generated for finishers of this competition.
    pub fn have_diploma(&self) -> bool {
        self.params
            .get("have_diploma")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Age groups configured for a distance, keyed by distance id.
    pub fn groups_for_distance(&self, distance_id: i32) -> Vec<String> {
        self.params
            .get("groups")
            .and_then(|g| g.get(distance_id.to_string()))
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn competition_with_params(params: serde_json::Value) -> Competition {
        Competition {
            competition_id: 1,
            name: "Test".to_string(),
            slug: "test".to_string(),
            level: 1,
            parent_id: None,
            competition_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            processing_class: None,
            params,
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_have_diploma_defaults_to_false() {
        let c = competition_with_params(serde_json::json!({}));
        assert!(!c.have_diploma());
    }

    #[test]
    fn test_have_diploma_reads_param() {
        let c = competition_with_params(serde_json::json!({"have_diploma": true}));
        assert!(c.have_diploma());
    }

    #[test]
    fn test_groups_for_distance() {
        let c = competition_with_params(serde_json::json!({
            "groups": {"7": ["M-18", "W-18", "M Elite"]}
        }));
        assert_eq!(c.groups_for_distance(7), vec!["M-18", "W-18", "M Elite"]);
        assert!(c.groups_for_distance(8).is_empty());
    }
}
