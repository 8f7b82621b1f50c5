use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use storage::dto::team::TeamByNameGroup;

/// On race day the table changes every few minutes, off-season it barely
/// moves at all.
const TTL_EVENT_DAY: Duration = Duration::from_secs(60);
const TTL_DEFAULT: Duration = Duration::from_secs(1800);

struct CacheEntry {
    stored_at: Instant,
    ttl: Duration,
    groups: Vec<TeamByNameGroup>,
}

/// Process-wide cache for the team-by-name report. Lookup and store are
/// separate lock acquisitions, so two concurrent misses may both run the
/// aggregation and overwrite each other; the result is identical either
/// way.
#[derive(Clone, Default)]
pub struct ReportCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl ReportCache {
    pub fn get(&self, key: &str) -> Option<Vec<TeamByNameGroup>> {
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.stored_at.elapsed() >= entry.ttl {
            return None;
        }

        Some(entry.groups.clone())
    }

    pub fn insert(&self, key: String, groups: Vec<TeamByNameGroup>, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key,
                CacheEntry {
                    stored_at: Instant::now(),
                    ttl,
                    groups,
                },
            );
        }
    }
}

pub fn cache_key(competition_id: i32, distance_id: i32) -> String {
    format!("team_results_by_name_{}_{}", competition_id, distance_id)
}

pub fn ttl_for(competition_date: NaiveDate, today: NaiveDate) -> Duration {
    if competition_date == today {
        TTL_EVENT_DAY
    } else {
        TTL_DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(team_name: &str) -> TeamByNameGroup {
        TeamByNameGroup {
            team_name: team_name.to_string(),
            team_name_slug: storage::slug::team_name_slug(team_name),
            qualifier_count: 2,
            total_seconds: 7_200,
            members: Vec::new(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let cache = ReportCache::default();
        cache.insert("k".to_string(), vec![group("VELO CLUB")], TTL_DEFAULT);

        let cached = cache.get("k").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].team_name, "VELO CLUB");
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = ReportCache::default();
        cache.insert("k".to_string(), vec![group("VELO CLUB")], Duration::ZERO);

        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_unknown_key_is_a_miss() {
        let cache = ReportCache::default();

        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(cache_key(12, 34), "team_results_by_name_12_34");
    }

    #[test]
    fn test_ttl_is_short_on_event_day() {
        let event = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();

        assert_eq!(ttl_for(event, event), TTL_EVENT_DAY);
        assert_eq!(
            ttl_for(event, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()),
            TTL_DEFAULT
        );
    }
}
