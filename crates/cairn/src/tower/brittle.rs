//! Brittleness heuristic over repository metadata.

use chrono::{NaiveDate, Utc};

use crate::dag::Node;

const ABANDONED_DAYS: i64 = 2 * 365;
const STALE_DAYS: i64 = 365;
const LOW_STAR_COUNT: i64 = 100;
const MIN_MAINTAINER_COUNT: usize = 2;

/// A package is brittle when its repository is archived, has seen no commit
/// for two years, or has been quiet for over a year while being carried by
/// too few maintainers or too little usage.
pub fn is_brittle(n: &Node) -> bool {
    if n.meta
        .get("repo_archived")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
    {
        return true;
    }

    let Some(last_commit) = n
        .meta
        .get("repo_last_commit")
        .and_then(|v| v.as_str())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    else {
        return false;
    };

    let age_days = (Utc::now().date_naive() - last_commit).num_days();
    if age_days > ABANDONED_DAYS {
        return true;
    }
    if age_days <= STALE_DAYS {
        return false;
    }

    let maintainers = n
        .meta
        .get("repo_maintainers")
        .and_then(|v| v.as_array())
        .map(Vec::len)
        .unwrap_or(0);
    let stars = n
        .meta
        .get("repo_stars")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    maintainers <= MIN_MAINTAINER_COUNT || stars < LOW_STAR_COUNT
}
