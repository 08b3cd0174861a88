// Search-query construction for the sweep's two candidate sets.
//
// Pure string building so the exact platform queries stay unit-testable
// without any client in the loop.

use chrono::{DateTime, Utc};

use crate::core::policy::{ItemType, Policy};

use super::moderation_models::RepoRef;

fn type_restriction(scope: ItemType) -> &'static str {
    match scope {
        ItemType::Issues => "is:issue",
        ItemType::Pulls => "is:pr",
    }
}

/// Query for open items that are not yet marked and not exempt: these are
/// the candidates for censor-or-mark.
pub fn offense_query(repo: &RepoRef, policy: &Policy, scope: ItemType) -> String {
    let mut parts = vec![format!("repo:{}", repo.slug()), "is:open".to_string()];
    parts.push(format!("-label:\"{}\"", policy.profanity_label(scope)));
    for label in policy.exempt_labels(scope) {
        parts.push(format!("-label:\"{label}\""));
    }
    parts.push(type_restriction(scope).to_string());
    if policy.exempt_projects(scope) {
        parts.push("no:project".to_string());
    }
    if policy.exempt_milestones(scope) {
        parts.push("no:milestone".to_string());
    }
    parts.join(" ")
}

/// Query for open, marked items whose last update predates the close
/// threshold: these are the candidates for auto-close.
pub fn closable_query(
    repo: &RepoRef,
    policy: &Policy,
    scope: ItemType,
    days: f64,
    now: DateTime<Utc>,
) -> String {
    format!(
        "repo:{} is:open updated:<{} label:\"{}\" {}",
        repo.slug(),
        since(days, now).format("%Y-%m-%dT%H:%M:%S"),
        policy.profanity_label(scope),
        type_restriction(scope)
    )
}

/// The instant `days` days before `now`, clamped so it never predates the
/// epoch (the platform rejects earlier timestamps).
pub fn since(days: f64, now: DateTime<Utc>) -> DateTime<Utc> {
    let ttl = chrono::Duration::milliseconds((days * 86_400_000.0) as i64);
    now.checked_sub_signed(ttl)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .max(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use crate::core::policy::{PolicyOverride, PolicyValues};

    use super::*;

    fn repo() -> RepoRef {
        RepoRef::new("octo", "sandbox")
    }

    #[test]
    fn offense_query_excludes_marker_and_exempt_labels() {
        let policy = Policy {
            base: PolicyValues {
                exempt_labels: vec!["wontfix".to_string(), "on hold".to_string()],
                ..PolicyValues::default()
            },
            ..Policy::default()
        };

        let query = offense_query(&repo(), &policy, ItemType::Issues);
        assert_eq!(
            query,
            "repo:octo/sandbox is:open -label:\"inappropriate\" -label:\"wontfix\" \
             -label:\"on hold\" is:issue"
        );
    }

    #[test]
    fn offense_query_honors_project_and_milestone_exemptions() {
        let policy = Policy {
            base: PolicyValues {
                exempt_projects: true,
                exempt_milestones: true,
                ..PolicyValues::default()
            },
            ..Policy::default()
        };

        let query = offense_query(&repo(), &policy, ItemType::Pulls);
        assert!(query.ends_with("is:pr no:project no:milestone"));
    }

    #[test]
    fn offense_query_uses_the_type_scoped_label() {
        let policy = Policy {
            pulls: PolicyOverride {
                profanity_label: Some("pr-inappropriate".to_string()),
                ..PolicyOverride::default()
            },
            ..Policy::default()
        };

        let query = offense_query(&repo(), &policy, ItemType::Pulls);
        assert!(query.contains("-label:\"pr-inappropriate\""));
    }

    #[test]
    fn closable_query_formats_the_cutoff_timestamp() {
        let now = Utc.with_ymd_and_hms(2020, 6, 10, 12, 0, 0).unwrap();
        let query = closable_query(&repo(), &Policy::default(), ItemType::Issues, 2.0, now);
        assert_eq!(
            query,
            "repo:octo/sandbox is:open updated:<2020-06-08T12:00:00 \
             label:\"inappropriate\" is:issue"
        );
    }

    #[test]
    fn since_clamps_to_the_epoch() {
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(since(1_000_000.0, now), DateTime::UNIX_EPOCH);
        // A small threshold stays where it should be.
        let cutoff = since(1.0, now);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2019, 12, 31, 0, 0, 0).unwrap());
    }
}
