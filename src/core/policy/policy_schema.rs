// Best-effort schema pass over the raw YAML configuration.
//
// Validation never aborts: every invalid field is downgraded to its
// default and reported as a repo-scoped warning, so a typo in one key
// cannot take moderation offline for the whole repository.

use serde_yaml::{Mapping, Value};

use super::policy_models::{ItemType, Policy, PolicyOverride, PolicyValues, MAX_ACTIONS_PER_RUN};

/// Keys that may appear at the top level of the config file.
const TOP_LEVEL_KEYS: [&str; 17] = [
    "perform",
    "censor",
    "placeholder",
    "profanityLabel",
    "markComment",
    "unmarkComment",
    "closeComment",
    "daysUntilClose",
    "exemptLabels",
    "exemptProjects",
    "exemptMilestones",
    "limitPerRun",
    "only",
    "extraWords",
    "exemptWords",
    "issues",
    "pulls",
];

/// Keys that may appear inside an `issues:` / `pulls:` override block.
const OVERRIDE_KEYS: [&str; 12] = [
    "perform",
    "censor",
    "placeholder",
    "profanityLabel",
    "markComment",
    "unmarkComment",
    "closeComment",
    "daysUntilClose",
    "exemptLabels",
    "exemptProjects",
    "exemptMilestones",
    "limitPerRun",
];

/// Resolves the effective policy for one repository, logging every
/// validation warning scoped to that repository. `raw = None` means the
/// repository has no configuration at all, which yields the disabled
/// policy so in-flight calls become no-ops.
pub fn resolve(owner: &str, repo: &str, raw: Option<&Value>, perform_default: bool) -> Policy {
    match raw {
        None => Policy::disabled(),
        Some(value) => {
            let (policy, warnings) = validate(value, perform_default);
            for warning in &warnings {
                tracing::warn!(owner, repo, %warning, "invalid moderation config");
            }
            policy
        }
    }
}

/// Pure schema pass: returns the best-effort policy plus the list of
/// validation warnings for the caller to report.
pub fn validate(raw: &Value, perform_default: bool) -> (Policy, Vec<String>) {
    let mut warnings = Vec::new();

    let map = match raw {
        Value::Mapping(map) => Some(map),
        // An empty config file parses as null and simply means "all defaults".
        Value::Null => None,
        _ => {
            warnings.push("configuration must be a mapping".to_string());
            None
        }
    };

    if let Some(map) = map {
        warn_unknown_keys(map, &TOP_LEVEL_KEYS, "", &mut warnings);
    }

    let defaults = PolicyValues::default();
    let base = PolicyValues {
        perform: bool_field(map, "perform", "", &mut warnings).unwrap_or(perform_default),
        censor: bool_field(map, "censor", "", &mut warnings).unwrap_or(defaults.censor),
        placeholder: placeholder_field(map, "placeholder", "", &mut warnings)
            .unwrap_or(defaults.placeholder),
        profanity_label: label_field(map, "profanityLabel", "", &mut warnings)
            .unwrap_or(defaults.profanity_label),
        mark_comment: comment_field(map, "markComment", "", &mut warnings)
            .unwrap_or(defaults.mark_comment),
        unmark_comment: comment_field(map, "unmarkComment", "", &mut warnings)
            .unwrap_or(defaults.unmark_comment),
        close_comment: comment_field(map, "closeComment", "", &mut warnings)
            .unwrap_or(defaults.close_comment),
        days_until_close: days_field(map, "daysUntilClose", "", &mut warnings)
            .unwrap_or(defaults.days_until_close),
        exempt_labels: string_list_field(map, "exemptLabels", "", &mut warnings)
            .unwrap_or(defaults.exempt_labels),
        exempt_projects: bool_field(map, "exemptProjects", "", &mut warnings)
            .unwrap_or(defaults.exempt_projects),
        exempt_milestones: bool_field(map, "exemptMilestones", "", &mut warnings)
            .unwrap_or(defaults.exempt_milestones),
        limit_per_run: limit_field(map, "limitPerRun", "", &mut warnings)
            .unwrap_or(defaults.limit_per_run),
    };

    let policy = Policy {
        base,
        issues: override_block(map, "issues", &mut warnings),
        pulls: override_block(map, "pulls", &mut warnings),
        only: only_field(map, &mut warnings),
        extra_words: string_list_field(map, "extraWords", "", &mut warnings).unwrap_or_default(),
        exempt_words: string_list_field(map, "exemptWords", "", &mut warnings).unwrap_or_default(),
    };

    (policy, warnings)
}

fn lookup<'a>(map: Option<&'a Mapping>, key: &str) -> Option<&'a Value> {
    map.and_then(|map| map.get(key))
}

fn warn_unknown_keys(map: &Mapping, known: &[&str], prefix: &str, warnings: &mut Vec<String>) {
    for key in map.keys() {
        let Value::String(name) = key else {
            warnings.push(format!("{prefix}configuration keys must be strings"));
            continue;
        };
        // `_extends` belongs to the platform's config-merge mechanics and
        // is resolved before the file reaches us.
        if name == "_extends" {
            continue;
        }
        if !known.contains(&name.as_str()) {
            warnings.push(format!("unknown configuration key \"{prefix}{name}\""));
        }
    }
}

fn bool_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<bool> {
    match lookup(map, key)? {
        Value::Bool(value) => Some(*value),
        _ => {
            warnings.push(format!("\"{prefix}{key}\" must be a boolean"));
            None
        }
    }
}

fn placeholder_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<char> {
    if let Value::String(value) = lookup(map, key)? {
        let mut chars = value.chars();
        if let (Some(glyph), None) = (chars.next(), chars.next()) {
            return Some(glyph);
        }
    }
    warnings.push(format!("\"{prefix}{key}\" must be a single character"));
    None
}

fn label_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<String> {
    match lookup(map, key)? {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        _ => {
            warnings.push(format!("\"{prefix}{key}\" must be a non-empty string"));
            None
        }
    }
}

/// A comment setting is either the comment text or `false` to disable it.
fn comment_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<Option<String>> {
    match lookup(map, key)? {
        Value::String(value) => Some(Some(value.clone())),
        Value::Bool(false) => Some(None),
        _ => {
            warnings.push(format!("\"{prefix}{key}\" must be a string or false"));
            None
        }
    }
}

/// The close threshold is either a number of days or `false` to disable
/// auto-closing.
fn days_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<Option<f64>> {
    match lookup(map, key)? {
        Value::Number(value) => match value.as_f64() {
            Some(days) => Some(Some(days)),
            None => {
                warnings.push(format!("\"{prefix}{key}\" must be a number or false"));
                None
            }
        },
        Value::Bool(false) => Some(None),
        _ => {
            warnings.push(format!("\"{prefix}{key}\" must be a number or false"));
            None
        }
    }
}

/// Accepts null (empty list), a single string, or a list of strings.
fn string_list_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<Vec<String>> {
    match lookup(map, key)? {
        Value::Null => Some(Vec::new()),
        Value::String(value) => Some(vec![value.clone()]),
        Value::Sequence(values) => {
            let mut list = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(entry) => list.push(entry.clone()),
                    _ => {
                        warnings.push(format!("\"{prefix}{key}\" must be a list of strings"));
                        return None;
                    }
                }
            }
            Some(list)
        }
        _ => {
            warnings.push(format!("\"{prefix}{key}\" must be a list of strings"));
            None
        }
    }
}

fn limit_field(
    map: Option<&Mapping>,
    key: &str,
    prefix: &str,
    warnings: &mut Vec<String>,
) -> Option<u32> {
    let invalid = format!(
        "\"{prefix}{key}\" must be an integer between 1 and {MAX_ACTIONS_PER_RUN}"
    );
    match lookup(map, key)? {
        Value::Number(value) => match value.as_u64() {
            Some(limit) if (1..=u64::from(MAX_ACTIONS_PER_RUN)).contains(&limit) => {
                Some(limit as u32)
            }
            _ => {
                warnings.push(invalid);
                None
            }
        },
        _ => {
            warnings.push(invalid);
            None
        }
    }
}

fn only_field(map: Option<&Mapping>, warnings: &mut Vec<String>) -> Option<ItemType> {
    match lookup(map, "only")? {
        Value::String(value) if value == "issues" => Some(ItemType::Issues),
        Value::String(value) if value == "pulls" => Some(ItemType::Pulls),
        Value::Null => None,
        _ => {
            warnings.push("\"only\" must be one of [issues, pulls]".to_string());
            None
        }
    }
}

fn override_block(map: Option<&Mapping>, key: &str, warnings: &mut Vec<String>) -> PolicyOverride {
    let block = match lookup(map, key) {
        None => return PolicyOverride::default(),
        Some(Value::Mapping(block)) => block,
        Some(_) => {
            warnings.push(format!("\"{key}\" must be a mapping"));
            return PolicyOverride::default();
        }
    };

    let prefix = format!("{key}.");
    warn_unknown_keys(block, &OVERRIDE_KEYS, &prefix, warnings);

    let block = Some(block);
    PolicyOverride {
        perform: bool_field(block, "perform", &prefix, warnings),
        censor: bool_field(block, "censor", &prefix, warnings),
        placeholder: placeholder_field(block, "placeholder", &prefix, warnings),
        profanity_label: label_field(block, "profanityLabel", &prefix, warnings),
        mark_comment: comment_field(block, "markComment", &prefix, warnings),
        unmark_comment: comment_field(block, "unmarkComment", &prefix, warnings),
        close_comment: comment_field(block, "closeComment", &prefix, warnings),
        days_until_close: days_field(block, "daysUntilClose", &prefix, warnings),
        exempt_labels: string_list_field(block, "exemptLabels", &prefix, warnings),
        exempt_projects: bool_field(block, "exemptProjects", &prefix, warnings),
        exempt_milestones: bool_field(block, "exemptMilestones", &prefix, warnings),
        limit_per_run: limit_field(block, "limitPerRun", &prefix, warnings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).expect("test yaml should parse")
    }

    fn validate_str(yaml: &str) -> (Policy, Vec<String>) {
        validate(&parse(yaml), true)
    }

    #[test]
    fn empty_config_uses_defaults() {
        let (policy, warnings) = validate(&Value::Null, true);
        assert!(warnings.is_empty());
        assert!(policy.perform(ItemType::Issues));
        assert!(!policy.censor(ItemType::Issues));
        assert_eq!(policy.placeholder(ItemType::Issues), '*');
        assert_eq!(policy.profanity_label(ItemType::Pulls), "inappropriate");
        assert_eq!(policy.days_until_close(ItemType::Issues), Some(2.0));
        assert_eq!(policy.limit_per_run(ItemType::Issues), 30);
        assert!(policy.mark_comment(ItemType::Issues).is_some());
        assert!(policy.unmark_comment(ItemType::Issues).is_none());
        assert!(policy.close_comment(ItemType::Issues).is_none());
    }

    #[test]
    fn accepts_valid_configs_without_warnings() {
        let valid = [
            "censor: true",
            "censor: false",
            "placeholder: 'x'",
            "extraWords: [duck]",
            "extraWords: duck",
            "extraWords: ~",
            "exemptWords: [damn]",
            "daysUntilClose: false",
            "daysUntilClose: 1",
            "exemptLabels: [foo]",
            "exemptLabels: foo",
            "exemptLabels: ~",
            "exemptProjects: true",
            "exemptMilestones: false",
            "profanityLabel: profanity",
            "markComment: profanity yo",
            "markComment: false",
            "unmarkComment: not profanity",
            "unmarkComment: false",
            "closeComment: closing yo",
            "closeComment: false",
            "limitPerRun: 1",
            "limitPerRun: 30",
            "only: ~",
            "only: issues",
            "only: pulls",
            "pulls: {daysUntilClose: 2}",
            "issues: {profanityLabel: profanity-issue}",
            "_extends: .github",
        ];

        for yaml in valid {
            let (_, warnings) = validate_str(yaml);
            assert!(warnings.is_empty(), "unexpected warnings for {yaml:?}: {warnings:?}");
        }
    }

    #[test]
    fn invalid_fields_downgrade_to_defaults_with_warnings() {
        let cases: [(&str, &str); 10] = [
            ("censor: nope", "\"censor\" must be a boolean"),
            ("placeholder: ''", "\"placeholder\" must be a single character"),
            ("placeholder: '**'", "\"placeholder\" must be a single character"),
            ("placeholder: false", "\"placeholder\" must be a single character"),
            ("daysUntilClose: true", "\"daysUntilClose\" must be a number or false"),
            ("profanityLabel: ''", "\"profanityLabel\" must be a non-empty string"),
            ("profanityLabel: [a, b]", "\"profanityLabel\" must be a non-empty string"),
            ("limitPerRun: 0", "\"limitPerRun\" must be an integer between 1 and 30"),
            ("limitPerRun: 31", "\"limitPerRun\" must be an integer between 1 and 30"),
            ("markComment: [nope]", "\"markComment\" must be a string or false"),
        ];

        for (yaml, expected) in cases {
            let (policy, warnings) = validate_str(yaml);
            assert_eq!(warnings, vec![expected.to_string()], "for {yaml:?}");
            // The invalid field fell back to its default.
            assert_eq!(policy, Policy::default(), "for {yaml:?}");
        }
    }

    #[test]
    fn valid_fields_survive_an_invalid_sibling() {
        let (policy, warnings) = validate_str("censor: true\nlimitPerRun: 99");
        assert_eq!(warnings.len(), 1);
        assert!(policy.censor(ItemType::Issues));
        assert_eq!(policy.limit_per_run(ItemType::Issues), 30);
    }

    #[test]
    fn type_override_resolves_before_top_level() {
        let (policy, warnings) =
            validate_str("perform: true\nissues: {perform: false, limitPerRun: 3}");
        assert!(warnings.is_empty());
        assert!(!policy.perform(ItemType::Issues));
        assert!(policy.perform(ItemType::Pulls));
        assert_eq!(policy.limit_per_run(ItemType::Issues), 3);
        assert_eq!(policy.limit_per_run(ItemType::Pulls), 30);
    }

    #[test]
    fn override_warnings_name_the_scoped_key() {
        let (_, warnings) = validate_str("pulls: {limitPerRun: 99}");
        assert_eq!(
            warnings,
            vec!["\"pulls.limitPerRun\" must be an integer between 1 and 30".to_string()]
        );
    }

    #[test]
    fn unknown_keys_are_reported() {
        let (_, warnings) = validate_str("bananas: true");
        assert_eq!(warnings, vec!["unknown configuration key \"bananas\"".to_string()]);
    }

    #[test]
    fn non_mapping_config_warns_and_defaults() {
        let (policy, warnings) = validate_str("- just\n- a\n- list");
        assert_eq!(warnings, vec!["configuration must be a mapping".to_string()]);
        assert_eq!(policy, Policy::default());
    }

    #[test]
    fn perform_default_follows_the_dry_run_switch() {
        let (policy, _) = validate(&Value::Null, false);
        assert!(!policy.perform(ItemType::Issues));
    }

    #[test]
    fn absent_config_resolves_to_the_disabled_policy() {
        let policy = resolve("octo", "sandbox", None, true);
        assert!(!policy.perform(ItemType::Issues));
        assert!(!policy.perform(ItemType::Pulls));
    }

    #[test]
    fn word_lists_accept_single_values() {
        let (policy, warnings) = validate_str("extraWords: duck\nexemptWords: [damn, crap]");
        assert!(warnings.is_empty());
        assert_eq!(policy.extra_words, vec!["duck".to_string()]);
        assert_eq!(
            policy.exempt_words,
            vec!["damn".to_string(), "crap".to_string()]
        );
    }
}
