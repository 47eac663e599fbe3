use std::collections::{BTreeSet, HashSet};

/// Every non-fallback locale must define at least the keys of `en-US`.
///
/// The parser is deliberately shallow: it reads `key = ...` lines and skips
/// comments, attributes, variants and continuation lines.
///
/// To add a locale, create `ui/i18n/<locale>/brainplay-ui.ftl`, copy every
/// key from `en-US`, and register the file below.
#[test]
fn all_locales_have_all_fallback_keys() {
    const EN_US: &str = include_str!("../i18n/en-US/brainplay-ui.ftl");
    const ES_ES: &str = include_str!("../i18n/es-ES/brainplay-ui.ftl");

    let fallback_keys = extract_keys(EN_US);
    assert!(
        !fallback_keys.is_empty(),
        "Fallback (en-US) contains no keys."
    );
    assert_no_dup_keys(EN_US, "en-US");

    let locales: &[(&str, &str)] = &[("es-ES", ES_ES)];

    let mut failures = Vec::new();
    for (locale, src) in locales {
        assert_no_dup_keys(src, locale);

        let keys = extract_keys(src);
        let missing: BTreeSet<&String> = fallback_keys.difference(&keys).collect();
        let extra: BTreeSet<&String> = keys.difference(&fallback_keys).collect();

        if !missing.is_empty() {
            failures.push(format!(
                "Locale {locale} is missing {} key(s):\n  {}",
                missing.len(),
                missing.into_iter().cloned().collect::<Vec<_>>().join("\n  ")
            ));
        }
        if !extra.is_empty() {
            failures.push(format!(
                "Locale {locale} defines {} key(s) unknown to en-US:\n  {}",
                extra.len(),
                extra.into_iter().cloned().collect::<Vec<_>>().join("\n  ")
            ));
        }
    }

    assert!(
        failures.is_empty(),
        "Translation completeness check failed:\n\n{}",
        failures.join("\n\n")
    );
}

#[test]
fn placeables_match_between_locales() {
    const EN_US: &str = include_str!("../i18n/en-US/brainplay-ui.ftl");
    const ES_ES: &str = include_str!("../i18n/es-ES/brainplay-ui.ftl");

    for key in ["settings-invalid", "results-session-count"] {
        let en = variables_of(EN_US, key);
        let es = variables_of(ES_ES, key);
        assert!(!en.is_empty(), "{key} should take a variable");
        assert_eq!(en, es, "variables differ for {key}");
    }
}

#[test]
fn manifest_names_the_fluent_domain() {
    const MANIFEST: &str = include_str!("../i18n.toml");
    let domain = MANIFEST
        .lines()
        .filter_map(|line| line.trim().strip_prefix("domain"))
        .filter_map(|rest| rest.trim_start().strip_prefix('='))
        .map(|value| value.trim().trim_matches('"'))
        .next();
    // The `.ftl` files are named after the domain, not the crate.
    assert_eq!(domain, Some("brainplay-ui"));
}

#[test]
fn reject_policy_label_describes_one_answer() {
    const EN_US: &str = include_str!("../i18n/en-US/brainplay-ui.ftl");
    let label = message_value(EN_US, "settings-repeat-reject");
    assert_eq!(label, Some("One answer per stimulus"));
}

fn message_value<'a>(src: &'a str, key: &str) -> Option<&'a str> {
    src.lines()
        .find(|line| message_key(line) == Some(key))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim())
}

fn message_key(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('.') {
        return None;
    }
    let (left, _) = line.split_at(line.find('=')?);
    let key = left.trim();
    let is_key = !key.is_empty()
        && !key.contains(char::is_whitespace)
        && !key.starts_with('[')
        && !key.starts_with('*')
        && !key.starts_with('{');
    is_key.then_some(key)
}

fn extract_keys(src: &str) -> HashSet<String> {
    src.lines().filter_map(message_key).map(str::to_string).collect()
}

fn assert_no_dup_keys(src: &str, locale: &str) {
    let mut seen = HashSet::new();
    let dups: BTreeSet<&str> = src
        .lines()
        .filter_map(message_key)
        .filter(|key| !seen.insert(*key))
        .collect();

    assert!(
        dups.is_empty(),
        "Duplicate key definitions in {locale}:\n  {}",
        dups.into_iter().collect::<Vec<_>>().join("\n  ")
    );
}

/// `$variables` used by one message, including its variant lines.
fn variables_of(src: &str, key: &str) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    let mut inside = false;
    for line in src.lines() {
        match message_key(line) {
            Some(found) => inside = found == key,
            None if line.trim().is_empty() || line.starts_with('#') => inside = false,
            None => {}
        }
        if !inside {
            continue;
        }
        for chunk in line.split('$').skip(1) {
            let name: String = chunk
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
                .collect();
            if !name.is_empty() {
                vars.insert(name);
            }
        }
    }
    vars
}
