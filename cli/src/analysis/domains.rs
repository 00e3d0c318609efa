use daytrace_protocol::DomainCategory;

use crate::config::DomainPatterns;

/// Whether `host` matches one categorization pattern.
///
/// Supported forms, compared case-insensitively:
/// - `example.com` exact, or any subdomain of it (`sub.example.com`)
/// - `*.example.com` anything ending in `.example.com`
/// - `docs.*` anything starting with `docs.`
pub fn matches_pattern(host: &str, pattern: &str) -> bool {
    let host = host.to_ascii_lowercase();
    let pattern = pattern.trim().to_ascii_lowercase();
    if host.is_empty() || pattern.is_empty() {
        return false;
    }

    if host == pattern {
        return true;
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        return !suffix.is_empty() && host.ends_with(suffix);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return !prefix.is_empty() && host.starts_with(prefix);
    }

    host.ends_with(&format!(".{pattern}"))
}

/// Categorizes `host` against the work, distraction and neutral lists in
/// that order; the first match wins and anything unmatched is neutral.
///
/// Only an empty host has no category.
pub fn classify(
    host: &str,
    work: &[String],
    distraction: &[String],
    neutral: &[String],
) -> Option<DomainCategory> {
    if host.trim().is_empty() {
        return None;
    }

    let matches_any = |patterns: &[String]| patterns.iter().any(|p| matches_pattern(host, p));

    let category = if matches_any(work) {
        DomainCategory::Work
    } else if matches_any(distraction) {
        DomainCategory::Distraction
    } else if matches_any(neutral) {
        DomainCategory::Neutral
    } else {
        DomainCategory::default()
    };

    Some(category)
}

pub fn classify_with(host: &str, patterns: &DomainPatterns) -> Option<DomainCategory> {
    classify(host, &patterns.work, &patterns.distraction, &patterns.neutral)
}

/// Extracts the hostname of an http(s) URL, lower-cased and without a
/// leading `www.`. Other schemes yield `None`.
pub fn host_of(url: &str) -> Option<String> {
    let url = url.trim();
    let (scheme, rest) = url.split_once("://")?;
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return None;
    }

    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host_port = authority
        .rsplit_once('@')
        .map(|(_, host)| host)
        .unwrap_or(authority);
    let host = if host_port.starts_with('[') {
        // IPv6 literal
        host_port.split_once(']').map(|(h, _)| &h[1..]).unwrap_or(host_port)
    } else {
        host_port.split(':').next().unwrap_or(host_port)
    };

    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_suffix() {
        assert!(matches_pattern("mail.google.com", "*.google.com"));
        assert!(!matches_pattern("google.com", "*.google.com"));
        assert!(!matches_pattern("notgoogle.org", "*.google.com"));
    }

    #[test]
    fn test_wildcard_prefix() {
        assert!(matches_pattern("docs.python.org", "docs.*"));
        assert!(!matches_pattern("python.org", "docs.*"));
    }

    #[test]
    fn test_bare_label_matches_subdomains() {
        assert!(matches_pattern("mycompany.atlassian.net", "atlassian.net"));
        assert!(matches_pattern("atlassian.net", "atlassian.net"));
        assert!(!matches_pattern("fakeatlassian.net", "atlassian.net"));
    }

    #[test]
    fn test_matching_ignores_case() {
        assert!(matches_pattern("GitHub.com", "github.COM"));
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        assert!(!matches_pattern("github.com", ""));
        assert!(!matches_pattern("github.com", "*"));
    }

    #[test]
    fn test_classify_order_work_first() {
        let work = list(&["youtube.com"]);
        let distraction = list(&["youtube.com"]);
        assert_eq!(
            classify("youtube.com", &work, &distraction, &[]),
            Some(DomainCategory::Work)
        );
    }

    #[test]
    fn test_unmatched_defaults_to_neutral() {
        assert_eq!(
            classify("example.org", &list(&["github.com"]), &list(&["reddit.com"]), &[]),
            Some(DomainCategory::Neutral)
        );
    }

    #[test]
    fn test_empty_host_has_no_category() {
        assert_eq!(classify("", &[], &[], &[]), None);
        assert_eq!(classify("  ", &[], &[], &[]), None);
    }

    #[test]
    fn test_default_patterns() {
        let patterns = DomainPatterns::default();
        assert_eq!(
            classify_with("mycompany.atlassian.net", &patterns),
            Some(DomainCategory::Work)
        );
        assert_eq!(
            classify_with("old.reddit.com", &patterns),
            Some(DomainCategory::Distraction)
        );
        assert_eq!(
            classify_with("mail.google.com", &patterns),
            Some(DomainCategory::Neutral)
        );
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://www.GitHub.com/rust-lang"), Some("github.com".to_string()));
        assert_eq!(
            host_of("http://user:pw@docs.rs:8080/chrono?x=1"),
            Some("docs.rs".to_string())
        );
        assert_eq!(host_of("https://[::1]:3000/"), Some("::1".to_string()));
        assert_eq!(host_of("about:blank"), None);
        assert_eq!(host_of("file:///Users/me/notes.txt"), None);
        assert_eq!(host_of("chrome://newtab/"), None);
        assert_eq!(host_of("https:///nohost"), None);
    }
}
