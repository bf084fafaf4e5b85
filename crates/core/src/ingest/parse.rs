//! Cell-level parsing for the JSON-ish columns of the TMDB exports.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrewEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    job: Option<String>,
}

static OBJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("invalid object regex"));
static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[,\s])"?name"?\s*:\s*"?([^,}"]+)"#).expect("invalid name regex")
});
static JOB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[,\s])"?job"?\s*:\s*"?([^,}"]+)"#).expect("invalid job regex")
});

/// Extract the `name` field of every object in a genre or cast cell.
pub(crate) fn names(cell: &str) -> Vec<String> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Vec::new();
    }
    if let Ok(entries) = serde_json::from_str::<Vec<NamedEntry>>(cell) {
        return entries
            .into_iter()
            .filter_map(|entry| entry.name)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
    }

    OBJECT_RE
        .captures_iter(cell)
        .filter_map(|caps| capture_field(&NAME_RE, caps.get(1)?.as_str()))
        .collect()
}

/// Extract `(job, name)` pairs from a crew cell.
pub(crate) fn jobs(cell: &str) -> Vec<(String, String)> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Vec::new();
    }
    if let Ok(entries) = serde_json::from_str::<Vec<CrewEntry>>(cell) {
        return entries
            .into_iter()
            .filter_map(|entry| Some((entry.job?, entry.name?)))
            .map(|(job, name)| (job.trim().to_string(), name.trim().to_string()))
            .filter(|(job, name)| !job.is_empty() && !name.is_empty())
            .collect();
    }

    OBJECT_RE
        .captures_iter(cell)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            Some((capture_field(&JOB_RE, body)?, capture_field(&NAME_RE, body)?))
        })
        .collect()
}

/// Year prefix of an ISO-like date; `0` when missing or malformed.
pub(crate) fn release_year(date: &str) -> u16 {
    let date = date.trim();
    date.get(..4)
        .and_then(|year| year.parse::<u16>().ok())
        .unwrap_or(0)
}

fn capture_field(pattern: &Regex, body: &str) -> Option<String> {
    pattern
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_genres() {
        let cell = r#"[{"id": 28, "name": "Action"}, {"id": 80, "name": "Crime"}]"#;
        assert_eq!(names(cell), vec!["Action", "Crime"]);
    }

    #[test]
    fn parses_unquoted_genres() {
        let cell = "[{id: 28, name: Action}, {id: 878, name: Science Fiction}]";
        assert_eq!(names(cell), vec!["Action", "Science Fiction"]);
    }

    #[test]
    fn parses_crew_jobs() {
        let cell = r#"[{"credit_id": "x", "job": "Director", "name": "James Cameron"},
                      {"job": "Original Music Composer", "name": "James Horner"},
                      {"job": "Producer"}]"#;
        assert_eq!(
            jobs(cell),
            vec![
                ("Director".to_string(), "James Cameron".to_string()),
                ("Original Music Composer".to_string(), "James Horner".to_string()),
            ]
        );
    }

    #[test]
    fn parses_unquoted_crew() {
        let cell = "[{department: Directing, job: Director, name: Sofia Coppola}]";
        assert_eq!(
            jobs(cell),
            vec![("Director".to_string(), "Sofia Coppola".to_string())]
        );
    }

    #[test]
    fn release_year_falls_back_to_zero() {
        assert_eq!(release_year("2009-12-10"), 2009);
        assert_eq!(release_year(""), 0);
        assert_eq!(release_year("n/a"), 0);
    }
}
