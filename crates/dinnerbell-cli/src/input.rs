//! Reading user-supplied documents and identifiers.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Parse a `.toml` file as TOML and anything else as JSON.
pub fn read_document<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let content = std::fs::read_to_string(file_path)
        .with_context(|| format!("failed to read file: {file_path}"))?;
    parse_document(Path::new(file_path), &content)
}

fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        toml::from_str(content).with_context(|| format!("invalid TOML in {}", path.display()))
    } else {
        serde_json::from_str(content).with_context(|| format!("invalid JSON in {}", path.display()))
    }
}

pub fn parse_id(kind: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("invalid {kind} ID: {raw}"))
}

pub fn parse_pickup(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid pickup time (expected RFC 3339): {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dinnerbell_db::models::Preferences;

    #[test]
    fn toml_and_json_documents_parse_to_the_same_value() {
        let json = r#"{"dietary_restrictions": ["vegetarian"], "cooking_time_max": 30}"#;
        let toml = "dietary_restrictions = [\"vegetarian\"]\ncooking_time_max = 30\n";

        let a: Preferences = parse_document(Path::new("prefs.json"), json).unwrap();
        let b: Preferences = parse_document(Path::new("prefs.TOML"), toml).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.cooking_time_max, 30);
    }

    #[test]
    fn unknown_extension_is_read_as_json() {
        let err = parse_document::<Preferences>(Path::new("prefs.txt"), "cooking_time_max = 3")
            .unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "{err}");
    }

    #[test]
    fn pickup_time_is_normalized_to_utc() {
        let t = parse_pickup("2026-10-19T17:30:00-04:00").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2026, 10, 19, 21, 30, 0).unwrap());
        assert!(parse_pickup("tomorrow").is_err());
    }

    #[test]
    fn bad_id_names_its_kind() {
        let err = parse_id("plan", "nope").unwrap_err();
        assert_eq!(err.to_string(), "invalid plan ID: nope");
    }
}
