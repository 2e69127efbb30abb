//! Shared helper functions for CLI commands

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

use crate::core::identity::EntityId;

/// Parse an ID argument
pub fn parse_id(s: &str) -> Result<EntityId> {
    EntityId::parse(s.trim()).map_err(|e| miette::miette!("invalid ID '{}': {}", s, e))
}

pub fn parse_id_opt(s: Option<&str>) -> Result<Option<EntityId>> {
    s.map(parse_id).transpose()
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn format_money(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub fn format_opt(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Accept `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp
pub fn parse_datetime(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{}'", s))
}

/// Read a YAML (or JSON) document from a file, or stdin when the path is `-`
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).into_diagnostic()?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("cannot read {}: {}", path.display(), e))?
    };
    serde_yml::from_str(&content)
        .map_err(|e| miette::miette!("invalid document {}: {}", path.display(), e))
}

/// Ask before a destructive action; `yes` skips the prompt
///
/// Without a terminal there is nobody to ask, so the action is refused.
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(miette::miette!(
            help = "pass --yes to confirm non-interactively",
            "refusing to {} without confirmation",
            prompt
        ));
    }
    dialoguer::Confirm::new()
        .with_prompt(format!("Really {}?", prompt))
        .default(false)
        .interact()
        .into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("brakes", 10), "brakes");
        assert_eq!(truncate_str("front brake pads and rotors", 10), "front b...");
        assert_eq!(truncate_str("ñandú ñandú", 8), "ñandú...");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("512.01".parse().unwrap()), "$512.01");
        assert_eq!(format_money("5".parse().unwrap()), "$5.00");
        assert_eq!(format_money("-20".parse().unwrap()), "-$20.00");
    }

    #[test]
    fn test_parse_datetime() {
        let d = parse_datetime("2026-03-14").unwrap();
        assert_eq!(d.to_rfc3339(), "2026-03-14T00:00:00+00:00");
        let d = parse_datetime("2026-03-14T09:30:00-04:00").unwrap();
        assert_eq!(d.to_rfc3339(), "2026-03-14T13:30:00+00:00");
        assert!(parse_datetime("next tuesday").is_err());
    }

    #[test]
    fn test_parse_id() {
        let id = EntityId::new(crate::core::identity::EntityPrefix::Cust);
        assert_eq!(parse_id(&format!(" {} ", id)).unwrap(), id);
        assert!(parse_id("CUST-nope").is_err());
    }

    #[test]
    fn test_read_document() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("items.yaml");
        std::fs::write(&path, "- description: Oil filter\n  unitPrice: 12.5\n").unwrap();
        let items: Vec<crate::entities::estimate::ItemInput> = read_document(&path).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].unit_price, Some("12.5".parse().unwrap()));
    }
}
