//! Entity identity - prefixed ULIDs for rows, printed numbers for documents

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use ulid::Ulid;

/// Row type prefixes used in entity IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    Cmpy,
    User,
    Cust,
    Vehi,
    Estm,
    Item,
    Word,
    Task,
    Shop,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Cmpy => "CMPY",
            EntityPrefix::User => "USER",
            EntityPrefix::Cust => "CUST",
            EntityPrefix::Vehi => "VEHI",
            EntityPrefix::Estm => "ESTM",
            EntityPrefix::Item => "ITEM",
            EntityPrefix::Word => "WORD",
            EntityPrefix::Task => "TASK",
            EntityPrefix::Shop => "SHOP",
        }
    }

    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Cmpy,
            EntityPrefix::User,
            EntityPrefix::Cust,
            EntityPrefix::Vehi,
            EntityPrefix::Estm,
            EntityPrefix::Item,
            EntityPrefix::Word,
            EntityPrefix::Task,
            EntityPrefix::Shop,
        ]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityPrefix::all()
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IdParseError::UnknownPrefix(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdParseError {
    #[error("ID is missing the PREFIX- part: {0}")]
    MissingPrefix(String),

    #[error("Unknown entity prefix: {0}")]
    UnknownPrefix(String),

    #[error("Invalid ULID in ID: {0}")]
    InvalidUlid(String),
}

/// Unique row identifier: `PREFIX-ULID`, e.g. `ESTM-01JABCDEF...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl PartialOrd for EntityPrefix {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityPrefix {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl EntityId {
    /// Generate a fresh ID for the given row type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, rest) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingPrefix(s.to_string()))?;
        let prefix: EntityPrefix = prefix.parse()?;
        let ulid = Ulid::from_string(rest).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Printed estimate number, `EST-<year>-<4 digits>`
///
/// Random and not checked against existing rows; two estimates can share a
/// number. IDs stay unique, the number is only a human label.
pub fn estimate_number() -> String {
    document_number("EST", Utc::now().year(), &mut rand::rng())
}

/// Printed work order number, `WO-<year>-<4 digits>`. Same caveat as
/// [`estimate_number`].
pub fn work_order_number() -> String {
    document_number("WO", Utc::now().year(), &mut rand::rng())
}

fn document_number<R: Rng>(prefix: &str, year: i32, rng: &mut R) -> String {
    let n: u32 = rng.random_range(0..9999);
    format!("{}-{:04}-{:04}", prefix, year, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_pattern(number: &str, prefix: &str) -> bool {
        let parts: Vec<&str> = number.split('-').collect();
        parts.len() == 3
            && parts[0] == prefix
            && parts[1].len() == 4
            && parts[2].len() == 4
            && parts[1].chars().all(|c| c.is_ascii_digit())
            && parts[2].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_id_display_and_parse() {
        let id = EntityId::new(EntityPrefix::Estm);
        let s = id.to_string();
        assert!(s.starts_with("ESTM-"));
        assert_eq!(s.len(), 31);
        assert_eq!(EntityId::parse(&s).unwrap(), id);
    }

    #[test]
    fn test_id_parse_errors() {
        assert!(matches!(
            EntityId::parse("nodash"),
            Err(IdParseError::MissingPrefix(_))
        ));
        assert!(matches!(
            EntityId::parse("NOPE-01ARZ3NDEKTSV4RRFFQ69G5FAV"),
            Err(IdParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            EntityId::parse("CUST-not-a-ulid"),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_prefix_case_insensitive() {
        let id = EntityId::parse("cust-01ARZ3NDEKTSV4RRFFQ69G5FAV").unwrap();
        assert_eq!(id.prefix(), EntityPrefix::Cust);
    }

    #[test]
    fn test_id_serde_as_string() {
        let id = EntityId::new(EntityPrefix::Word);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_document_numbers() {
        assert!(matches_pattern(&estimate_number(), "EST"));
        assert!(matches_pattern(&work_order_number(), "WO"));
    }

    #[test]
    fn test_document_number_zero_padded() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let n = document_number("EST", 2026, &mut rng);
            assert!(n.starts_with("EST-2026-"));
            assert_eq!(n.len(), "EST-2026-0000".len());
        }
    }
}
