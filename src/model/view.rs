// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use super::ids::{BusinessUnitId, IdError};

/// The active filter context: the whole organization or one business unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewContext {
    Company,
    Business(BusinessUnitId),
}

impl ViewContext {
    pub fn tab_key(&self) -> TabKey {
        match self {
            Self::Company => TabKey::Company,
            Self::Business(business_id) => TabKey::Business(business_id.clone()),
        }
    }
}

/// Partition key for per-tab state such as node positions.
///
/// Canonical string form is `"company"` or `"business:<id>"`; that form is
/// what persisted position records carry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TabKey {
    Company,
    Business(BusinessUnitId),
}

impl fmt::Display for TabKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => f.write_str("company"),
            Self::Business(business_id) => write!(f, "business:{business_id}"),
        }
    }
}

impl FromStr for TabKey {
    type Err = ParseTabKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "company" {
            return Ok(Self::Company);
        }
        if let Some(raw_id) = s.strip_prefix("business:") {
            let business_id =
                BusinessUnitId::new(raw_id).map_err(|source| ParseTabKeyError::InvalidBusinessId {
                    value: raw_id.to_owned(),
                    source,
                })?;
            return Ok(Self::Business(business_id));
        }
        Err(ParseTabKeyError::UnknownTab {
            value: s.to_owned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseTabKeyError {
    UnknownTab { value: String },
    InvalidBusinessId { value: String, source: IdError },
}

impl fmt::Display for ParseTabKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTab { value } => write!(f, "unknown tab key {value:?}"),
            Self::InvalidBusinessId { value, source } => {
                write!(f, "invalid business id in tab key {value:?}: {source}")
            }
        }
    }
}

impl std::error::Error for ParseTabKeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBusinessId { source, .. } => Some(source),
            Self::UnknownTab { .. } => None,
        }
    }
}

/// A node's coordinates on one tab's canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}
