//! Operator token selection (`--match` / `--bro`)

use crate::stream::CreationEvent;

/// Optional name/symbol and creator selection applied after the admission filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenMatcher {
    /// Lower-cased substring to look for in the token name or symbol
    name_pattern: Option<String>,
    /// Creator address that must have deployed the token
    creator: Option<String>,
}

impl TokenMatcher {
    pub fn new(match_string: Option<&str>, bro_address: Option<&str>) -> Self {
        Self {
            name_pattern: match_string
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase),
            creator: bro_address
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_active(&self) -> bool {
        self.name_pattern.is_some() || self.creator.is_some()
    }

    /// Returns a description of the first mismatch, or `None` when the event
    /// satisfies every configured selection
    pub fn mismatch(&self, event: &CreationEvent) -> Option<String> {
        if let Some(pattern) = &self.name_pattern {
            let hit = event.name.to_lowercase().contains(pattern)
                || event.symbol.to_lowercase().contains(pattern);
            if !hit {
                return Some(format!("name/symbol does not contain '{}'", pattern));
            }
        }

        if let Some(creator) = &self.creator {
            if event.creator != *creator {
                return Some(format!("creator {} is not {}", event.creator, creator));
            }
        }

        None
    }
}
