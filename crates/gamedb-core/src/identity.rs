//! # Game Identifier Newtype
//!
//! Newtype wrapper for the identifier of a single game record.
//! A game's file name (sans extension) and its embedded root `id` field
//! must both parse to the same [`GameId`] — comparison happens on the
//! parsed value, so textual case differences never matter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::IdentityError;

/// Unique identifier for a game record.
///
/// Wraps a [`Uuid`]; equality and hashing are on the 128-bit value,
/// not on any particular textual rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    /// Parse a game identifier from its textual form.
    ///
    /// Accepts the canonical hyphenated UUID form in any case.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::MalformedId`] if the input is not a
    /// well-formed UUID.
    pub fn parse(value: &str) -> Result<Self, IdentityError> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| IdentityError::MalformedId {
                value: value.to_string(),
            })
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Uuid displays as lowercase hyphenated form.
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GameId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
