// SPDX-License-Identifier: MIT

//! Social link model and the fixed platform set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Social link row in the `socials` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Social {
    pub id: i64,
    pub platform: Platform,
    pub url: String,
    /// Insertion timestamp, used for default ordering (oldest first)
    pub created_at: DateTime<Utc>,
}

/// The platforms the site knows how to render an icon for.
///
/// Stored as the exact display string. Writes accept only the known
/// names (enforced via `FromStr` at the API edge); reads are lenient,
/// folding any other stored string into `Other` so a single odd row
/// never fails the whole listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    GitHub,
    LinkedIn,
    Twitter,
    Instagram,
    YouTube,
    Twitch,
    Website,
    /// A stored platform string outside the known set (rendered icon-less)
    Other(String),
}

impl Platform {
    pub const KNOWN: [Platform; 7] = [
        Platform::GitHub,
        Platform::LinkedIn,
        Platform::Twitter,
        Platform::Instagram,
        Platform::YouTube,
        Platform::Twitch,
        Platform::Website,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Platform::GitHub => "GitHub",
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "Twitter",
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
            Platform::Twitch => "Twitch",
            Platform::Website => "Website",
            Platform::Other(name) => name,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::KNOWN
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPlatform(s.to_string()))
    }
}

impl Serialize for Platform {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or(Platform::Other(name)))
    }
}

/// Error for a platform name outside the fixed set.
#[derive(Debug, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);
