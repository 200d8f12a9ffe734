// SPDX-License-Identifier: MIT

//! Profile model: one row per signed-in identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile row in the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Identity provider user id (also the row's primary key)
    pub id: Uuid,
    /// Display name, unique across all profiles by convention
    pub username: String,
    /// Admin flag gating mutation endpoints
    #[serde(default)]
    pub is_admin: bool,
}

/// Insert payload for a freshly signed-up identity.
///
/// `is_admin` is left to the table default (false); admins are promoted
/// out-of-band, never through this API.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub username: String,
}
