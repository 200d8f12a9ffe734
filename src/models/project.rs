// SPDX-License-Identifier: MIT

//! Project model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project row in the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub project_url: String,
    /// Insertion timestamp, used for default ordering (newest first)
    pub created_at: DateTime<Utc>,
}
