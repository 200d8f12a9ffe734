// SPDX-License-Identifier: MIT

//! Database layer (Supabase PostgREST).

pub mod postgrest;

pub use postgrest::{ListRecord, OrderDirection, PostgrestDb};

/// Table names as constants.
pub mod tables {
    pub const PROFILES: &str = "profiles";
    pub const PROJECTS: &str = "projects";
    pub const SOCIALS: &str = "socials";
}
