// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod profile;
pub mod project;
pub mod social;

pub use profile::{NewProfile, Profile};
pub use project::Project;
pub use social::{Platform, Social};
