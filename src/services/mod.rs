// SPDX-License-Identifier: MIT

//! Collaborator service clients (identity, object storage).

pub mod identity;
pub mod storage;

pub use identity::{AuthUserInfo, IdentityClient, SessionTokens};
pub use storage::{ObjectRef, StorageClient};
