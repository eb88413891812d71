//! Identity domain module.
//!
//! Email-based identity for the product. There are no passwords: an email
//! address is the whole account, stored locally as the source of truth and
//! mirrored to the remote user directory on a best-effort basis.
//!
//! # Module Structure
//!
//! - `model`: Identity domain model
//! - `repository`: storage traits (`ProfileStore`, `UserDirectory`)
//! - `store`: `IdentityStore` orchestration

mod model;
mod repository;
mod store;

// Re-export public API
pub use model::Identity;
pub use repository::{ProfileStore, UserDirectory};
pub use store::IdentityStore;
