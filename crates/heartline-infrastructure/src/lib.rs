pub mod paths;
pub mod rest_store;
pub mod storage;
pub mod toml_profile_repository;

pub use crate::paths::HeartlinePaths;
pub use crate::rest_store::RestStore;
pub use crate::toml_profile_repository::TomlProfileStore;
