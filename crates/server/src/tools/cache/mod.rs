//! Cache inspection and lifecycle tools.

pub mod get;
pub mod register;
pub mod status;

pub use get::{CacheGetParams, get_impl};
pub use register::{CacheRegisterParams, register_impl};
pub use status::{CacheStatusParams, status_impl};
