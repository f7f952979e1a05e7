//! herocache core library.
//!
//! Offline-first hero catalogue: a local SQLite cache reconciled against a
//! remote REST API, shared by every front-end (CLI today).
//!
//! Layers, bottom up:
//! - `auth`: session token storage
//! - `api`: request construction and the remote gateway
//! - `store`: the persistent cache
//! - `usecase`: cache-or-fetch reconciliation, login, clear, prefetch
//! - `screen`: status channels for a UI

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod screen;
pub mod store;
pub mod usecase;
pub mod utils;

pub use api::{ApiClient, HeroApi, RequestBuilder};
pub use auth::TokenStore;
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Coordinate, Hero, Location, Transformation};
pub use store::HeroStore;
pub use usecase::{ClearData, HeroCatalog, LoginService, PrefetchReport};
