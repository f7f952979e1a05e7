//! Use-cases sitting between the front-ends and the store/gateway pair.

pub mod catalog;
pub mod clear;
pub mod login;
pub mod offline;

pub use catalog::HeroCatalog;
pub use clear::ClearData;
pub use login::LoginService;
pub use offline::{prefetch_all, PrefetchFailure, PrefetchReport, DEFAULT_PREFETCH_CONCURRENCY};
