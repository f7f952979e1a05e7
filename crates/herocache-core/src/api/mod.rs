//! REST client for the heroes API.
//!
//! - `Endpoint`: the closed set of remote operations
//! - `RequestBuilder`: turns an endpoint, parameters and the session token
//!   into an immutable `ApiRequest`
//! - `HeroApi` / `ApiClient`: executes requests and classifies outcomes
//!
//! Every endpoint except login requires a bearer token.

pub mod client;
pub mod endpoint;
pub mod request;
pub mod wire;

pub use client::{ApiClient, HeroApi};
pub use endpoint::{Endpoint, LoginTransport};
pub use request::{ApiRequest, RequestBuilder};
pub use wire::{ApiHero, ApiLocation, ApiTransformation};
