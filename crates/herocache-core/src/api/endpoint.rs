use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Remote operations exposed by the heroes API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Heroes,
    Locations,
    Transformations,
    Login,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Heroes => "/api/heros/all",
            Endpoint::Locations => "/api/heros/locations",
            // The server spells it this way
            Endpoint::Transformations => "/api/heros/tranformations",
            Endpoint::Login => "/api/auth/login",
        }
    }

    pub fn method(&self) -> Method {
        match self {
            Endpoint::Heroes | Endpoint::Locations | Endpoint::Transformations | Endpoint::Login => {
                Method::POST
            }
        }
    }

    /// Whether the endpoint needs a bearer token
    pub fn requires_token(&self) -> bool {
        !matches!(self, Endpoint::Login)
    }
}

/// How login credentials are sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginTransport {
    /// `Authorization: Basic base64(user:password)`
    #[default]
    Basic,
    /// `{"username": .., "password": ..}` in the JSON body
    Body,
}
