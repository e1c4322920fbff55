use std::future::{ready, Ready};

use actix_web::cookie::Cookie;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;

/// Name of the cookie carrying a player's identity.
pub const IDENTITY_COOKIE: &str = "id";

/// Player identity taken from the `id` cookie issued by the WebSocket endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identity on `req`, if it carries a non-empty cookie.
    pub fn from_cookie(req: &HttpRequest) -> Option<Self> {
        req.cookie(IDENTITY_COOKIE)
            .map(|c| c.value().trim().to_string())
            .filter(|id| !id.is_empty())
            .map(CallerId)
    }
}

impl FromRequest for CallerId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_cookie(req).ok_or(AppError::MissingIdentity))
    }
}

/// Cookie issued to a first-time connection.
pub fn identity_cookie(player_id: &str) -> Cookie<'static> {
    Cookie::build(IDENTITY_COOKIE, player_id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}
