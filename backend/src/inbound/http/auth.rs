//! Bearer token extractor for authenticated handlers.
//!
//! Accepts `Authorization: Token <key>` and `Authorization: Bearer <key>`.
//! The resolved [`UserId`] is the only caller identity handlers ever see; it
//! never comes from the request body or query string.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{AuthToken, Error, UserId};

use super::state::HttpState;

const MISSING_CREDENTIALS: &str = "Authentication credentials were not provided.";
const INVALID_HEADER: &str = "Invalid token header.";

/// Caller identity resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    /// Identifier of the authenticated caller.
    pub fn id(&self) -> UserId {
        self.0
    }
}

/// Extract the token from an `Authorization` header value.
pub(crate) fn parse_authorization(value: &str) -> Result<AuthToken, Error> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next().ok_or_else(|| Error::unauthorized(MISSING_CREDENTIALS))?;
    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(Error::unauthorized(MISSING_CREDENTIALS));
    }
    let key = parts.next().ok_or_else(|| Error::unauthorized(INVALID_HEADER))?;
    if parts.next().is_some() {
        return Err(Error::unauthorized(INVALID_HEADER));
    }
    AuthToken::parse(key).map_err(|_| Error::unauthorized("Invalid token."))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map(str::to_owned));
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state
                .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let value = match header {
                None => return Err(Error::unauthorized(MISSING_CREDENTIALS)),
                Some(Err(_)) => return Err(Error::unauthorized(INVALID_HEADER)),
                Some(Ok(value)) => value,
            };
            let token = parse_authorization(&value)?;
            let user_id = state.tokens.authenticate_token(&token).await?;
            Ok(Self(user_id))
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    const KEY: &str = "0123456789abcdef0123456789abcdef01234567";

    #[rstest]
    #[case(format!("Token {KEY}"))]
    #[case(format!("Bearer {KEY}"))]
    #[case(format!("token   {KEY}"))]
    fn accepts_token_and_bearer_schemes(#[case] header: String) {
        let token = parse_authorization(&header).expect("valid header");

        assert_eq!(token.expose(), KEY);
    }

    #[rstest]
    #[case("", MISSING_CREDENTIALS)]
    #[case("Basic dXNlcjpwYXNz", MISSING_CREDENTIALS)]
    #[case("Token", INVALID_HEADER)]
    #[case("Token a b", INVALID_HEADER)]
    #[case("Token not-hex", "Invalid token.")]
    fn rejects_malformed_headers(#[case] header: &str, #[case] message: &str) {
        let error = parse_authorization(header).expect_err("rejected");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), message);
    }
}
