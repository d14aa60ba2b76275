//! Requester extraction from trusted identity headers.
//!
//! Credentials are verified by whatever sits in front of this service; the
//! headers are taken at face value.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::{ProviderId, UserId};
use domain::{Requester, Role};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";
pub const PROVIDER_ID_HEADER: &str = "x-provider-id";

/// The requester behind an HTTP request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Requester);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        requester_from_headers(&parts.headers).map(Caller)
    }
}

fn requester_from_headers(headers: &HeaderMap) -> Result<Requester, ApiError> {
    let user_id = parse_header::<i64>(headers, USER_ID_HEADER)?
        .map(UserId::new)
        .ok_or_else(|| missing(USER_ID_HEADER))?;
    let role: Role = parse_header(headers, USER_ROLE_HEADER)?
        .ok_or_else(|| missing(USER_ROLE_HEADER))?;

    Ok(match role {
        Role::Client => Requester::client(user_id),
        Role::Provider => Requester::provider(
            user_id,
            parse_header::<i64>(headers, PROVIDER_ID_HEADER)?.map(ProviderId::new),
        ),
    })
}

fn parse_header<T: std::str::FromStr>(
    headers: &HeaderMap,
    name: &'static str,
) -> Result<Option<T>, ApiError> {
    let Some(value) = headers.get(name) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .map(Some)
        .ok_or_else(|| ApiError::Unauthorized(format!("Malformed {name} header")))
}

fn missing(name: &str) -> ApiError {
    ApiError::Unauthorized(format!("Missing {name} header"))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn client_headers() {
        let requester =
            requester_from_headers(&headers(&[("x-user-id", "4"), ("x-user-role", "client")]))
                .unwrap();
        assert_eq!(requester, Requester::client(UserId::new(4)));
    }

    #[test]
    fn provider_headers_with_and_without_profile() {
        let requester = requester_from_headers(&headers(&[
            ("x-user-id", "9"),
            ("x-user-role", "provider"),
            ("x-provider-id", "3"),
        ]))
        .unwrap();
        assert_eq!(
            requester,
            Requester::provider(UserId::new(9), Some(ProviderId::new(3)))
        );

        let requester =
            requester_from_headers(&headers(&[("x-user-id", "9"), ("x-user-role", "provider")]))
                .unwrap();
        assert_eq!(requester.provider_id, None);
    }

    #[test]
    fn missing_or_malformed_headers_are_unauthorized() {
        let cases: [&[(&'static str, &'static str)]; 4] = [
            &[],
            &[("x-user-role", "client")],
            &[("x-user-id", "abc"), ("x-user-role", "client")],
            &[("x-user-id", "1"), ("x-user-role", "admin")],
        ];
        for case in cases {
            assert!(matches!(
                requester_from_headers(&headers(case)),
                Err(ApiError::Unauthorized(_))
            ));
        }
    }

    #[test]
    fn malformed_provider_id_is_unauthorized() {
        let result = requester_from_headers(&headers(&[
            ("x-user-id", "9"),
            ("x-user-role", "provider"),
            ("x-provider-id", "three"),
        ]));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
