//! Caller identity extraction.
//!
//! The frontend forwards the connected wallet in `x-wallet-address` and, when
//! the user arrived through a Farcaster frame, their fid in
//! `x-farcaster-fid`. Wallet signatures are verified upstream of this
//! service.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use minipad_core::{Actor, Fid};

use crate::constants::{FARCASTER_FID_HEADER, WALLET_ADDRESS_HEADER};
use crate::error::{ApiError, ApiResult};

/// Read the caller from request headers.
///
/// # Errors
/// `NotConnected` without a wallet address, `InvalidFormat` for a
/// non-numeric fid.
pub fn actor_from_headers(headers: &HeaderMap) -> ApiResult<Actor> {
    let address = headers
        .get(WALLET_ADDRESS_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::not_connected)?;

    let mut actor = Actor::new(address);
    if let Some(raw) = headers.get(FARCASTER_FID_HEADER) {
        let fid: Fid = raw
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(|| ApiError::invalid_format(FARCASTER_FID_HEADER, "unsigned integer"))?;
        actor = actor.with_fid(fid);
    }
    Ok(actor)
}

/// Extractor for the connected user. Rejects with 401 when no wallet is
/// connected.
#[derive(Debug, Clone)]
pub struct ActorExtractor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for ActorExtractor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(ActorExtractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_wallet_and_fid() {
        let actor = actor_from_headers(&headers(&[
            (WALLET_ADDRESS_HEADER, "0xabc"),
            (FARCASTER_FID_HEADER, "42"),
        ]))
        .unwrap();
        assert_eq!(actor, Actor::new("0xabc").with_fid(42));
    }

    #[test]
    fn test_missing_or_blank_wallet_is_not_connected() {
        let err = actor_from_headers(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotConnected);

        let err = actor_from_headers(&headers(&[(WALLET_ADDRESS_HEADER, "   ")])).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotConnected);
    }

    #[test]
    fn test_bad_fid_rejected() {
        let err = actor_from_headers(&headers(&[
            (WALLET_ADDRESS_HEADER, "0xabc"),
            (FARCASTER_FID_HEADER, "alice"),
        ]))
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
    }
}
