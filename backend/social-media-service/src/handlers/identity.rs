/// Caller identity
///
/// Authentication happens upstream; the gateway forwards the account id in `x-user-id`.
use crate::error::AppError;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Account the request acts on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingAccount(pub i64);

impl FromRequest for ActingAccount {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_account_id(req).map(ActingAccount))
    }
}

fn extract_account_id(req: &HttpRequest) -> Result<i64, AppError> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".into()))?;

    match value.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::Unauthorized(
            "Invalid x-user-id header value".into(),
        )),
    }
}
