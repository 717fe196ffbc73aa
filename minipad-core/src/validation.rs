//! Input validation for user-supplied text.

use url::Url;

use crate::{ValidationError, WalletAddress};

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_DESCRIPTION_LEN: usize = 2000;
pub const MAX_URL_LEN: usize = 2048;

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn bounded(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    required("title", title)?;
    bounded("title", title, MAX_TITLE_LEN)
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    required("description", description)?;
    bounded("description", description, MAX_DESCRIPTION_LEN)
}

pub fn validate_address(address: &WalletAddress) -> Result<(), ValidationError> {
    required("address", address)
}

/// Accepts absolute http(s) URLs with a host.
pub fn validate_url(field: &str, url: &str) -> Result<(), ValidationError> {
    required(field, url)?;
    bounded(field, url, MAX_URL_LEN)?;
    let invalid = |reason: String| ValidationError::InvalidValue {
        field: field.to_string(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(format!("invalid URL: {}", e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("must be an http(s) URL".to_string()));
    }
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(invalid("URL has no host".to_string())),
    }
}
