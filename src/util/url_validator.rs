use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating a configured URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// Base URLs are joined with endpoint paths, so query and fragment make no sense.
    #[error("Base URL must not contain a query string or fragment")]
    UnexpectedQuery,
}

/// Validates the DevHub API base URL.
///
/// Accepts `http` and `https` URLs with a host and no query or fragment.
/// A trailing slash is normalized away so endpoint paths can be appended
/// with a single `/`.
///
/// Plain `http` is accepted because the backend is commonly run locally, but
/// a warning is logged when the host is not loopback or private, since the
/// bearer token would then travel in the clear.
///
/// ```
/// use devhub::util::validate_base_url;
///
/// let url = validate_base_url("http://127.0.0.1:5000/").unwrap();
/// assert_eq!(url.as_str(), "http://127.0.0.1:5000/");
/// assert!(validate_base_url("file:///etc/passwd").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    let Some(host) = url.host_str() else {
        return Err(UrlValidationError::MissingHost);
    };

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::UnexpectedQuery);
    }

    if url.scheme() == "http" && !is_local_host(host) {
        tracing::warn!(
            host = %host,
            "API base URL uses plain HTTP; credentials will not be encrypted"
        );
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}

/// Validates a URL before handing it to the system browser.
///
/// Only `http` and `https` are allowed so a crafted value cannot launch a
/// local handler (`file:`, `javascript:` and friends).
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

fn is_local_host(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    match host_for_parse.parse::<IpAddr>() {
        Ok(IpAddr::V4(ipv4)) => ipv4.is_loopback() || ipv4.is_private() || ipv4.is_link_local(),
        Ok(IpAddr::V6(ipv6)) => {
            let segments = ipv6.segments();
            // Unique Local (fc00::/7)
            ipv6.is_loopback() || (segments[0] & 0xfe00) == 0xfc00
        }
        Err(_) => false,
    }
}
