use std::time::Instant;

use reqwest::Url;
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest_middleware::{ClientWithMiddleware, Middleware};

use crate::Result;

const GATEWAY_USER_AGENT: HeaderValue =
    HeaderValue::from_static(concat!("routegate/", env!("CARGO_PKG_VERSION")));

/// Client shared by the relay and the diagnostics probe.
///
/// Redirects are not followed: the Maps JavaScript endpoint answers an
/// accepted key with a 303 and the probe needs to see it.
pub fn upstream_client() -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    Ok(reqwest_middleware::ClientBuilder::new(client)
        .with(UserAgentInjector)
        .with(UpstreamLogger)
        .build())
}

/// Inject the gateway's user agent into all outgoing requests.
struct UserAgentInjector;

#[async_trait::async_trait]
impl Middleware for UserAgentInjector {
    async fn handle(
        &self,
        mut req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        req.headers_mut().insert(USER_AGENT, GATEWAY_USER_AGENT);
        next.run(req, extensions).await
    }
}

/// Log every upstream call with its outcome and latency.
struct UpstreamLogger;

#[async_trait::async_trait]
impl Middleware for UpstreamLogger {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut http::Extensions,
        next: reqwest_middleware::Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = redact_key(req.url());
        let started = Instant::now();

        let outcome = next.run(req, extensions).await.map_err(redact_error);
        let elapsed_ms = started.elapsed().as_millis();

        match &outcome {
            Ok(response) => tracing::info!(
                %method,
                %url,
                status = response.status().as_u16(),
                elapsed_ms,
                "Upstream call completed"
            ),
            Err(err) => tracing::error!(%method, %url, elapsed_ms, "Upstream call failed: {}", err),
        }

        outcome
    }
}

/// Copy of `url` with the `key` query parameter masked
pub(crate) fn redact_key(url: &Url) -> Url {
    if !url.query_pairs().any(|(name, _)| name == "key") {
        return url.clone();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                "REDACTED".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

/// `err` with the `key` query parameter masked in the URL it reports
pub(crate) fn redact_error(err: reqwest_middleware::Error) -> reqwest_middleware::Error {
    match err {
        reqwest_middleware::Error::Reqwest(err) => {
            reqwest_middleware::Error::Reqwest(redact_reqwest_error(err))
        }
        other => other,
    }
}

pub(crate) fn redact_reqwest_error(mut err: reqwest::Error) -> reqwest::Error {
    if let Some(url) = err.url_mut() {
        let redacted = redact_key(url);
        *url = redacted;
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_key_masks_only_the_key() {
        let url = Url::parse(
            "https://maps.googleapis.com/maps/api/geocode/json?address=New+York&key=secret",
        )
        .unwrap();
        let redacted = redact_key(&url);

        assert!(!redacted.as_str().contains("secret"));
        assert!(redacted.as_str().contains("key=REDACTED"));
        assert!(redacted.as_str().contains("address=New+York"));
    }

    #[test]
    fn test_redact_key_leaves_keyless_urls_untouched() {
        let url = Url::parse("https://routes.googleapis.com/directions/v2:computeRoutes").unwrap();
        assert_eq!(redact_key(&url), url);
    }

    #[test]
    fn test_upstream_client_builds() {
        assert!(upstream_client().is_ok());
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_key() {
        let client = upstream_client().unwrap();
        let err = client
            .get("http://127.0.0.1:1/maps/api/geocode/json?address=New+York&key=secret-key-123")
            .send()
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(!message.contains("secret-key-123"), "{message}");
        assert!(message.contains("key=REDACTED"), "{message}");
    }
}
