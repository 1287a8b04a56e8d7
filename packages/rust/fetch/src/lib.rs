//! Document fetching for postdate.
//!
//! One GET per URL: no retries, no JavaScript. The body is classified as HTML
//! or PDF from the `Content-Type` header, the URL path and the leading bytes.

use std::time::Duration;

use postdate_shared::{Document, FetchConfig, PostdateError, Result};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

/// Parse `input` and accept only absolute `http`/`https` URLs with a host.
pub fn validate_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())
        .map_err(|e| PostdateError::validation(format!("invalid URL '{input}': {e}")))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(PostdateError::validation(format!(
                "unsupported URL scheme '{other}' (expected http or https)"
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(PostdateError::validation(format!("URL '{input}' has no host")));
    }

    Ok(url)
}

/// HTTP client configured from `[fetch]`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PostdateError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Fetch `url` and classify the body.
    #[instrument(skip_all, fields(%url))]
    pub async fn fetch(&self, url: &Url) -> Result<Document> {
        debug!("fetching document");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| PostdateError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostdateError::Network(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let final_url = response.url().to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PostdateError::Network(format!("{url}: body read failed: {e}")))?;

        let document = Document::classify(bytes.to_vec(), content_type.as_deref(), Some(&final_url));
        debug!(
            kind = %document.kind,
            bytes = document.bytes.len(),
            content_type = content_type.as_deref().unwrap_or("-"),
            "fetched document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postdate_shared::DocumentKind;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchConfig::default()).unwrap()
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_url("https://jobs.example.com/posting/42").is_ok());
        assert!(validate_url("  http://example.com  ").is_ok());
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        for input in ["ftp://example.com/file", "file:///etc/passwd", "not a url", "mailto:x@y.z"] {
            let err = validate_url(input).unwrap_err();
            assert!(matches!(err, PostdateError::Validation { .. }), "{input}: {err}");
        }
    }

    #[tokio::test]
    async fn fetches_html_with_configured_user_agent() {
        let server = MockServer::start().await;
        let user_agent = FetchConfig::default().user_agent;

        Mock::given(method("GET"))
            .and(path("/jobs/1"))
            .and(header("user-agent", user_agent.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<html><body><p>Posted 2 days ago</p></body></html>"),
            )
            .mount(&server)
            .await;

        let url = validate_url(&format!("{}/jobs/1", server.uri())).unwrap();
        let document = fetcher().fetch(&url).await.unwrap();

        assert_eq!(document.kind, DocumentKind::Html);
        assert!(document.text().contains("Posted 2 days ago"));
        assert_eq!(document.source_url.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn classifies_pdf_by_content_type() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/download"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.4\n<< /CreationDate (D:20250801000000Z) >>".to_vec()),
            )
            .mount(&server)
            .await;

        let url = validate_url(&format!("{}/download", server.uri())).unwrap();
        let document = fetcher().fetch(&url).await.unwrap();
        assert_eq!(document.kind, DocumentKind::Pdf);
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = validate_url(&format!("{}/gone", server.uri())).unwrap();
        let err = fetcher().fetch(&url).await.unwrap_err();
        assert!(matches!(err, PostdateError::Network(ref msg) if msg.contains("404")), "{err}");
    }
}
