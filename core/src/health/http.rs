//! HTTP request health probing with optional Basic authentication

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use hyper::{header, Body, Client, Method, Request, Uri};
use schema::Credentials;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use super::{Expect, HealthError, Probe};

/// What an HTTP probe observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status code
    pub status: u16,
    /// Response body, lossily decoded
    pub body: String,
}

/// HTTP health probe that makes GET requests and validates responses
///
/// This probe makes HTTP GET requests to a specified URL, optionally
/// carrying an `Authorization: Basic` header, and validates the response
/// according to the configured status expectation.
///
/// # Example
///
/// ```rust
/// use authprobe_core::health::{HttpProbe, Expect, Probe};
/// use schema::Credentials;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let probe = HttpProbe::new(
///     "http://[::1]:8080/authenticate".to_string(),
///     Expect::Any2xx,
///     Duration::from_secs(5),
/// )
/// .with_credentials(Credentials::new("user", "password"));
///
/// match probe.check().await {
///     Ok(()) => println!("authenticated"),
///     Err(e) => println!("rejected: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// URL to request
    url: String,
    /// Expected response criteria
    expect: Expect,
    /// Basic credentials to send, if any
    credentials: Option<Credentials>,
    /// Request timeout, covering connect, headers and body
    timeout: Duration,
}

impl HttpProbe {
    /// Create a new HTTP probe
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to make a GET request to
    /// * `expect` - The expectation for validating the response
    /// * `timeout` - Maximum time to wait for the request to complete
    pub fn new(url: String, expect: Expect, timeout: Duration) -> Self {
        Self {
            url,
            expect,
            credentials: None,
            timeout,
        }
    }

    /// Send the given credentials with HTTP Basic authentication
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Get the target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the expected response criteria
    pub fn expect(&self) -> &Expect {
        &self.expect
    }

    /// Get the credentials sent with the request
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Value of the `Authorization` header, if credentials are set
    pub fn authorization_header(&self) -> Option<String> {
        self.credentials.as_ref().map(|c| {
            format!(
                "Basic {}",
                general_purpose::STANDARD.encode(c.user_pass().as_bytes())
            )
        })
    }

    /// Perform the request and return what was observed without judging it
    pub async fn fetch(&self) -> Result<HttpResponse, HealthError> {
        debug!("HTTP probe requesting {}", self.url);

        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| HealthError::InvalidRequest(format!("{}: {}", self.url, e)))?;

        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(value) = self.authorization_header() {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let req = builder
            .body(Body::empty())
            .map_err(|e| HealthError::InvalidRequest(e.to_string()))?;

        let client = Client::new();
        let exchange = async {
            let response = client.request(req).await?;
            let status = response.status().as_u16();
            let bytes = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>(HttpResponse {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        };

        match timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => {
                debug!(
                    "HTTP probe to {} returned status {}",
                    self.url, response.status
                );
                Ok(response)
            }
            Ok(Err(hyper_error)) => {
                debug!("HTTP probe to {} failed: {}", self.url, hyper_error);
                Err(HealthError::Http(hyper_error))
            }
            Err(_timeout_error) => {
                debug!(
                    "HTTP probe to {} timed out after {:?}",
                    self.url, self.timeout
                );
                Err(HealthError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn check(&self) -> Result<(), HealthError> {
        let response = self.fetch().await?;

        if !self.expect.matches_status(response.status) {
            return Err(HealthError::UnexpectedStatus(response.status));
        }

        debug!("HTTP probe to {} succeeded", self.url);
        Ok(())
    }
}
