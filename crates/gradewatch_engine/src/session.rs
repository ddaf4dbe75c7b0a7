use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER, USER_AGENT};
use thiserror::Error;

use crate::extract;

/// The portal this tool was written against.
pub const DEFAULT_PORTAL_URL: &str = "https://ovsys.math.ntnu.no";

const PORTAL_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.110 Safari/537.36";

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PORTAL_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("csrf token marker not found in portal root page")]
    TokenNotFound,
    #[error("session has not been initialized")]
    NotInitialized,
    #[error("login rejected by portal (http status {status})")]
    Rejected { status: u16 },
    #[error("network error talking to portal: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("session is not logged in")]
    NotLoggedIn,
    #[error("portal returned http status {status} for {path}")]
    HttpStatus { status: u16, path: String },
    #[error("network error fetching {path}: {source}")]
    Transport {
        path: String,
        source: reqwest::Error,
    },
}

/// Authenticated portal session: cookie jar, the CSRF token scraped from
/// the root page, and a cached copy of the frontpage used for course
/// discovery.
///
/// Call order is `new` -> `initialize` -> `login`, after which `get` may be
/// used freely (and concurrently; it takes `&self` and never refreshes the
/// token mid-cycle).
pub struct PortalSession {
    client: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
    frontpage: Option<String>,
    logged_in: bool,
}

impl PortalSession {
    pub fn new(settings: SessionSettings) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .default_headers(browser_headers(&settings.base_url))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url,
            csrf_token: None,
            frontpage: None,
            logged_in: false,
        })
    }

    /// Fetches the portal root and scrapes the CSRF token out of it. The
    /// marker being absent is loud by design: it means the portal changed
    /// (or answered with an error page) and nothing further can work.
    pub async fn initialize(&mut self) -> Result<(), AuthError> {
        let body = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .text()
            .await?;
        let token = extract::find_csrf_token(&body).ok_or(AuthError::TokenNotFound)?;
        self.csrf_token = Some(token);
        Ok(())
    }

    /// Submits the login form with the stored CSRF token. A non-success
    /// response is `Rejected` whether the cause was bad credentials or a
    /// server hiccup; both are fatal to the run rather than retried.
    ///
    /// The response body is the portal frontpage and is cached for course
    /// discovery.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let token = self
            .csrf_token
            .as_deref()
            .ok_or(AuthError::NotInitialized)?;
        let form = [
            ("csrfmiddlewaretoken", token),
            ("username", username),
            ("password", password),
            ("next", "/"),
        ];

        let response = self
            .client
            .post(format!("{}/login/", self.base_url))
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        self.frontpage = Some(response.text().await?);
        self.logged_in = true;
        Ok(())
    }

    /// Authenticated GET of `base_url` + `path_suffix`, returning the body.
    pub async fn get(&self, path_suffix: &str) -> Result<String, NetworkError> {
        if !self.logged_in {
            return Err(NetworkError::NotLoggedIn);
        }

        let transport = |source| NetworkError::Transport {
            path: path_suffix.to_string(),
            source,
        };
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path_suffix))
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                path: path_suffix.to_string(),
            });
        }
        response.text().await.map_err(transport)
    }

    /// The frontpage cached at login time, refetched only if missing.
    pub async fn frontpage(&mut self) -> Result<String, NetworkError> {
        if let Some(page) = &self.frontpage {
            return Ok(page.clone());
        }
        let page = self.get("").await?;
        self.frontpage = Some(page.clone());
        Ok(page)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.as_deref()
    }
}

fn browser_headers(base_url: &str) -> HeaderMap {
    // The portal refuses clients without a browser-looking identity.
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(PORTAL_USER_AGENT));
    if let Ok(referer) = HeaderValue::from_str(base_url) {
        headers.insert(REFERER, referer);
    }
    headers
}
