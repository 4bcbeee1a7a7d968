// NOC server HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, `{ "error": ... }` body
// decoding and session-redirect detection. Endpoint groups live in
// `dashboard.rs` and `admin.rs` as inherent methods so this module stays
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Path the server redirects to when an admin request has no session.
pub(crate) const LOGIN_PATH: &str = "/auth/login";

const BODY_PREVIEW_LEN: usize = 200;

/// HTTP client for a single NOC server.
///
/// Cookie-enabled: after [`login`](Self::login) the session cookie lives in
/// the jar and is sent on every admin request and on the push upgrade.
/// Clones share the connection pool and the jar.
#[derive(Clone)]
pub struct NocClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Option<Arc<Jar>>,
}

impl NocClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// A cookie jar is added when the config doesn't carry one, since the
    /// admin API is session based.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client` (no cookie access).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The `Cookie` header value for the server, if a session exists.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join an absolute server path (e.g. `/api/status`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await?;
        parse_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        parse_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {}", url);
        let resp = self.http.put(url).json(body).send().await?;
        parse_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        parse_response(resp).await
    }
}

/// Map a response onto `T`, or onto the matching `Error` variant.
///
/// Admin routes answer an unauthenticated request with a redirect to the
/// login page; reqwest follows it, so a final URL on [`LOGIN_PATH`] means
/// the session is missing even though the status is 200.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    trace!(status = status.as_u16(), url = %resp.url(), "response");

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(Error::Authentication {
            message: "session expired or invalid credentials".into(),
        });
    }

    if resp.url().path() == LOGIN_PATH {
        return Err(Error::Authentication {
            message: "login required".into(),
        });
    }

    let body = resp.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|e| e.error)
            .unwrap_or_else(|_| preview(&body).to_owned());
        return Err(Error::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW_LEN) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
