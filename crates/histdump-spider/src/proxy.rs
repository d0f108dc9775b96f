use crate::error::ProxyError;
use crate::http::*;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// The parts of an HTTP response the spider cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub text: String,
}

impl Response {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            text: text.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }
}

/// Anything that can issue a GET request on behalf of many workers at once.
///
/// - `Ok(Some(response))`: the upstream answered, with any status.
/// - `Ok(None)`: nothing came back (dead proxy, timeout, dropped body); worth retrying.
/// - `Err(_)`: the client itself is broken for this request; retrying won't help.
pub trait RequestClient: Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Option<Response>, ProxyError>> + Send;
}

/// Settings for [`ProxyClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Proxy URLs, e.g. `http://10.0.0.1:8080`; empty means a direct connection.
    pub proxies: Vec<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxies: vec![],
            timeout: Duration::from_secs(5),
            user_agent: None,
        }
    }
}

#[derive(Debug)]
struct Route {
    proxy: Option<String>,
    client: HttpClient,
}

/// A [`RequestClient`] that round-robins requests over a pool of proxies.
///
/// One [`reqwest::Client`] is built per proxy; the rotation cursor is a
/// single atomic, so the pool can be shared between workers without locking.
#[derive(Debug)]
pub struct ProxyClient {
    routes: Vec<Route>,
    cursor: AtomicUsize,
    timeout: Duration,
}

impl ProxyClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ProxyError> {
        let mut routes = Vec::with_capacity(config.proxies.len().max(1));

        for url in &config.proxies {
            let proxy = reqwest::Proxy::all(url).map_err(|source| ProxyError::InvalidProxy {
                url: url.clone(),
                source,
            })?;
            let client = builder(config)
                .proxy(proxy)
                .build()
                .map_err(ProxyError::Build)?;
            routes.push(Route {
                proxy: Some(url.clone()),
                client,
            });
        }

        if routes.is_empty() {
            debug!("no proxies configured; requests will go direct");
            routes.push(Route {
                proxy: None,
                client: builder(config).build().map_err(ProxyError::Build)?,
            });
        }

        debug!("proxy pool built with {} route(s)", routes.len());
        Ok(Self {
            routes,
            cursor: AtomicUsize::new(0),
            timeout: config.timeout,
        })
    }

    /// Number of distinct routes (proxies, or the single direct route).
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn next_route(&self) -> &Route {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.routes.len();
        &self.routes[i]
    }
}

fn builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    let builder = reqwest::ClientBuilder::new();
    match &config.user_agent {
        Some(user_agent) => builder.user_agent(user_agent),
        None => builder,
    }
}

impl RequestClient for ProxyClient {
    async fn get(&self, url: &str) -> Result<Option<Response>, ProxyError> {
        let route = self.next_route();
        let via = route.proxy.as_deref().unwrap_or("direct");
        trace!("GET {url} via {via}");

        let response = match route.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(err) if err.is_builder() => return Err(ProxyError::Request(err)),
            Err(err) => {
                warn!("no response from {url} via {via}, error({err})");
                return Ok(None);
            }
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(text) => Ok(Some(Response { status, text })),
            Err(err) => {
                warn!("failed to read body from {url} via {via}, error({err})");
                Ok(None)
            }
        }
    }
}

/// Parse a proxy list: one URL per line, or comma separated; blank lines
/// and `#` comments are skipped.
pub fn parse_proxy_list(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}
