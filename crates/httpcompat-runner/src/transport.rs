//! Transport adapter: one request/response exchange per call
//!
//! Every call opens its own connection, never follows redirects and is
//! bounded by the configured timeout. The request path goes on the wire as
//! given: plain http targets get a fresh hyper HTTP/1.1 connection with an
//! origin-form request target, https targets go through reqwest, which is
//! refused any path its URL parser would rewrite. Failures are returned to
//! the caller, which records them against the case in progress.

use std::time::Duration;

use bytes::Bytes;
use http::header::{HOST, HeaderMap, HeaderName, HeaderValue};
use http::{Method, Request, Response, Uri};
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper_util::rt::TokioIo;
use indexmap::IndexMap;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;

use httpcompat_core::case::normalize_path;
use httpcompat_core::repr::quote;
use httpcompat_core::{ObservedResponse, TargetLabel};

/// Performs one HTTP exchange.
pub trait Transport {
    /// Send `method path` with `headers` to `target` and capture the response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request cannot be built or sent, or
    /// the response cannot be read.
    fn send(
        &self,
        target: &Target,
        method: &str,
        path: &str,
        headers: &IndexMap<String, String>,
    ) -> Result<ObservedResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        target: &Target,
        method: &str,
        path: &str,
        headers: &IndexMap<String, String>,
    ) -> Result<ObservedResponse, TransportError> {
        (**self).send(target, method, path, headers)
    }
}

/// A candidate server: label plus validated http(s) base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    label: TargetLabel,
    base: String,
    url: Url,
}

impl Target {
    /// Parse a base URL given on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] if `base` is not a URL or its scheme is not http/https.
    pub fn parse(label: TargetLabel, base: &str) -> Result<Self, TargetError> {
        let url = Url::parse(base).map_err(|e| TargetError::InvalidUrl {
            label,
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TargetError::UnsupportedScheme {
                label,
                url: base.to_string(),
            });
        }
        Ok(Self {
            label,
            base: base.to_string(),
            url,
        })
    }

    #[must_use]
    pub fn label(&self) -> TargetLabel {
        self.label
    }

    /// Base URL exactly as given
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.url.scheme() == "https"
    }

    /// Host header value: `host[:port]`, port omitted when it is the scheme default.
    #[must_use]
    pub fn authority(&self) -> String {
        let host = self.url.host_str().unwrap_or_default();
        match self.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        }
    }

    fn socket_addr(&self) -> (String, u16) {
        let host = self.url.host_str().unwrap_or_default();
        let host = host.trim_start_matches('[').trim_end_matches(']');
        (host.to_string(), self.url.port_or_known_default().unwrap_or(80))
    }

    /// Origin-form request target for `path`, byte for byte as given (only a
    /// leading `/` is added). Dot segments and backslashes are kept.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidPath`] if `path` is not a valid
    /// request target, or [`TransportError::PathRewritten`] if part of it
    /// would not reach the server (a `#` fragment).
    pub fn request_target(&self, path: &str) -> Result<Uri, TransportError> {
        let path = normalize_path(path);
        let uri: Uri = path.parse().map_err(|e: http::uri::InvalidUri| {
            TransportError::InvalidPath {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        let sent = uri.path_and_query().map_or("/", |pq| pq.as_str());
        if sent != path {
            return Err(TransportError::PathRewritten {
                sent: sent.to_string(),
                path,
            });
        }
        Ok(uri)
    }

    /// Absolute URL for `path` on this target. Only scheme, host and port of
    /// the base URL are kept.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidPath`] if the result is not a valid
    /// URL, or [`TransportError::PathRewritten`] if URL parsing changed the
    /// path or query (dot segments, backslashes, fragments, escaping).
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let path = normalize_path(path);
        let origin = self.url.origin().ascii_serialization();
        let url = Url::parse(&format!("{origin}{path}")).map_err(|e| {
            TransportError::InvalidPath {
                path: path.clone(),
                reason: e.to_string(),
            }
        })?;
        let sent = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        if sent != path {
            return Err(TransportError::PathRewritten { path, sent });
        }
        Ok(url)
    }
}

/// Blocking transport: hyper over a private single-threaded runtime for
/// http, reqwest for https.
pub struct HttpTransport {
    runtime: Runtime,
    tls: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Build the clients with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the runtime or HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Client(describe(&e)))?;
        let tls = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| TransportError::Client(describe(&e)))?;
        Ok(Self {
            runtime,
            tls,
            timeout,
        })
    }

    fn send_plain(
        &self,
        target: &Target,
        method: Method,
        path: &str,
        headers: HeaderMap,
    ) -> Result<ObservedResponse, TransportError> {
        let uri = target.request_target(path)?;
        let exchange = exchange(target, method, uri, headers);
        self.runtime
            .block_on(async { tokio::time::timeout(self.timeout, exchange).await })
            .map_err(|_| TransportError::Timeout(format!("no response within {:?}", self.timeout)))?
    }

    fn send_tls(
        &self,
        target: &Target,
        method: Method,
        path: &str,
        headers: HeaderMap,
    ) -> Result<ObservedResponse, TransportError> {
        let url = target.url_for(path)?;
        let resp = self
            .tls
            .request(method, url)
            .headers(headers)
            .send()
            .map_err(|e| classify_error(&e))?;

        let mut observed = ObservedResponse::new(resp.status().as_u16());
        collect_headers(resp.headers(), &mut observed);
        observed.body = resp.bytes().map_err(|e| classify_error(&e))?.to_vec();
        Ok(observed)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        target: &Target,
        method: &str,
        path: &str,
        headers: &IndexMap<String, String>,
    ) -> Result<ObservedResponse, TransportError> {
        let method_value = Method::from_bytes(method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method.to_string()))?;
        let header_map = header_map(headers)?;

        tracing::debug!(server = %target.label(), base = target.base(), method, path, "sending request");
        let observed = if target.is_tls() {
            self.send_tls(target, method_value, path, header_map)?
        } else {
            self.send_plain(target, method_value, path, header_map)?
        };

        tracing::debug!(
            server = %target.label(),
            status = observed.status,
            bytes = observed.body.len(),
            "response received"
        );
        Ok(observed)
    }
}

fn header_map(headers: &IndexMap<String, String>) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(k.clone()))?;
        let value = HeaderValue::from_str(v).map_err(|_| TransportError::InvalidHeader(k.clone()))?;
        map.append(name, value);
    }
    Ok(map)
}

/// One request on a fresh connection; the connection is dropped on return.
async fn exchange(
    target: &Target,
    method: Method,
    uri: Uri,
    mut headers: HeaderMap,
) -> Result<ObservedResponse, TransportError> {
    if !headers.contains_key(HOST) {
        let host = HeaderValue::from_str(&target.authority())
            .map_err(|_| TransportError::InvalidHeader("host".to_string()))?;
        headers.insert(HOST, host);
    }
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Empty::<Bytes>::new())
        .map_err(|e| TransportError::Request(describe(&e)))?;
    *request.headers_mut() = headers;

    let (host, port) = target.socket_addr();
    let stream = TcpStream::connect((host.as_str(), port))
        .await
        .map_err(|e| TransportError::Connect(describe(&e)))?;
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| TransportError::Request(describe(&e)))?;

    let fetch = async {
        let response = sender
            .send_request(request)
            .await
            .map_err(|e| TransportError::Request(describe(&e)))?;
        read_response(response).await
    };
    tokio::pin!(fetch);
    tokio::pin!(conn);

    tokio::select! {
        biased;
        observed = &mut fetch => observed,
        // server closed the connection; the response may still be buffered
        _ = &mut conn => fetch.await,
    }
}

async fn read_response(response: Response<Incoming>) -> Result<ObservedResponse, TransportError> {
    let mut observed = ObservedResponse::new(response.status().as_u16());
    collect_headers(response.headers(), &mut observed);
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TransportError::Request(describe(&e)))?;
    observed.body = body.to_bytes().to_vec();
    Ok(observed)
}

/// Lower-cased names, last value wins, values decoded lossily.
fn collect_headers(headers: &HeaderMap, observed: &mut ObservedResponse) {
    for (name, value) in headers {
        observed.headers.insert(
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
}

fn classify_error(err: &reqwest::Error) -> TransportError {
    let msg = describe(err);
    if err.is_timeout() {
        TransportError::Timeout(msg)
    } else if err.is_connect() {
        TransportError::Connect(msg)
    } else {
        TransportError::Request(msg)
    }
}

/// Error message including its source chain.
fn describe(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(s) = source {
        msg.push_str(": ");
        msg.push_str(&s.to_string());
        source = s.source();
    }
    msg
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid HTTP method {}", quote(.0))]
    InvalidMethod(String),
    #[error("invalid request header {}", quote(.0))]
    InvalidHeader(String),
    #[error("invalid request path {}: {reason}", quote(.path))]
    InvalidPath { path: String, reason: String },
    #[error("request path {} would be sent as {}", quote(.path), quote(.sent))]
    PathRewritten { path: String, sent: String },
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Request(String),
    #[error("cannot build HTTP client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("Invalid --{label} URL {}: {reason}", quote(.url))]
    InvalidUrl {
        label: TargetLabel,
        url: String,
        reason: String,
    },
    #[error("Unsupported scheme in --{label} URL {}: expected http or https", quote(.url))]
    UnsupportedScheme { label: TargetLabel, url: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_https_accepted() {
        assert!(Target::parse(TargetLabel::Node, "http://127.0.0.1:3000").is_ok());
        assert!(Target::parse(TargetLabel::Snode, "https://example.test").is_ok());
    }

    #[test]
    fn other_schemes_rejected() {
        let err = Target::parse(TargetLabel::Snode, "ftp://127.0.0.1:21").unwrap_err();
        assert_eq!(
            err,
            TargetError::UnsupportedScheme {
                label: TargetLabel::Snode,
                url: "ftp://127.0.0.1:21".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "Unsupported scheme in --snode URL 'ftp://127.0.0.1:21': expected http or https"
        );
    }

    #[test]
    fn garbage_is_invalid_url() {
        assert!(matches!(
            Target::parse(TargetLabel::Node, "127.0.0.1:3000/x"),
            Err(TargetError::InvalidUrl { .. }) | Err(TargetError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            Target::parse(TargetLabel::Node, "not a url"),
            Err(TargetError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn url_for_replaces_base_path() {
        let t = Target::parse(TargetLabel::Node, "http://127.0.0.1:3000/ignored").unwrap();
        assert_eq!(
            t.url_for("/query/echo?a=1").unwrap().as_str(),
            "http://127.0.0.1:3000/query/echo?a=1"
        );
    }

    #[test]
    fn url_for_prefixes_slash() {
        let t = Target::parse(TargetLabel::Node, "http://localhost:8080").unwrap();
        assert_eq!(t.url_for("health").unwrap().as_str(), "http://localhost:8080/health");
    }

    #[test]
    fn url_for_keeps_double_slash_as_path() {
        let t = Target::parse(TargetLabel::Node, "http://localhost:8080").unwrap();
        let url = t.url_for("//evil/x").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.path(), "//evil/x");
    }

    #[test]
    fn request_target_keeps_path_verbatim() {
        let t = Target::parse(TargetLabel::Node, "http://127.0.0.1:3000/ignored").unwrap();
        for path in ["/static/../secret", "/a/./b", "//evil/x", "/query/echo?a=1&b=%20"] {
            assert_eq!(t.request_target(path).unwrap().to_string(), path);
        }
        assert_eq!(t.request_target("ping").unwrap().to_string(), "/ping");
    }

    #[test]
    fn request_target_refuses_fragment() {
        let t = Target::parse(TargetLabel::Node, "http://127.0.0.1:3000").unwrap();
        assert_eq!(
            t.request_target("/x#frag").unwrap_err(),
            TransportError::PathRewritten {
                path: "/x#frag".into(),
                sent: "/x".into()
            }
        );
    }

    #[test]
    fn request_target_refuses_invalid_characters() {
        let t = Target::parse(TargetLabel::Node, "http://127.0.0.1:3000").unwrap();
        assert!(matches!(
            t.request_target("/a b"),
            Err(TransportError::InvalidPath { .. })
        ));
    }

    #[test]
    fn url_for_refuses_normalized_paths() {
        let t = Target::parse(TargetLabel::Node, "https://example.test").unwrap();
        let err = t.url_for("/static/../secret").unwrap_err();
        assert_eq!(
            err,
            TransportError::PathRewritten {
                path: "/static/../secret".into(),
                sent: "/secret".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "request path '/static/../secret' would be sent as '/secret'"
        );
        assert!(t.url_for("/x#frag").is_err());
    }

    #[test]
    fn authority_omits_default_port() {
        let t = Target::parse(TargetLabel::Node, "http://127.0.0.1:3000").unwrap();
        assert_eq!(t.authority(), "127.0.0.1:3000");
        let t = Target::parse(TargetLabel::Node, "https://example.test:443/x").unwrap();
        assert_eq!(t.authority(), "example.test");
        assert!(t.is_tls());
    }

    #[test]
    fn base_is_kept_verbatim() {
        let t = Target::parse(TargetLabel::Snode, "http://127.0.0.1:8080/").unwrap();
        assert_eq!(t.base(), "http://127.0.0.1:8080/");
        assert_eq!(t.label(), TargetLabel::Snode);
    }

    #[test]
    fn describe_includes_sources() {
        let io = std::io::Error::other("refused");
        assert_eq!(describe(&io), "refused");
    }
}
