use std::time::Duration;

use bytes::Bytes;

use crate::core::params::encode_params;
use crate::data::{HttpOptions, TlsTrust};

/// How a request body is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFraming {
    /// `Content-Length` with this exact byte count.
    Fixed(u64),
    /// Chunked transfer encoding; no length is declared.
    Chunked,
}

/// A fully configured request that has not been sent yet.
///
/// Produced by [`configure`] (or [`PreparedRequest::new`]) from
/// [`HttpOptions`]. Sending it is the job of an
/// [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Upper-cased method token.
    pub method:           String,
    pub url:              String,
    /// Headers in the order they will be sent, names verbatim.
    pub headers:          Vec<(String, String)>,
    pub connect_timeout:  Option<Duration>,
    pub read_timeout:     Option<Duration>,
    pub follow_redirects: bool,
    /// Only present for `https` URLs.
    pub tls:              Option<TlsTrust>,
    /// Encoded parameters sent as the body of a non-`GET` request.
    pub body:             Option<Bytes>,
    /// Set by the uploader; `None` lets the client decide.
    pub framing:          Option<BodyFraming>,
}

impl PreparedRequest {
    /// Apply everything in `options` except `params`.
    pub fn new(url: &str, options: &HttpOptions) -> Self {
        let mut request = Self {
            method:           options.method.trim().to_ascii_uppercase(),
            url:              url.to_string(),
            headers:          options.headers.clone(),
            connect_timeout:  options.connect_timeout,
            read_timeout:     options.read_timeout,
            follow_redirects: !options.disable_redirects,
            tls:              None,
            body:             None,
            framing:          None,
        };
        if request.is_secure() {
            request.tls = options.tls.clone();
        }
        request.set_header_if_absent("Accept-Encoding", "gzip");
        request
    }

    pub fn is_secure(&self) -> bool {
        self.url
            .get(..8)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https://"))
    }

    pub fn is_get(&self) -> bool { self.method == "GET" }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool { self.header(name).is_some() }

    /// Add a header unless the caller already set one with the same name.
    pub fn set_header_if_absent(&mut self, name: &str, value: &str) {
        if !self.has_header(name) {
            self.headers.push((name.to_string(), value.to_string()));
        }
    }

    /// The same request aimed at another URL.
    ///
    /// Headers, timeouts, redirect policy and TLS trust all carry over. TLS
    /// trust is dropped if the new URL is not `https`.
    #[must_use]
    pub fn reissue(mut self, url: String) -> Self {
        self.url = url;
        if !self.is_secure() {
            self.tls = None;
        }
        self
    }

    /// Append an already encoded query string to the URL.
    #[must_use]
    pub fn with_query(self, query: &str) -> Self {
        if query.is_empty() {
            return self;
        }
        let (base, fragment) = match self.url.split_once('#') {
            Some((base, fragment)) => (base, Some(fragment)),
            None => (self.url.as_str(), None),
        };
        let separator = if base.contains('?') { '&' } else { '?' };
        let mut url = format!("{base}{separator}{query}");
        if let Some(fragment) = fragment {
            url.push('#');
            url.push_str(fragment);
        }
        self.reissue(url)
    }

    #[must_use]
    pub fn with_framing(mut self, framing: BodyFraming) -> Self {
        self.framing = Some(framing);
        self
    }
}

/// Build the request described by `options`.
///
/// Non-empty `params` go into the query string of a `GET` request (which is
/// re-issued against the extended URL with every other setting preserved)
/// and become the body of any other method.
///
/// # Examples
///
/// ```
/// use ferry_transfer::{HttpOptions, configure};
///
/// let options = HttpOptions::default().param("page", "2");
/// let request = configure("https://example.com/list?sort=asc", &options);
/// assert_eq!(request.url, "https://example.com/list?sort=asc&page=2");
/// assert_eq!(request.header("accept-encoding"), Some("gzip"));
/// ```
pub fn configure(url: &str, options: &HttpOptions) -> PreparedRequest {
    let request = PreparedRequest::new(url, options);
    if options.params.is_empty() {
        return request;
    }

    let encoded = encode_params(&options.params, options.should_encode_url_params);
    if request.is_get() {
        request.with_query(&encoded)
    } else {
        PreparedRequest {
            body: Some(Bytes::from(encoded)),
            ..request
        }
    }
}
