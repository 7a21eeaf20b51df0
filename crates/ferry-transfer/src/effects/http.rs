use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::Stream;

use crate::core::PreparedRequest;
use crate::data::Headers;
use crate::error::TransportError;

/// A boxed stream type for HTTP bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// What to send after the request head.
pub enum RequestBody {
    Empty,
    /// A body that is fully known up front (encoded parameters).
    Bytes(Bytes),
    /// A body produced while the request is in flight. The framing recorded
    /// in [`PreparedRequest::framing`] says how it is delimited.
    Stream(BoxStream<'static, io::Result<Bytes>>),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            RequestBody::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Status, headers and a streaming body of a received response.
pub struct HttpResponse {
    pub status:  u16,
    pub headers: Headers,
    pub body:    BoxStream<'static, Result<Bytes, TransportError>>,
}

impl std::fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Asynchronous HTTP client abstraction.
///
/// The returned future resolves once the response head has arrived. For a
/// streaming request body that means the client has consumed the body (or
/// the server answered early). Implementations must not decode
/// content-encodings; the engine does that itself.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - In-memory implementations for testing
pub trait HttpClient: Send + Sync {
    fn send(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
    fn send(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).send(request, body)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;
    use reqwest::header::CONTENT_LENGTH;
    use reqwest::redirect::Policy;

    use super::*;
    use crate::core::BodyFraming;
    use crate::error::TransportErrorKind;

    /// Production HTTP client implementation using reqwest.
    ///
    /// Timeouts, redirect policy and trust roots are per request, so a client
    /// is built for every call.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ReqwestClient;

    impl ReqwestClient {
        pub fn new() -> Self { Self }

        fn build(request: &PreparedRequest) -> Result<reqwest::Client, TransportError> {
            let policy = if request.follow_redirects {
                Policy::default()
            } else {
                Policy::none()
            };
            let mut builder = reqwest::Client::builder().redirect(policy);

            if let Some(timeout) = request.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            if let Some(timeout) = request.read_timeout {
                builder = builder.read_timeout(timeout);
            }
            if let Some(tls) = &request.tls {
                let certs = tls
                    .root_certificates
                    .iter()
                    .map(|pem| reqwest::Certificate::from_pem(pem))
                    .collect::<Result<Vec<_>, _>>()?;
                builder = if tls.include_builtin_roots {
                    builder.tls_certs_merge(certs)
                } else {
                    builder.tls_certs_only(certs)
                };
            }

            Ok(builder.build()?)
        }
    }

    impl HttpClient for ReqwestClient {
        async fn send(
            &self,
            request: PreparedRequest,
            body: RequestBody,
        ) -> Result<HttpResponse, TransportError> {
            let client = Self::build(&request)?;
            let method = reqwest::Method::from_bytes(request.method.as_bytes())
                .map_err(|e| TransportError::new(TransportErrorKind::Builder, e.to_string()))?;

            let mut builder = client.request(method, request.url.as_str());
            for (key, value) in &request.headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
            if let Some(BodyFraming::Fixed(len)) = request.framing {
                builder = builder.header(CONTENT_LENGTH, len);
            }
            builder = match body {
                RequestBody::Empty => builder,
                RequestBody::Bytes(bytes) => builder.body(bytes),
                RequestBody::Stream(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
            };

            let response = builder.send().await?;

            let status = response.status().as_u16();
            let mut headers = Headers::new();
            for (name, value) in response.headers() {
                headers
                    .entry(name.as_str().to_string())
                    .or_default()
                    .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
            }
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::from));

            Ok(HttpResponse {
                status,
                headers,
                body: Box::pin(body),
            })
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
