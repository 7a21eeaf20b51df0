use std::time::Duration;

/// Default form field name of the uploaded file.
pub const DEFAULT_FILE_KEY: &str = "file";

/// Custom trust material for `https` connections.
#[derive(Clone, PartialEq, Eq)]
pub struct TlsTrust {
    /// PEM-encoded root certificates to trust.
    pub root_certificates: Vec<Vec<u8>>,

    /// Keep the platform's built-in roots alongside `root_certificates`.
    ///
    /// Default: true
    pub include_builtin_roots: bool,
}

impl std::fmt::Debug for TlsTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsTrust")
            .field("root_certificates", &self.root_certificates.len())
            .field("include_builtin_roots", &self.include_builtin_roots)
            .finish()
    }
}

impl TlsTrust {
    pub fn from_pem(pem: impl Into<Vec<u8>>) -> Self {
        Self {
            root_certificates:     vec![pem.into()],
            include_builtin_roots: true,
        }
    }

    #[must_use]
    pub fn add_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Trust only the supplied roots.
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.include_builtin_roots = false;
        self
    }
}

/// Declarative HTTP settings for one request.
///
/// # Examples
///
/// ```
/// use ferry_transfer::HttpOptions;
/// use std::time::Duration;
///
/// let options = HttpOptions::default()
///     .method("POST")
///     .header("Authorization", "Bearer token")
///     .param("tag", "a")
///     .param("tag", "b")
///     .connect_timeout(Duration::from_secs(5));
/// assert_eq!(options.params, vec![("tag".to_string(), vec!["a".to_string(), "b".to_string()])]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// HTTP method, upper-cased when the request is configured.
    ///
    /// Default: `GET`
    pub method: String,

    /// Request headers in insertion order, names kept verbatim.
    pub headers: Vec<(String, String)>,

    /// Query or body parameters in insertion order, each key with all its values.
    pub params: Vec<(String, Vec<String>)>,

    /// Percent-encode parameter keys and values.
    ///
    /// Default: false
    pub should_encode_url_params: bool,

    /// Deadline for establishing the connection. `None` defers to
    /// [`TransferConfig`](crate::TransferConfig).
    pub connect_timeout: Option<Duration>,

    /// Deadline between two successful reads. `None` defers to
    /// [`TransferConfig`](crate::TransferConfig).
    pub read_timeout: Option<Duration>,

    /// Do not follow 3xx responses.
    ///
    /// Default: false
    pub disable_redirects: bool,

    /// Trust material installed on `https` requests.
    pub tls: Option<TlsTrust>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            method:                   "GET".to_string(),
            headers:                  Vec::new(),
            params:                   Vec::new(),
            should_encode_url_params: false,
            connect_timeout:          None,
            read_timeout:             None,
            disable_redirects:        false,
            tls:                      None,
        }
    }
}

impl HttpOptions {
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Append a header. Repeated names are sent repeatedly.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Append a parameter value, grouping values that share a key.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.params.push((key, vec![value])),
        }
        self
    }

    #[must_use]
    pub fn encode_url_params(mut self, encode: bool) -> Self {
        self.should_encode_url_params = encode;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn disable_redirects(mut self, disable: bool) -> Self {
        self.disable_redirects = disable;
        self
    }

    #[must_use]
    pub fn tls(mut self, tls: TlsTrust) -> Self {
        self.tls = Some(tls);
        self
    }
}

/// Options of one download call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub url:       String,
    /// Local destination, optionally `file:`-prefixed.
    pub file_path: String,
    pub http:      HttpOptions,
}

impl DownloadOptions {
    pub fn new(url: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            url:       url.into(),
            file_path: file_path.into(),
            http:      HttpOptions::default(),
        }
    }

    #[must_use]
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }
}

/// Options of one upload call.
///
/// A fresh value uploads with `POST`, i.e. as multipart/form-data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub url:          String,
    /// Local path or host content identifier of the file to send.
    pub file_path:    String,
    /// Force chunked transfer encoding even when the size is known.
    pub chunked_mode: bool,
    /// Overrides the MIME type looked up from the file name.
    pub mime_type:    Option<String>,
    /// Form field name of the file part.
    pub file_key:     String,
    pub http:         HttpOptions,
}

impl UploadOptions {
    pub fn new(url: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            url:          url.into(),
            file_path:    file_path.into(),
            chunked_mode: false,
            mime_type:    None,
            file_key:     DEFAULT_FILE_KEY.to_string(),
            http:         HttpOptions::default().method("POST"),
        }
    }

    #[must_use]
    pub fn chunked_mode(mut self, chunked: bool) -> Self {
        self.chunked_mode = chunked;
        self
    }

    #[must_use]
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    #[must_use]
    pub fn file_key(mut self, file_key: impl Into<String>) -> Self {
        self.file_key = file_key.into();
        self
    }

    #[must_use]
    pub fn http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }
}
