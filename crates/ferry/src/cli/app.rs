use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ferry_transfer::{HttpOptions, TlsTrust};

#[derive(Clone, Debug, Parser)]
#[command(name = "ferry", version = env!("CARGO_PKG_VERSION"), about = "Single-file HTTP downloads and uploads", long_about = None, propagate_version = true)]
pub struct App {
    /// Config file [default: $FERRY_CONFIG, then ~/.ferry/config.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print every event as one JSON object per line
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "d", name = "download", about = "Download a URL to a file")]
    Download(DownloadArg),
    #[command(alias = "u", name = "upload", about = "Upload a file to a URL")]
    Upload(UploadArg),
}

#[derive(Clone, Debug, Args)]
pub struct DownloadArg {
    pub url: String,
    /// Destination file
    pub path: PathBuf,
    #[command(flatten)]
    pub http: HttpArg,
}

#[derive(Clone, Debug, Args)]
pub struct UploadArg {
    pub url: String,
    /// File to send
    pub path: PathBuf,
    /// Use chunked transfer encoding even if the size is known
    #[arg(long)]
    pub chunked: bool,
    /// MIME type of the file [default: from its extension]
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,
    /// Form field name of the file part
    #[arg(long, value_name = "KEY", default_value = "file")]
    pub file_key: String,
    #[command(flatten)]
    pub http: HttpArg,
}

#[derive(Clone, Debug, Args)]
pub struct HttpArg {
    /// HTTP method [default: GET for downloads, POST for uploads]
    #[arg(short = 'X', long, value_name = "METHOD")]
    pub method: Option<String>,

    /// Request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "K: V", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Query or form parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "K=V", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Percent-encode parameter keys and values
    #[arg(long)]
    pub encode_params: bool,

    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    #[arg(long, value_name = "MS")]
    pub read_timeout: Option<u64>,

    /// Do not follow redirects
    #[arg(long)]
    pub no_redirects: bool,

    /// Extra trusted root certificate (PEM), repeatable
    #[arg(long, value_name = "PEM")]
    pub ca_cert: Vec<PathBuf>,

    /// Trust only the --ca-cert roots
    #[arg(long, requires = "ca_cert")]
    pub only_ca_cert: bool,
}

impl HttpArg {
    /// Merge the flags into `base`, which carries the per-call defaults.
    pub fn apply(self, base: HttpOptions) -> Result<HttpOptions> {
        let mut options = base
            .encode_url_params(self.encode_params)
            .disable_redirects(self.no_redirects);

        if let Some(method) = self.method {
            options = options.method(method);
        }
        for (key, value) in self.headers {
            options = options.header(key, value);
        }
        for (key, value) in self.params {
            options = options.param(key, value);
        }
        if let Some(ms) = self.connect_timeout {
            options = options.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.read_timeout {
            options = options.read_timeout(Duration::from_millis(ms));
        }

        let mut tls: Option<TlsTrust> = None;
        for path in &self.ca_cert {
            let pem = std::fs::read(path)
                .with_context(|| format!("Failed to read certificate {}", path.display()))?;
            tls = Some(match tls {
                Some(tls) => tls.add_pem(pem),
                None => TlsTrust::from_pem(pem),
            });
        }
        if let Some(mut tls) = tls {
            if self.only_ca_cert {
                tls = tls.exclusive();
            }
            options = options.tls(tls);
        }

        Ok(options)
    }
}

fn parse_header(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once(':') else {
        bail!("expected `Name: value`, got {s:?}")
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("header name is empty in {s:?}")
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_param(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected `key=value`, got {s:?}")
    };
    if key.is_empty() {
        bail!("parameter name is empty in {s:?}")
    }
    Ok((key.to_string(), value.to_string()))
}
