use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ferry_transfer::{
    DownloadOptions, Downloader, HttpClient, HttpOptions, TransferConfig, TransferError,
    TransferResult, UploadOptions, Uploader,
};
use futures_util::{Stream, StreamExt};

use super::app::{DownloadArg, UploadArg};
use crate::ui::Reporter;

pub async fn download<C: HttpClient>(
    client: C,
    config: TransferConfig,
    arg: DownloadArg,
    json: bool,
) -> Result<()> {
    let options = DownloadOptions::new(arg.url, local_path(&arg.path)?)
        .http(arg.http.apply(HttpOptions::default())?);

    let downloader = Downloader::new(client).with_config(config);
    report(downloader.download(options), json).await
}

pub async fn upload<C: HttpClient>(
    client: C,
    config: TransferConfig,
    arg: UploadArg,
    json: bool,
) -> Result<()> {
    let mut options = UploadOptions::new(arg.url, local_path(&arg.path)?)
        .chunked_mode(arg.chunked)
        .file_key(arg.file_key);
    options.http = arg.http.apply(options.http)?;
    options.mime_type = arg.mime;

    let uploader = Uploader::new(client).with_config(config);
    report(uploader.upload(options), json).await
}

/// Relative paths are taken from the working directory. `file:` and
/// `content://` identifiers are passed through for the engine to resolve.
fn local_path(path: &Path) -> Result<String> {
    let raw = path.to_string_lossy();
    if ferry_fs::is_content_uri(&raw) || raw.starts_with("file:") {
        return Ok(raw.into_owned());
    }

    let absolute = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path {}", path.display()))?;
    Ok(absolute.to_string_lossy().into_owned())
}

async fn report<S>(events: S, json: bool) -> Result<()>
where
    S: Stream<Item = Result<TransferResult, TransferError>>,
{
    let mut reporter = Reporter::new(json);
    let mut events = std::pin::pin!(events);

    while let Some(event) = events.next().await {
        match event {
            Ok(TransferResult::Ongoing(progress)) => reporter.progress(&progress)?,
            Ok(TransferResult::Complete(complete)) => return reporter.complete(&complete),
            Err(err) => {
                reporter.failed(&err)?;
                return Err(anyhow!("{}: {err}", err.code()));
            }
        }
    }

    Err(anyhow!("transfer ended without a result"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_become_absolute() {
        let path = local_path(Path::new("out/a.bin")).unwrap();
        assert!(Path::new(&path).is_absolute());
        assert!(path.ends_with("a.bin"));
    }

    #[test]
    fn uri_paths_are_passed_through() {
        assert_eq!(local_path(Path::new("file:///tmp/a.bin")).unwrap(), "file:///tmp/a.bin");
        assert_eq!(local_path(Path::new("file:/tmp/a.bin")).unwrap(), "file:/tmp/a.bin");
        assert_eq!(
            local_path(Path::new("content://media/external/1")).unwrap(),
            "content://media/external/1"
        );
    }
}
