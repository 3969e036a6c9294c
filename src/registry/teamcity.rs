use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::error::PublishError;

/// File name the archive at `url` is stored under.
pub fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

/// Download a distribution archive from the build server into `dest_dir`.
///
/// An archive that is already present is reused, so re-running a failed
/// publish does not fetch it again.
pub async fn fetch_artifact(
    client: &Client,
    url: &str,
    dest_dir: &Path,
    quiet: bool,
) -> Result<PathBuf, PublishError> {
    let file_name = file_name_from_url(url);
    if file_name.is_empty() {
        return Err(PublishError::transport("GET", url, "URL has no file name"));
    }
    let dest = dest_dir.join(file_name);
    if dest.exists() {
        tracing::info!(path = %dest.display(), "archive already downloaded, skipping");
        return Ok(dest);
    }

    tracing::info!(url, "downloading archive");
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| PublishError::transport("GET", url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PublishError::transport("GET", url, status));
    }

    tokio::fs::create_dir_all(dest_dir).await?;
    let partial = dest.with_extension("part");
    let mut file = tokio::fs::File::create(&partial).await?;

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        download_bar(response.content_length())
    };

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| PublishError::transport("GET", url, e))?
    {
        file.write_all(&chunk).await?;
        pb.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&partial, &dest).await?;
    pb.finish_and_clear();

    tracing::info!(path = %dest.display(), "download complete");
    Ok(dest)
}

fn download_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let pb = ProgressBar::new(len);
            let style = ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {bytes_per_sec}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            pb.set_style(style);
            pb
        }
        None => ProgressBar::new_spinner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url(
                "https://teamcity.jetbrains.com/guestAuth/app/rest/builds/id:1/artifacts/content/MPS-2024.3.zip"
            ),
            "MPS-2024.3.zip"
        );
        assert_eq!(file_name_from_url("https://h/a/b.zip?x=1"), "b.zip");
        assert_eq!(file_name_from_url("https://h/a/"), "");
    }

    #[tokio::test]
    async fn test_existing_archive_is_not_fetched() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("MPS-1.zip");
        std::fs::write(&existing, b"cached").unwrap();

        // unroutable host: any request would fail
        let client = Client::new();
        let path = fetch_artifact(&client, "http://127.0.0.1:9/MPS-1.zip", dir.path(), true)
            .await
            .unwrap();
        assert_eq!(path, existing);
        assert_eq!(std::fs::read(&path).unwrap(), b"cached");
    }
}
