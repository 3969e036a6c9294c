use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use reqwest::{Body, Client, RequestBuilder, StatusCode};
use sha2::{Digest, Sha256, Sha512};
use tokio::io::AsyncReadExt;

use crate::error::PublishError;
use crate::models::Coordinates;
use crate::pom::{finish, text_element, xml_writer};

const METADATA_FILE: &str = "maven-metadata.xml";
const UPLOAD_CHUNK: usize = 64 * 1024;

/// Basic-auth credentials for the repository. Used only when both parts are
/// non-empty.
#[derive(Clone, Default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    fn basic(&self) -> Option<(&str, &str)> {
        let user = self.username.as_deref().filter(|u| !u.is_empty())?;
        let pass = self.password.as_deref().filter(|p| !p.is_empty())?;
        Some((user, pass))
    }

    pub fn is_complete(&self) -> bool {
        self.basic().is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Content of a file to upload.
#[derive(Debug)]
pub enum Payload {
    /// Streamed from disk; used for the distribution archive.
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// One file of the published version, stored as `<artifact>-<version>.<extension>`.
#[derive(Debug)]
pub struct Upload {
    pub extension: &'static str,
    pub payload: Payload,
}

/// Map the status of the existence probe to exists / absent.
fn classify_head_status(status: StatusCode, url: &str) -> Result<bool, PublishError> {
    match status {
        StatusCode::OK => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        other => Err(PublishError::UnexpectedServerState {
            code: other.as_u16(),
            url: url.to_string(),
        }),
    }
}

/// A Maven repository reachable over plain HTTP GET / HEAD / PUT.
pub struct MavenRepository {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl MavenRepository {
    pub fn new(client: Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.basic() {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    /// Check whether the POM of `coords` is already in the repository.
    pub async fn artifact_exists(&self, coords: &Coordinates) -> Result<bool, PublishError> {
        let url = self.url(&coords.file_path("pom"));
        tracing::info!(url = %url, "checking whether artifact exists");
        if let Some((user, _)) = self.credentials.basic() {
            tracing::info!(user, "using basic authentication");
        }

        let response = self
            .authorize(self.client.head(&url))
            .send()
            .await
            .map_err(|e| PublishError::transport("HEAD", &url, e))?;

        let status = response.status();
        tracing::info!(code = status.as_u16(), "received response");
        classify_head_status(status, &url)
    }

    /// Upload every file of a version with its checksums, then register the
    /// version in the artifact's `maven-metadata.xml`.
    pub async fn publish(&self, coords: &Coordinates, uploads: Vec<Upload>) -> Result<(), PublishError> {
        if !self.credentials.is_complete() {
            return Err(PublishError::MissingCredential {
                coordinates: coords.to_string(),
            });
        }

        let puts = uploads.into_iter().map(|upload| {
            let path = coords.file_path(upload.extension);
            async move { self.put_with_checksums(&path, upload.payload).await }
        });
        try_join_all(puts).await?;

        let metadata_path = format!("{}/{}", coords.artifact_path(), METADATA_FILE);
        let existing = self.get_optional(&metadata_path).await?;
        let last_updated = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
        let metadata = merge_metadata(existing.as_deref(), coords, &last_updated).map_err(|e| {
            PublishError::Metadata {
                url: self.url(&metadata_path),
                reason: format!("{e:#}"),
            }
        })?;
        self.put_with_checksums(&metadata_path, Payload::Bytes(metadata.into_bytes()))
            .await?;

        tracing::info!(coordinates = %coords, "published");
        Ok(())
    }

    async fn put_with_checksums(&self, path: &str, payload: Payload) -> Result<(), PublishError> {
        let (sha256, sha512) = checksums(&payload).await?;
        self.put(path, payload).await?;
        self.put(&format!("{path}.sha256"), Payload::Bytes(sha256.into_bytes()))
            .await?;
        self.put(&format!("{path}.sha512"), Payload::Bytes(sha512.into_bytes()))
            .await?;
        Ok(())
    }

    async fn put(&self, path: &str, payload: Payload) -> Result<(), PublishError> {
        let url = self.url(path);
        let (body, len) = match payload {
            Payload::Bytes(bytes) => {
                let len = bytes.len() as u64;
                (Body::from(bytes), len)
            }
            Payload::File(file) => {
                let file = tokio::fs::File::open(&file).await?;
                let len = file.metadata().await?.len();
                (file_body(file), len)
            }
        };

        tracing::debug!(url = %url, bytes = len, "uploading");
        let response = self
            .authorize(self.client.put(&url))
            .header(reqwest::header::CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await
            .map_err(|e| PublishError::transport("PUT", &url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::transport("PUT", &url, status));
        }
        Ok(())
    }

    async fn get_optional(&self, path: &str) -> Result<Option<String>, PublishError> {
        let url = self.url(path);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| PublishError::transport("GET", &url, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .text()
                .await
                .map(Some)
                .map_err(|e| PublishError::transport("GET", &url, e)),
            status => Err(PublishError::transport("GET", &url, status)),
        }
    }
}

/// Stream a file as a request body without loading it into memory.
fn file_body(file: tokio::fs::File) -> Body {
    let stream = futures::stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; UPLOAD_CHUNK];
        let n = file.read(&mut buf).await?;
        if n == 0 {
            return Ok::<_, std::io::Error>(None);
        }
        buf.truncate(n);
        Ok(Some((buf, file)))
    });
    Body::wrap_stream(stream)
}

/// Hex SHA-256 and SHA-512 of a payload.
async fn checksums(payload: &Payload) -> Result<(String, String), PublishError> {
    match payload {
        Payload::Bytes(bytes) => Ok(digest_hex(bytes.as_slice())?),
        Payload::File(path) => {
            let path = path.clone();
            tokio::task::spawn_blocking(move || digest_hex(std::fs::File::open(path)?))
                .await
                .map_err(std::io::Error::other)?
                .map_err(PublishError::from)
        }
    }
}

fn digest_hex(mut reader: impl Read) -> std::io::Result<(String, String)> {
    let mut sha256 = Sha256::new();
    let mut sha512 = Sha512::new();
    let mut buf = vec![0u8; UPLOAD_CHUNK];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sha256.update(&buf[..n]);
        sha512.update(&buf[..n]);
    }
    Ok((
        format!("{:x}", sha256.finalize()),
        format!("{:x}", sha512.finalize()),
    ))
}

/// Extract the `<versions><version>` entries of a `maven-metadata.xml`.
fn extract_versions(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut versions = Vec::new();
    let mut in_versions = false;
    let mut in_version = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().local_name().into_inner() {
                b"versions" => in_versions = true,
                b"version" if in_versions => in_version = true,
                _ => {}
            },
            Ok(Event::Text(ref e)) if in_version => versions.push(e.unescape()?.into_owned()),
            Ok(Event::End(ref e)) => match e.name().local_name().into_inner() {
                b"version" => in_version = false,
                b"versions" => in_versions = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e),
            _ => {}
        }
        buf.clear();
    }

    Ok(versions)
}

/// Produce the artifact-level `maven-metadata.xml` after publishing
/// `coords.version`: earlier versions are kept, the new one is appended once
/// and becomes `latest` and `release`. An existing document that does not
/// parse is an error; it is never replaced by one listing only the new version.
pub fn merge_metadata(existing: Option<&str>, coords: &Coordinates, last_updated: &str) -> Result<String> {
    let mut versions = match existing {
        Some(xml) => extract_versions(xml).context("malformed existing maven-metadata.xml")?,
        None => Vec::new(),
    };
    if !versions.iter().any(|v| v == &coords.version) {
        versions.push(coords.version.clone());
    }

    let mut w = xml_writer()?;
    w.write_event(Event::Start(BytesStart::new("metadata")))?;
    text_element(&mut w, "groupId", &coords.group_id)?;
    text_element(&mut w, "artifactId", &coords.artifact_id)?;
    w.write_event(Event::Start(BytesStart::new("versioning")))?;
    text_element(&mut w, "latest", &coords.version)?;
    text_element(&mut w, "release", &coords.version)?;
    w.write_event(Event::Start(BytesStart::new("versions")))?;
    for version in &versions {
        text_element(&mut w, "version", version)?;
    }
    w.write_event(Event::End(BytesEnd::new("versions")))?;
    text_element(&mut w, "lastUpdated", last_updated)?;
    w.write_event(Event::End(BytesEnd::new("versioning")))?;
    w.write_event(Event::End(BytesEnd::new("metadata")))?;
    finish(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(version: &str) -> Coordinates {
        Coordinates {
            group_id: "com.jetbrains.mps".to_string(),
            artifact_id: "mps-prerelease".to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_head_status() {
        assert!(classify_head_status(StatusCode::OK, "u").unwrap());
        assert!(!classify_head_status(StatusCode::NOT_FOUND, "u").unwrap());
        match classify_head_status(StatusCode::UNAUTHORIZED, "https://r/x.pom") {
            Err(PublishError::UnexpectedServerState { code, url }) => {
                assert_eq!(code, 401);
                assert_eq!(url, "https://r/x.pom");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_credentials_require_both_parts() {
        let none = Credentials::default();
        assert!(none.basic().is_none());

        let user_only = Credentials {
            username: Some("ci".to_string()),
            password: Some(String::new()),
        };
        assert!(user_only.basic().is_none());

        let both = Credentials {
            username: Some("ci".to_string()),
            password: Some("secret".to_string()),
        };
        assert_eq!(both.basic(), Some(("ci", "secret")));
        assert!(!format!("{both:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_publish_without_credentials_fails_before_network() {
        let repo = MavenRepository::new(Client::new(), "http://127.0.0.1:9/", Credentials::default());
        let err = repo.publish(&coords("1.0"), Vec::new()).await.unwrap_err();
        match err {
            PublishError::MissingCredential { coordinates } => {
                assert_eq!(coordinates, "com.jetbrains.mps:mps-prerelease:1.0");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_digest_hex() {
        let (sha256, sha512) = digest_hex(&b"abc"[..]).unwrap();
        assert_eq!(
            sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha512.len(), 128);
        assert!(sha512.starts_with("ddaf35a193617aba"));
    }

    #[test]
    fn test_merge_metadata_new() {
        let xml = merge_metadata(None, &coords("2024.3"), "20261016120000").unwrap();
        assert!(xml.contains("<artifactId>mps-prerelease</artifactId>"));
        assert!(xml.contains("<latest>2024.3</latest>"));
        assert_eq!(xml.matches("<version>").count(), 1);
        assert!(xml.contains("<lastUpdated>20261016120000</lastUpdated>"));
    }

    #[test]
    fn test_merge_metadata_keeps_existing_versions() {
        let existing = merge_metadata(None, &coords("2024.2"), "1").unwrap();
        let merged = merge_metadata(Some(&existing), &coords("2024.3"), "2").unwrap();
        assert_eq!(extract_versions(&merged).unwrap(), vec!["2024.2", "2024.3"]);
        assert!(merged.contains("<latest>2024.3</latest>"));

        let again = merge_metadata(Some(&merged), &coords("2024.3"), "3").unwrap();
        assert_eq!(extract_versions(&again).unwrap(), vec!["2024.2", "2024.3"]);
    }

    #[test]
    fn test_merge_metadata_rejects_malformed_existing() {
        let existing = "<metadata><groupId>com.jetbrains.mps</groupid><versioning><versions>\
                        <version>2024.1</version></versions></versioning></metadata>";
        assert!(extract_versions(existing).is_err());

        let err = merge_metadata(Some(existing), &coords("2024.3"), "1").unwrap_err();
        assert!(format!("{err:#}").contains("malformed existing maven-metadata.xml"));
    }

    #[test]
    fn test_metadata_error_names_url() {
        let err = PublishError::Metadata {
            url: "https://r/com/jetbrains/mps/mps-prerelease/maven-metadata.xml".to_string(),
            reason: "malformed existing maven-metadata.xml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("cannot update https://r/"));
        assert!(!msg.contains("GET"));
    }
}
