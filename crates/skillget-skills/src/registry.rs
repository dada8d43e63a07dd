//! Registry client: fetch skill metadata, version descriptors and archives
//! from the skill registry, and publish new versions to it.
//!
//! The lifecycle manager only depends on the narrow [`Registry`] trait;
//! [`HttpRegistry`] is the production implementation and additionally
//! exposes the search, listing, publish and account endpoints used by the
//! command line.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::types::{
    ArtifactReference, DownloadResponse, PackageInfo, Pagination, PublishRequest,
    PublishResponse, RemoteVersionInfo, SearchPage, UploadResponse, User,
};

/// User agent sent with every request.
pub const USER_AGENT: &str = concat!("skill-get/", env!("CARGO_PKG_VERSION"));

/// Error codes the registry uses for missing packages or versions.
const NOT_FOUND_CODES: &[&str] = &["not_found", "skill_not_found", "version_not_found"];

/// Failures surfaced by a registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The skill or version does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The artifact bytes could not be retrieved.
    #[error("artifact unavailable: {reason}")]
    Unavailable { reason: String },

    /// The registry was unreachable or answered with an unexpected failure.
    #[error("{message}")]
    Network { code: String, message: String },
}

impl RegistryError {
    fn network(err: impl std::fmt::Display) -> Self {
        Self::Network {
            code: "network_error".into(),
            message: err.to_string(),
        }
    }
}

/// What the lifecycle manager needs from a registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Package metadata, including the latest published version.
    async fn fetch_latest_metadata(&self, name: &str) -> Result<PackageInfo, RegistryError>;

    /// Resolve `version` (possibly `latest`) to a concrete version descriptor.
    async fn fetch_version_info(
        &self,
        name: &str,
        version: &str,
    ) -> Result<RemoteVersionInfo, RegistryError>;

    /// Download the archive behind `reference`.
    async fn fetch_artifact_bytes(
        &self,
        reference: &ArtifactReference,
    ) -> Result<Vec<u8>, RegistryError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Query options for [`HttpRegistry::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
}

/// Query options for [`HttpRegistry::list_skills`].
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// JSON envelope wrapping every successful response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// JSON body of a failed response.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the skill registry.
pub struct HttpRegistry {
    /// `<apiUrl>/api/v1`
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl HttpRegistry {
    /// Create a client from the process configuration.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_url(&config.api_url, config.token.clone())
    }

    /// Create a client for an explicit API root.
    pub fn with_url(api_url: &str, token: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("X-Client", HeaderValue::from_static("skill-get"));

        Self {
            base_url: format!("{}/api/v1", api_url.trim_end_matches('/')),
            token: token.filter(|t| !t.is_empty()),
            http: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .default_headers(headers)
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, RegistryError> {
        let mut url = url::Url::parse(&self.base_url).map_err(RegistryError::network)?;
        url.path_segments_mut()
            .map_err(|()| RegistryError::network("API URL cannot be a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Send a request and decode the JSON envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<Envelope<T>, RegistryError> {
        let response = self
            .authorized(req)
            .send()
            .await
            .map_err(RegistryError::network)?;

        let status = response.status();
        let body = response.bytes().await.map_err(RegistryError::network)?;

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_slice(&body).unwrap_or_default();
            let code = parsed.error.unwrap_or_else(|| "request_failed".into());
            let message = parsed
                .message
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

            tracing::debug!(status = %status, code = %code, "registry request failed");

            if status == reqwest::StatusCode::NOT_FOUND || NOT_FOUND_CODES.contains(&code.as_str())
            {
                return Err(RegistryError::NotFound { message });
            }
            return Err(RegistryError::Network { code, message });
        }

        serde_json::from_slice(&body).map_err(RegistryError::network)
    }

    /// Like [`send`](Self::send) but requires the `data` field.
    async fn send_data<T: DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<T, RegistryError> {
        self.send::<T>(req)
            .await?
            .data
            .ok_or_else(|| RegistryError::Network {
                code: "invalid_response".into(),
                message: format!("Failed to fetch {what}: response missing data"),
            })
    }

    /// Package metadata for `name`.
    pub async fn get_skill(&self, name: &str) -> Result<PackageInfo, RegistryError> {
        let url = self.endpoint(&["skills", name])?;
        tracing::debug!(name = %name, "fetching skill metadata");
        self.send_data(self.http.get(url), &format!("skill: {name}"))
            .await
    }

    /// Download descriptor for `name@version`.
    pub async fn download(
        &self,
        name: &str,
        version: &str,
    ) -> Result<DownloadResponse, RegistryError> {
        let url = self.endpoint(&["skills", name, "versions", version, "download"])?;
        tracing::debug!(name = %name, version = %version, "fetching download descriptor");
        self.send_data(self.http.get(url), &format!("skill: {name}"))
            .await
    }

    /// Raw archive bytes for `name@version`.
    pub async fn tarball(&self, name: &str, version: &str) -> Result<Vec<u8>, RegistryError> {
        let url = self
            .endpoint(&["skills", name, "versions", version, "tarball"])
            .map_err(|e| RegistryError::Unavailable {
                reason: e.to_string(),
            })?;
        tracing::debug!(name = %name, version = %version, "downloading tarball");

        let response = self
            .authorized(self.http.get(url))
            .send()
            .await
            .map_err(|e| RegistryError::Unavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(RegistryError::Unavailable {
                reason: format!("tarball download failed: HTTP {}", response.status()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RegistryError::Unavailable {
                reason: e.to_string(),
            })?;
        Ok(bytes.to_vec())
    }

    /// Full-text search over skills.
    pub async fn search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<SearchPage, RegistryError> {
        let mut url = self.endpoint(&["search"])?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query).append_pair("type", "skill");
            if let Some(page) = params.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(limit) = params.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(category) = &params.category {
                pairs.append_pair("category", category);
            }
        }

        let envelope = self.send::<Vec<PackageInfo>>(self.http.get(url)).await?;
        Ok(SearchPage {
            data: envelope.data.unwrap_or_default(),
            query: query.to_owned(),
            pagination: envelope.pagination.unwrap_or_default(),
        })
    }

    /// Browse the catalogue.
    pub async fn list_skills(&self, params: &ListParams) -> Result<SearchPage, RegistryError> {
        let mut url = self.endpoint(&["skills"])?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(category) = &params.category {
                pairs.append_pair("category", category);
            }
            if let Some(sort) = &params.sort {
                pairs.append_pair("sort", sort);
            }
            if let Some(page) = params.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(limit) = params.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let envelope = self.send::<Vec<PackageInfo>>(self.http.get(url)).await?;
        Ok(SearchPage {
            data: envelope.data.unwrap_or_default(),
            query: String::new(),
            pagination: envelope.pagination.unwrap_or_default(),
        })
    }

    /// Register a new version's metadata.
    pub async fn publish_skill(
        &self,
        request: &PublishRequest,
    ) -> Result<PublishResponse, RegistryError> {
        let url = self.endpoint(&["publish", "skills"])?;
        tracing::debug!(name = %request.name, version = %request.version, "publishing metadata");
        self.send_data(self.http.post(url).json(request), "publish response")
            .await
    }

    /// Upload the gzipped archive for a published version.
    pub async fn upload_tarball(
        &self,
        name: &str,
        version: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, RegistryError> {
        let url = self.endpoint(&["publish", "skills", name, "versions", version, "tarball"])?;
        tracing::debug!(name = %name, version = %version, size = bytes.len(), "uploading tarball");
        let req = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/gzip")
            .body(bytes);
        let envelope = self.send::<UploadResponse>(req).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// The account the stored token belongs to.
    pub async fn current_user(&self) -> Result<User, RegistryError> {
        let url = self.endpoint(&["auth", "user"])?;
        self.send_data(self.http.get(url), "user").await
    }
}

#[async_trait]
impl Registry for HttpRegistry {
    async fn fetch_latest_metadata(&self, name: &str) -> Result<PackageInfo, RegistryError> {
        self.get_skill(name).await
    }

    async fn fetch_version_info(
        &self,
        name: &str,
        version: &str,
    ) -> Result<RemoteVersionInfo, RegistryError> {
        let resp = self.download(name, version).await?;
        Ok(RemoteVersionInfo::from_download(name, resp))
    }

    async fn fetch_artifact_bytes(
        &self,
        reference: &ArtifactReference,
    ) -> Result<Vec<u8>, RegistryError> {
        // The registry serves archives from a canonical endpoint; the
        // advertised URL only signals that one exists.
        self.tarball(&reference.name, &reference.version).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn base_url_appends_api_prefix() {
        let client = HttpRegistry::with_url("https://api.example.com/", None);
        assert_eq!(client.base_url(), "https://api.example.com/api/v1");
    }

    #[test]
    fn endpoint_encodes_segments() {
        let client = HttpRegistry::with_url("https://api.example.com", None);
        let url = client.endpoint(&["skills", "@scope/pkg"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/api/v1/skills/@scope%2Fpkg"
        );
    }

    #[tokio::test]
    async fn get_skill_sends_client_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/foo"))
            .and(header("X-Client", "skill-get"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"name": "foo", "latest_version": "1.2.0", "downloads": 42}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), Some("tok".into()));
        let pkg = client.get_skill("foo").await.unwrap();
        assert_eq!(pkg.latest_version.as_deref(), Some("1.2.0"));
        assert_eq!(pkg.downloads, 42);
    }

    #[tokio::test]
    async fn http_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "skill_not_found",
                "message": "Skill not found"
            })))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        let err = client.get_skill("ghost").await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotFound {
                message: "Skill not found".into()
            }
        );
    }

    #[tokio::test]
    async fn server_error_is_network_with_default_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/foo"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        let err = client.get_skill("foo").await.unwrap_err();
        assert_eq!(
            err,
            RegistryError::Network {
                code: "request_failed".into(),
                message: "Request failed with status 502".into()
            }
        );
    }

    #[tokio::test]
    async fn success_without_data_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/foo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        match client.get_skill("foo").await.unwrap_err() {
            RegistryError::Network { code, .. } => assert_eq!(code, "invalid_response"),
            other => panic!("expected invalid response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_registry_is_network_error() {
        // Bind then drop a listener so the port refuses connections.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = HttpRegistry::with_url(&format!("http://127.0.0.1:{port}"), None);
        match client.get_skill("foo").await.unwrap_err() {
            RegistryError::Network { code, .. } => assert_eq!(code, "network_error"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn version_info_carries_artifact_reference() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/foo/versions/latest/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "version": "2.0.0",
                    "tarball_url": "https://cdn.example/foo-2.0.0.tgz",
                    "skill_md": "# Foo"
                }
            })))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        let info = client.fetch_version_info("foo", "latest").await.unwrap();
        assert_eq!(info.version, "2.0.0");
        let artifact = info.artifact.unwrap();
        assert_eq!(artifact.name, "foo");
        assert_eq!(artifact.version, "2.0.0");
        assert_eq!(info.skill_md.as_deref(), Some("# Foo"));
    }

    #[tokio::test]
    async fn tarball_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/skills/foo/versions/1.0.0/tarball"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        let reference = ArtifactReference {
            name: "foo".into(),
            version: "1.0.0".into(),
            tarball_url: None,
        };
        let err = client.fetch_artifact_bytes(&reference).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn search_defaults_pagination_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .and(query_param("q", "git"))
            .and(query_param("type", "skill"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"name": "git-helper"}]
            })))
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), None);
        let page = client.search("git", &SearchParams::default()).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.query, "git");
        assert_eq!(page.pagination, Pagination::default());
    }

    #[tokio::test]
    async fn publish_then_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/publish/skills"))
            .and(body_json(serde_json::json!({"name": "foo", "version": "1.0.0"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "data": {"name": "foo", "version": "1.0.0", "type": "skill"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/publish/skills/foo/versions/1.0.0/tarball"))
            .and(header("Content-Type", "application/gzip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"sha256": "abc", "size_bytes": 3}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpRegistry::with_url(&server.uri(), Some("tok".into()));
        let request = PublishRequest {
            name: "foo".into(),
            version: "1.0.0".into(),
            ..Default::default()
        };
        let published = client.publish_skill(&request).await.unwrap();
        assert_eq!(published.kind.as_deref(), Some("skill"));

        let upload = client
            .upload_tarball("foo", "1.0.0", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(upload.size_bytes, Some(3));
    }
}
