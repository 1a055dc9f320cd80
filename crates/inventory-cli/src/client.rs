//! Shared client utilities, error types, and the API-backed data sources.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use inventory_api_models::{
    GroupCreateRequest, GroupPatchRequest, GroupRecord, HostIdList, HostPatchRequest, HostRecord,
    HostTagsResponse, OperatingSystemCount, PageResponse, ProblemDetails, StructuredTag, TagCount,
};
use inventory_ui::features::groups::GroupSource;
use inventory_ui::features::hosts::HostSource;
use inventory_ui::features::tags::state::TagSource;
use inventory_ui::models::{EntityPage, into_entity_page};
use inventory_ui::{
    BATCH_CHUNK_SIZE, BatchError, DispatchError, EntitySource, NormalizedParams,
    fetch_batched_inline,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

pub(crate) const HEADER_API_KEY: &str = "x-inventory-api-key";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";
pub(crate) const API_PREFIX: &str = "/api/inventory/v1";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    /// Recover a classified error that travelled through the engine as `anyhow`.
    pub(crate) fn from_source(source: anyhow::Error) -> Self {
        match source.downcast::<Self>() {
            Ok(err) => err,
            Err(other) => Self::Failure(other),
        }
    }

    /// Prefix the message while keeping the classification.
    pub(crate) fn context(self, context: &str) -> Self {
        match self {
            Self::Validation(message) => Self::Validation(format!("{context}: {message}")),
            Self::Failure(error) => Self::Failure(error.context(context.to_string())),
        }
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

impl From<DispatchError> for CliError {
    fn from(err: DispatchError) -> Self {
        let context = err.to_string();
        match err {
            DispatchError::LoadEntities { original } => {
                Self::from_source(original).context(&context)
            }
        }
    }
}

impl From<BatchError> for CliError {
    fn from(err: BatchError) -> Self {
        let context = err.to_string();
        match err {
            BatchError::Chunk { source, .. } => Self::from_source(source).context(&context),
        }
    }
}

/// Application context passed to command handlers and API sources.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) api_key: Option<String>,
}

impl AppContext {
    /// Build an HTTP client carrying the request id and timeout.
    pub(crate) fn connect(
        base_url: Url,
        api_key: Option<String>,
        timeout_secs: u64,
        request_id: &str,
    ) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(request_id).map_err(|_| {
            CliError::failure(anyhow!("request identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(&format!("{API_PREFIX}{path}"))
            .map_err(|err| anyhow!("invalid base URL: {err}"))
    }

    fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        let builder = self.client.request(method, url);
        Ok(match &self.api_key {
            Some(key) => builder.header(HEADER_API_KEY, key),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> anyhow::Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| anyhow!("request to {path} failed: {err}"))?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_problem(response).await.into())
        }
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<T>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path)?.query(query);
        let response = self.send(builder, path).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| anyhow!("failed to parse response from {path}: {err}"))
    }

    async fn delete(&self, path: &str) -> anyhow::Result<()> {
        let builder = self.request(Method::DELETE, path)?;
        self.send(builder, path).await?;
        Ok(())
    }

    /// Delete hosts in chunks of [`BATCH_CHUNK_SIZE`].
    pub(crate) async fn delete_hosts(&self, ids: &[String]) -> Result<(), BatchError> {
        fetch_batched_inline(
            |chunk| async move { self.delete(&format!("/hosts/{}", chunk.join(","))).await },
            ids,
            BATCH_CHUNK_SIZE,
        )
        .await?;
        Ok(())
    }

    async fn host_tags(
        &self,
        ids: &[String],
    ) -> anyhow::Result<BTreeMap<String, Vec<StructuredTag>>> {
        let path = format!("/hosts/{}/tags", ids.join(","));
        let response: HostTagsResponse = self.get_json(&path, &[]).await?;
        Ok(response.results)
    }
}

fn page_query(search: Option<&str>, page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", page.to_string()),
        ("per_page", per_page.to_string()),
    ];
    if let Some(search) = search.filter(|value| !value.trim().is_empty()) {
        query.push(("search", search.trim().to_string()));
    }
    query
}

/// Host list backed by `GET /hosts`.
#[derive(Clone)]
pub(crate) struct HostList(pub(crate) AppContext);

#[async_trait]
impl EntitySource for HostList {
    async fn get_entities(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        show_tags: bool,
    ) -> anyhow::Result<EntityPage> {
        let query = params.query_pairs();
        let mut page: PageResponse<HostRecord> = if ids.is_empty() {
            self.0.get_json("/hosts", &query).await?
        } else {
            let path = format!("/hosts/{}", ids.join(","));
            self.0.get_json(&path, &query).await?
        };
        if show_tags && !page.results.is_empty() {
            let returned: Vec<String> = page.results.iter().map(|host| host.id.clone()).collect();
            let mut tags = self.0.host_tags(&returned).await?;
            for host in &mut page.results {
                host.tags = Some(tags.remove(&host.id).unwrap_or_default());
            }
        }
        debug!(rows = page.results.len(), total = ?page.total, "hosts page received");
        Ok(into_entity_page(page))
    }
}

/// Group list backed by `GET /groups`.
#[derive(Clone)]
pub(crate) struct GroupList(pub(crate) AppContext);

#[async_trait]
impl EntitySource for GroupList {
    async fn get_entities(
        &self,
        ids: &[String],
        params: &NormalizedParams,
        _show_tags: bool,
    ) -> anyhow::Result<EntityPage> {
        let query = params.query_pairs();
        let page: PageResponse<GroupRecord> = if ids.is_empty() {
            self.0.get_json("/groups", &query).await?
        } else {
            let path = format!("/groups/{}", ids.join(","));
            self.0.get_json(&path, &query).await?
        };
        debug!(rows = page.results.len(), total = ?page.total, "groups page received");
        Ok(into_entity_page(page))
    }
}

#[async_trait]
impl GroupSource for AppContext {
    async fn get_groups_by_ids(&self, ids: &[String]) -> anyhow::Result<Vec<GroupRecord>> {
        let path = format!("/groups/{}", ids.join(","));
        let page: PageResponse<GroupRecord> = self.get_json(&path, &[]).await?;
        Ok(page.results)
    }

    async fn create_group(&self, request: &GroupCreateRequest) -> anyhow::Result<GroupRecord> {
        let builder = self.request(Method::POST, "/groups")?.json(request);
        let response = self.send(builder, "/groups").await?;
        response
            .json::<GroupRecord>()
            .await
            .map_err(|err| anyhow!("failed to parse created group: {err}"))
    }

    async fn rename_group(&self, id: &str, name: &str) -> anyhow::Result<GroupRecord> {
        let path = format!("/groups/{id}");
        let body = GroupPatchRequest {
            name: Some(name.to_string()),
        };
        let builder = self.request(Method::PATCH, &path)?.json(&body);
        let response = self.send(builder, &path).await?;
        response
            .json::<GroupRecord>()
            .await
            .map_err(|err| anyhow!("failed to parse renamed group: {err}"))
    }

    async fn delete_groups(&self, ids: &[String]) -> anyhow::Result<()> {
        fetch_batched_inline(
            |chunk| async move { self.delete(&format!("/groups/{}", chunk.join(","))).await },
            ids,
            BATCH_CHUNK_SIZE,
        )
        .await?;
        Ok(())
    }

    async fn add_hosts(&self, group_id: &str, host_ids: &[String]) -> anyhow::Result<()> {
        let path = format!("/groups/{group_id}/hosts");
        let builder = self
            .request(Method::POST, &path)?
            .json(&HostIdList(host_ids.to_vec()));
        self.send(builder, &path).await?;
        Ok(())
    }

    async fn remove_hosts(&self, group_id: &str, host_ids: &[String]) -> anyhow::Result<()> {
        self.delete(&format!("/groups/{group_id}/hosts/{}", host_ids.join(",")))
            .await
    }
}

#[async_trait]
impl TagSource for AppContext {
    async fn get_tags(
        &self,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<PageResponse<TagCount>> {
        self.get_json("/tags", &page_query(search, page, per_page))
            .await
    }
}

#[async_trait]
impl HostSource for AppContext {
    async fn patch_host(&self, id: &str, request: &HostPatchRequest) -> anyhow::Result<()> {
        let path = format!("/hosts/{id}");
        let builder = self.request(Method::PATCH, &path)?.json(request);
        self.send(builder, &path).await?;
        Ok(())
    }

    async fn get_host_tags(
        &self,
        id: &str,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> anyhow::Result<HostTagsResponse> {
        let path = format!("/hosts/{id}/tags");
        self.get_json(&path, &page_query(search, page, per_page))
            .await
    }

    async fn get_operating_systems(&self) -> anyhow::Result<PageResponse<OperatingSystemCount>> {
        self.get_json("/system_profile/operating_system", &[]).await
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

/// Normalise the API key provided to the CLI.
pub(crate) fn parse_api_key(input: Option<String>) -> CliResult<Option<String>> {
    let Some(raw) = input else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation("API key cannot be an empty string"));
    }
    Ok(Some(trimmed.to_string()))
}

/// Classify an HTTP response into a CLI error.
pub(crate) async fn classify_problem(response: Response) -> CliError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).to_string();
    let problem = serde_json::from_slice::<ProblemDetails>(&bytes).ok();

    let message = problem
        .as_ref()
        .and_then(|p| p.detail.clone())
        .unwrap_or_else(|| {
            problem
                .as_ref()
                .map_or_else(|| body_text.trim().to_string(), |p| p.title.clone())
        });

    if matches!(
        status,
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    ) {
        CliError::validation(message)
    } else {
        let detail = if let Some(problem) = problem {
            format!("{} (status {})", message, problem.status)
        } else if !body_text.is_empty() {
            format!("{message} (status {status})")
        } else {
            format!("request failed with status {status}")
        };
        CliError::failure(anyhow!(detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use inventory_test_support::fixtures::{group, grouped_host, host, page};
    use serde_json::json;

    fn context_for(server: &MockServer) -> AppContext {
        AppContext {
            client: Client::new(),
            base_url: server.base_url().parse().expect("valid URL"),
            api_key: Some("secret".to_string()),
        }
    }

    #[tokio::test]
    async fn host_list_sends_normalized_query_and_key() {
        let server = MockServer::start_async().await;
        let body = page(vec![host("host-001"), host("host-002")], 2, 10, 12);
        let mock = server.mock(move |when, then| {
            when.method(GET)
                .path("/api/inventory/v1/hosts")
                .header(HEADER_API_KEY, "secret")
                .query_param("page", "2")
                .query_param("per_page", "10")
                .query_param("order_by", "updated")
                .query_param("order_how", "DESC");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!(body));
        });

        let params = NormalizedParams::default().with_page(2);
        let params = NormalizedParams {
            per_page: 10,
            ..params
        };
        let page = HostList(context_for(&server))
            .get_entities(&[], &params, false)
            .await
            .expect("host page");
        mock.assert();
        let ids: Vec<&str> = page.results.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, ["host-001", "host-002"]);
        assert_eq!(page.total, Some(12));
    }

    #[tokio::test]
    async fn host_list_merges_tags_when_requested() {
        let server = MockServer::start_async().await;
        let body = page(vec![host("host-001")], 1, 50, 1);
        server.mock(move |when, then| {
            when.method(GET).path("/api/inventory/v1/hosts");
            then.status(200).json_body(json!(body));
        });
        let tags = server.mock(|when, then| {
            when.method(GET).path("/api/inventory/v1/hosts/host-001/tags");
            then.status(200).json_body(json!({
                "results": { "host-001": [{ "namespace": "insights", "key": "env", "value": "prod" }] }
            }));
        });

        let page = HostList(context_for(&server))
            .get_entities(&[], &NormalizedParams::default(), true)
            .await
            .expect("host page");
        tags.assert();
        let row_tags = page.results[0].tags.clone().unwrap_or_default();
        assert_eq!(row_tags.len(), 1);
        assert_eq!(row_tags[0].key, "env");
    }

    #[tokio::test]
    async fn group_lookup_by_ids_joins_the_path() {
        let server = MockServer::start_async().await;
        let body = page(vec![group("g1", "alpha", 0), group("g2", "beta", 3)], 1, 50, 2);
        let mock = server.mock(move |when, then| {
            when.method(GET).path("/api/inventory/v1/groups/g1,g2");
            then.status(200).json_body(json!(body));
        });

        let ctx = context_for(&server);
        let groups = ctx
            .get_groups_by_ids(&["g1".to_string(), "g2".to_string()])
            .await
            .expect("groups");
        mock.assert();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].host_count, 3);
    }

    #[tokio::test]
    async fn add_hosts_posts_a_bare_id_list() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/inventory/v1/groups/g1/hosts")
                .json_body(json!(["host-001", "host-002"]));
            then.status(200).json_body(json!(grouped_host("host-001", "g1", "alpha")));
        });

        context_for(&server)
            .add_hosts("g1", &["host-001".to_string(), "host-002".to_string()])
            .await
            .expect("add hosts");
        mock.assert();
    }

    #[tokio::test]
    async fn unprocessable_entity_is_a_validation_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/inventory/v1/groups");
            then.status(422).json_body(json!({
                "type": "about:blank",
                "title": "Unprocessable",
                "status": 422,
                "detail": "Group name already exists"
            }));
        });

        let err = context_for(&server)
            .create_group(&GroupCreateRequest {
                name: "alpha".to_string(),
                host_ids: Vec::new(),
            })
            .await
            .expect_err("duplicate name");
        let err = CliError::from_source(err);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "Group name already exists");
    }

    #[tokio::test]
    async fn server_errors_are_failures_with_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/inventory/v1/tags");
            then.status(503).body("maintenance");
        });

        let err = context_for(&server)
            .get_tags(None, 1, 10)
            .await
            .expect_err("unavailable");
        let err = CliError::from_source(err);
        assert_eq!(err.exit_code(), 3);
        assert!(err.display_message().contains("maintenance"));
        assert!(err.display_message().contains("503"));
    }

    #[tokio::test]
    async fn host_patch_sends_only_the_edited_field() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/inventory/v1/hosts/host-001")
                .header(HEADER_API_KEY, "secret")
                .json_body(json!({ "display_name": "web-01" }));
            then.status(200);
        });

        let request = HostPatchRequest {
            display_name: Some("web-01".to_string()),
            ..HostPatchRequest::default()
        };
        context_for(&server)
            .patch_host("host-001", &request)
            .await
            .expect("patch");
        mock.assert();
    }

    #[tokio::test]
    async fn host_tags_page_carries_search_and_pagination() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/inventory/v1/hosts/host-001/tags")
                .query_param("page", "2")
                .query_param("per_page", "10")
                .query_param("search", "env");
            then.status(200).json_body(json!({
                "results": { "host-001": [{ "namespace": "insights", "key": "env", "value": "prod" }] },
                "page": 2,
                "per_page": 10,
                "total": 11
            }));
        });

        let response = context_for(&server)
            .get_host_tags("host-001", Some(" env "), 2, 10)
            .await
            .expect("host tags");
        mock.assert();
        assert_eq!(response.total, Some(11));
        assert_eq!(response.results["host-001"].len(), 1);
    }

    #[test]
    fn batch_errors_keep_the_inner_classification() {
        let err = CliError::from(BatchError::Chunk {
            chunk: 2,
            chunks: 3,
            source: CliError::validation("bad id").into(),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.display_message(),
            "batched fetch failed on chunk 2 of 3: bad id"
        );
    }

    #[test]
    fn api_key_is_trimmed_and_must_not_be_blank() {
        assert_eq!(
            parse_api_key(Some(" abc ".to_string())).ok().flatten(),
            Some("abc".to_string())
        );
        assert!(matches!(
            parse_api_key(Some("   ".to_string())),
            Err(CliError::Validation(_))
        ));
        assert!(matches!(parse_api_key(None), Ok(None)));
    }
}
