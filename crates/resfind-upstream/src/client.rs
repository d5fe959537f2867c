//! HTTP client for the upstream 211 resource-search API.
//!
//! Two calling conventions are in use. Taxonomy-code searches go out as a
//! `POST` with a JSON body that sets `keywordIsTaxonomyCode`; without that
//! flag the upstream silently keyword-matches the code and returns unrelated
//! services. Free-text searches use `GET` with `keywords`/`location` query
//! parameters. Both carry the API key in a configurable header and share one
//! request timeout. There are no retries: at most one call per search.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Client, Url};
use resfind_core::{AppConfig, SearchTerm};

use crate::error::UpstreamError;
use crate::types::{extract_results, RawResult, SearchBody, UpstreamLocation};

const DEFAULT_BASE_URL: &str = "https://api.211.org/resources/v2/search/";
const KEYWORD_ENDPOINT: &str = "keyword";

/// Connection and query settings for [`UpstreamClient`].
#[derive(Clone)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub api_key: String,
    pub api_key_header: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Sent as `distance` when a location is present.
    pub radius_miles: u32,
    pub location_mode: String,
}

impl UpstreamSettings {
    /// Production defaults with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_key_header: "Api-Key".to_string(),
            timeout_secs: 10,
            user_agent: "resfind/0.1 (resource-directory)".to_string(),
            radius_miles: 25,
            location_mode: "Within".to_string(),
        }
    }

    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.upstream_base_url.clone(),
            api_key: config.upstream_api_key.clone(),
            api_key_header: config.upstream_api_key_header.clone(),
            timeout_secs: config.upstream_timeout_secs,
            user_agent: config.upstream_user_agent.clone(),
            radius_miles: config.search_radius_miles,
            location_mode: config.location_mode.clone(),
        }
    }

    /// Points the client at a different base URL (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

impl std::fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("api_key_header", &self.api_key_header)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("radius_miles", &self.radius_miles)
            .field("location_mode", &self.location_mode)
            .finish()
    }
}

/// Client for the upstream resource-search endpoint.
///
/// Cheap to share behind an `Arc`; holds no per-request state.
pub struct UpstreamClient {
    client: Client,
    endpoint: Url,
    timeout_secs: u64,
    radius_miles: u32,
    location_mode: String,
}

impl UpstreamClient {
    /// Builds a client from the given settings.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`UpstreamError::InvalidHeader`] if the API key header name or value
    ///   is not a legal HTTP header.
    /// - [`UpstreamError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(settings: &UpstreamSettings) -> Result<Self, UpstreamError> {
        let header_error = |reason: String| UpstreamError::InvalidHeader {
            name: settings.api_key_header.clone(),
            reason,
        };
        let header_name = HeaderName::from_bytes(settings.api_key_header.trim().as_bytes())
            .map_err(|e| header_error(e.to_string()))?;
        let mut header_value =
            HeaderValue::from_str(&settings.api_key).map_err(|e| header_error(e.to_string()))?;
        header_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header_name, header_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.timeout_secs.min(10)))
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joining the endpoint appends a segment instead of replacing the last one.
        let normalised = format!("{}/", settings.base_url.trim().trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(KEYWORD_ENDPOINT))
            .map_err(|e| UpstreamError::InvalidBaseUrl {
                url: settings.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            timeout_secs: settings.timeout_secs,
            radius_miles: settings.radius_miles,
            location_mode: settings.location_mode.clone(),
        })
    }

    /// Searches the upstream for `term`, optionally filtered by location.
    ///
    /// A successful response with no records returns an empty list.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Timeout`] when the request exceeds the timeout.
    /// - [`UpstreamError::Http`] on network failure.
    /// - [`UpstreamError::UnexpectedStatus`] on any non-2xx status.
    /// - [`UpstreamError::Deserialize`] / [`UpstreamError::UnexpectedShape`]
    ///   if the body is not a usable JSON document.
    pub async fn search(
        &self,
        term: &SearchTerm,
        location: Option<&UpstreamLocation>,
    ) -> Result<Vec<RawResult>, UpstreamError> {
        let request = match term {
            SearchTerm::TaxonomyCode(code) => self.post_request(code, location),
            SearchTerm::Keyword(keyword) => self.get_request(keyword, location),
        };

        tracing::debug!(
            term = term.as_str(),
            is_code = term.is_code(),
            location = location.map(UpstreamLocation::to_param),
            "querying upstream resource search"
        );

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let context = format!("search(term={term})");
        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        let results = extract_results(json, &context)?;
        tracing::debug!(term = term.as_str(), count = results.len(), "upstream search returned");
        Ok(results)
    }

    /// Endpoint URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn post_request(
        &self,
        code: &str,
        location: Option<&UpstreamLocation>,
    ) -> reqwest::RequestBuilder {
        let body = self.search_body(code, true, location);
        self.client.post(self.endpoint.clone()).json(&body)
    }

    fn get_request(
        &self,
        keyword: &str,
        location: Option<&UpstreamLocation>,
    ) -> reqwest::RequestBuilder {
        self.client.get(self.keyword_url(keyword, location))
    }

    fn search_body<'a>(
        &'a self,
        term: &'a str,
        is_code: bool,
        location: Option<&UpstreamLocation>,
    ) -> SearchBody<'a> {
        let location = location.map(UpstreamLocation::to_param);
        let spatial = location.is_some();
        SearchBody {
            search: term,
            input: term,
            location,
            distance: spatial.then_some(self.radius_miles),
            location_mode: spatial.then_some(self.location_mode.as_str()),
            keyword_is_taxonomy_code: is_code,
        }
    }

    /// Builds the GET URL with properly percent-encoded query parameters.
    /// The `location` parameter is omitted entirely for a global search.
    fn keyword_url(&self, keyword: &str, location: Option<&UpstreamLocation>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("keywords", keyword);
            if let Some(location) = location {
                pairs.append_pair("location", &location.to_param());
            }
        }
        url
    }

    fn map_send_error(&self, error: reqwest::Error) -> UpstreamError {
        if error.is_timeout() {
            UpstreamError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            UpstreamError::Http(error)
        }
    }
}
