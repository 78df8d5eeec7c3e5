//! A client for the news provider's search endpoint.

use crate::{
    domain::{NewsResponse, SearchQuery},
    errors::{SearchError, SetupError},
};
use anyhow::Context;
use gazette_settings::Settings;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

/// The path of the provider's search endpoint, relative to the configured
/// server URL.
const SEARCH_PATH: &str = "v2/everything";

/// Fallback used when an error response from the provider carries no usable
/// message.
const UNKNOWN_ERROR: &str = "Unknown error";

/// A client for one news search server.
///
/// Holds no per-request state; one instance is shared by all requests for the
/// lifetime of the process.
pub struct NewsApiClient {
    /// Server base URL.
    server_url: Url,

    /// Credential sent to the provider as the `apiKey` query parameter.
    api_key: String,

    /// The client that will be used to make http requests.
    reqwest_client: reqwest::Client,
}

impl NewsApiClient {
    /// Make a new client targeting `server_url`, with a bounded per-request
    /// timeout.
    pub fn new(server_url: &str, api_key: String, timeout: Duration) -> Result<Self, SetupError> {
        let server_url_parsed = Url::parse(server_url)
            .context(format!("Building news server URL: {}", server_url))
            .map_err(SetupError::InvalidConfiguration)?;

        let reqwest_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Building news provider HTTP client")
            .map_err(SetupError::InvalidConfiguration)?;

        Ok(Self {
            server_url: server_url_parsed,
            api_key,
            reqwest_client,
        })
    }

    /// Make a new client from the `newsapi` section of the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SetupError> {
        Self::new(
            &settings.newsapi.server,
            settings.newsapi.api_key.clone(),
            settings.newsapi.timeout,
        )
    }

    /// Forward one search to the provider and parse the result.
    ///
    /// Issues exactly one GET request. Non-success statuses become
    /// [`SearchError::Upstream`], carrying the provider's status code and the
    /// `message` field from its body (or a fallback when the body is
    /// unparsable). Timeouts surface as [`SearchError::Network`].
    pub async fn search(&self, query: &SearchQuery) -> Result<NewsResponse, SearchError> {
        let mut url = self
            .server_url
            .join(SEARCH_PATH)
            .context("Building search URL")
            .map_err(SearchError::Internal)?;

        url.query_pairs_mut().extend_pairs(&[
            ("q", query.query.as_str()),
            ("language", query.language.as_str()),
            ("sortBy", query.sort_by.as_str()),
            ("apiKey", self.api_key.as_str()),
        ]);

        // Optional parameters are left out entirely when the caller did not
        // provide them, never sent as empty or null. `Some("")` was provided,
        // and is forwarded.
        if let Some(search_in) = &query.search_in {
            url.query_pairs_mut().append_pair("searchIn", search_in);
        }
        if let Some(from_date) = &query.from_date {
            url.query_pairs_mut().append_pair("from", from_date);
        }
        if let Some(to_date) = &query.to_date {
            url.query_pairs_mut().append_pair("to", to_date);
        }

        // The URL carries the provider credential, so it is not logged.
        tracing::debug!(r#type = "newsapi.search", "forwarding search to the news provider");

        let response = self
            .reqwest_client
            .get(url)
            .send()
            .await
            .context("Sending search request to the news provider")
            .map_err(SearchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            return Err(SearchError::Upstream { status, message });
        }

        response
            .json()
            .await
            .context("Parsing search response")
            .map_err(SearchError::Format)
    }
}

/// The body the provider returns alongside error statuses.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    /// The provider's explanation of the error.
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::NewsApiClient;
    use crate::{domain::SearchQuery, errors::SearchError};
    use httpmock::{Method::GET, MockServer};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    /// A client pointed at the given mock server.
    fn test_client(mock_server: &MockServer) -> NewsApiClient {
        NewsApiClient::new(
            &mock_server.base_url(),
            "upstream-key".to_string(),
            Duration::from_secs(5),
        )
        .expect("could not build client")
    }

    #[actix_rt::test]
    async fn test_search_makes_expected_call() -> anyhow::Result<()> {
        let mock_server = MockServer::start();

        let search_mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("q", "firefox")
                .query_param("language", "en")
                .query_param("sortBy", "publishedAt")
                .query_param("apiKey", "upstream-key");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        });

        let client = test_client(&mock_server);
        let response = client
            .search(&SearchQuery {
                query: "firefox".to_string(),
                ..SearchQuery::default()
            })
            .await?;

        search_mock.assert();
        assert_eq!(response.total_results, 0);
        assert!(response.articles.is_empty());

        Ok(())
    }

    #[actix_rt::test]
    async fn test_optional_parameters_are_omitted_when_absent() -> anyhow::Result<()> {
        let mock_server = MockServer::start();

        let search_mock = mock_server.mock(|when, then| {
            when.method(GET).path("/v2/everything").matches(|req| {
                req.query_params.as_ref().map_or(true, |params| {
                    params
                        .iter()
                        .all(|(key, _)| key != "searchIn" && key != "from" && key != "to")
                })
            });
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        });

        let client = test_client(&mock_server);
        client.search(&SearchQuery::default()).await?;

        search_mock.assert();
        Ok(())
    }

    #[actix_rt::test]
    async fn test_optional_parameters_are_forwarded_when_present() -> anyhow::Result<()> {
        let mock_server = MockServer::start();

        let search_mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("q", "rust")
                .query_param("searchIn", "title")
                .query_param("from", "2021-11-01")
                .query_param("to", "2021-11-30");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        });

        let client = test_client(&mock_server);
        client
            .search(&SearchQuery {
                query: "rust".to_string(),
                search_in: Some("title".to_string()),
                from_date: Some("2021-11-01".to_string()),
                to_date: Some("2021-11-30".to_string()),
                ..SearchQuery::default()
            })
            .await?;

        search_mock.assert();
        Ok(())
    }

    #[actix_rt::test]
    async fn test_empty_optional_parameters_still_count_as_provided() -> anyhow::Result<()> {
        let mock_server = MockServer::start();

        let search_mock = mock_server.mock(|when, then| {
            when.method(GET)
                .path("/v2/everything")
                .query_param("searchIn", "");
            then.status(200)
                .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
        });

        let client = test_client(&mock_server);
        client
            .search(&SearchQuery {
                search_in: Some(String::new()),
                ..SearchQuery::default()
            })
            .await?;

        search_mock.assert();
        Ok(())
    }

    #[actix_rt::test]
    async fn test_upstream_errors_carry_status_and_message() {
        let mock_server = MockServer::start();

        mock_server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(429).json_body(json!({
                "status": "error",
                "code": "rateLimited",
                "message": "Rate limit exceeded"
            }));
        });

        let client = test_client(&mock_server);
        let error = client
            .search(&SearchQuery::default())
            .await
            .expect_err("upstream error should fail the search");

        match error {
            SearchError::Upstream { status, message } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("expected an upstream error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_unparsable_error_bodies_fall_back_to_a_generic_message() {
        let mock_server = MockServer::start();

        mock_server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(500).body("not json");
        });

        let client = test_client(&mock_server);
        let error = client
            .search(&SearchQuery::default())
            .await
            .expect_err("upstream error should fail the search");

        match error {
            SearchError::Upstream { status, message } => {
                assert_eq!(status.as_u16(), 500);
                assert_eq!(message, "Unknown error");
            }
            other => panic!("expected an upstream error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_malformed_success_bodies_are_format_errors() {
        let mock_server = MockServer::start();

        mock_server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(200).body("not json");
        });

        let client = test_client(&mock_server);
        let error = client
            .search(&SearchQuery::default())
            .await
            .expect_err("malformed body should fail the search");

        assert!(matches!(error, SearchError::Format(_)));
    }

    #[actix_rt::test]
    async fn test_articles_are_projected_in_order() -> anyhow::Result<()> {
        let mock_server = MockServer::start();

        mock_server.mock(|when, then| {
            when.method(GET).path("/v2/everything");
            then.status(200).json_body(json!({
                "status": "ok",
                "totalResults": 2,
                "articles": [
                    {
                        "source": {"id": "first-source", "name": "First"},
                        "title": "First headline",
                        "unexpected": {"nested": true}
                    },
                    {
                        "source": {"name": "Second"},
                        "title": "Second headline"
                    }
                ]
            }));
        });

        let client = test_client(&mock_server);
        let response = client.search(&SearchQuery::default()).await?;

        assert_eq!(response.total_results, 2);
        let titles: Vec<_> = response
            .articles
            .iter()
            .map(|a| a.title.as_deref())
            .collect();
        assert_eq!(titles, vec![Some("First headline"), Some("Second headline")]);

        Ok(())
    }
}
