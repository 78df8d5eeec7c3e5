//! Web handler for the news search relay.

use crate::{errors::HandlerError, extractors::ApiKey};
use actix_web::{
    web::{self, Data},
    HttpResponse,
};
use cadence::{Histogrammed, StatsdClient};
use gazette_newsapi::{Article, NewsApiClient, SearchError, SearchQuery};
use gazette_settings::Settings;
use serde::{Deserialize, Serialize};

/// Relay a search to the news provider.
#[tracing::instrument(skip(_auth, body, news_client, metrics_client, settings))]
pub async fn search(
    _auth: ApiKey,
    body: web::Bytes,
    news_client: Data<NewsApiClient>,
    metrics_client: Data<StatsdClient>,
    settings: Data<Settings>,
) -> Result<HttpResponse, HandlerError> {
    // The body is read manually instead of with `web::Json` so that malformed
    // input renders the error envelope rather than the framework's default
    // response.
    let body: SearchBody = serde_json::from_slice(&body)
        .map_err(|error| HandlerError::Internal(format!("Invalid request body: {}", error)))?;

    safe_log_request(settings.log_full_request, &body);

    let query = SearchQuery {
        query: body.q,
        search_in: body.search_in,
        from_date: body.from,
        to_date: body.to,
        language: body.language,
        sort_by: body.sort_by,
    };

    let response = news_client.search(&query).await.map_err(|error| match error {
        SearchError::Upstream { status, message } => {
            tracing::warn!(
                %status,
                r#type = "web.search.upstream-error",
                "News provider returned an error"
            );
            HandlerError::Upstream {
                status: status.as_u16(),
                message,
            }
        }
        error => {
            tracing::error!(%error, r#type = "web.search.error", "Error relaying search");
            HandlerError::Internal(error.to_string())
        }
    })?;

    tracing::debug!(
        r#type = "web.search.provided-count",
        article_count = response.articles.len(),
        "Relaying articles"
    );
    metrics_client
        .histogram("request.articles-per", response.articles.len() as u64)
        .ok();

    Ok(HttpResponse::Ok().json(SearchResponse {
        status: "ok",
        total_results: response.total_results,
        articles: &response.articles,
    }))
}

/// The request body callers send.
///
/// Every field is optional; omitted fields take the documented defaults
/// during deserialization. Date strings are not validated, and pass through
/// to the provider verbatim.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchBody {
    /// The text to search for. Defaults to the empty string, which the
    /// provider treats as an unrestricted search.
    q: String,

    /// Which article fields to match against.
    #[serde(rename = "searchIn")]
    search_in: Option<String>,

    /// Oldest publication date to include.
    from: Option<String>,

    /// Newest publication date to include.
    to: Option<String>,

    /// Language to restrict articles to.
    language: String,

    /// Ordering of the returned articles.
    #[serde(rename = "sortBy")]
    sort_by: String,
}

impl Default for SearchBody {
    fn default() -> Self {
        Self {
            q: String::new(),
            search_in: None,
            from: None,
            to: None,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
        }
    }
}

/// The response the API generates.
#[derive(Debug, Serialize)]
struct SearchResponse<'a> {
    /// Fixed marker distinguishing success envelopes from error envelopes.
    status: &'static str,

    /// Total number of matches reported by the provider.
    #[serde(rename = "totalResults")]
    total_results: u64,

    /// The projected articles, in the provider's order.
    articles: &'a [Article],
}

/// Log a search request, respecting the log_full_request setting passed. The
/// query is the caller's own input, so it is redacted by default.
fn safe_log_request(log_query: bool, body: &SearchBody) {
    let query = if log_query { body.q.as_str() } else { "" };

    tracing::info!(
        r#type = "web.search.request",
        sensitive = true,
        %query,
        search_in = body.search_in.as_deref(),
        from = body.from.as_deref(),
        to = body.to.as_deref(),
        language = %body.language,
        sort_by = %body.sort_by,
        "handling search request"
    );
}

#[cfg(test)]
mod tests {
    use super::SearchBody;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_bodies_take_all_defaults() {
        let body: SearchBody = serde_json::from_value(json!({})).expect("should deserialize");
        assert_eq!(body.q, "");
        assert_eq!(body.search_in, None);
        assert_eq!(body.from, None);
        assert_eq!(body.to, None);
        assert_eq!(body.language, "en");
        assert_eq!(body.sort_by, "publishedAt");
    }

    #[test]
    fn provided_fields_are_kept() {
        let body: SearchBody = serde_json::from_value(json!({
            "q": "mozilla",
            "searchIn": "title",
            "from": "2021-11-01",
            "to": "2021-11-30",
            "language": "de",
            "sortBy": "relevancy"
        }))
        .expect("should deserialize");

        assert_eq!(body.q, "mozilla");
        assert_eq!(body.search_in.as_deref(), Some("title"));
        assert_eq!(body.from.as_deref(), Some("2021-11-01"));
        assert_eq!(body.to.as_deref(), Some("2021-11-30"));
        assert_eq!(body.language, "de");
        assert_eq!(body.sort_by, "relevancy");
    }

    #[test]
    fn empty_strings_are_provided_values() {
        let body: SearchBody =
            serde_json::from_value(json!({"searchIn": ""})).expect("should deserialize");
        assert_eq!(body.search_in.as_deref(), Some(""));
    }

    #[test]
    fn null_optional_fields_count_as_absent() {
        let body: SearchBody =
            serde_json::from_value(json!({"searchIn": null, "from": null})).expect("should deserialize");
        assert_eq!(body.search_in, None);
        assert_eq!(body.from, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let body: SearchBody = serde_json::from_value(json!({"q": "news", "pageSize": 20}))
            .expect("should deserialize");
        assert_eq!(body.q, "news");
    }
}
