//! Tests Gazette's ability to relay searches to the news provider.
#![cfg(test)]

use crate::{gazette_test, TestingTools};
use anyhow::Result;
use httpmock::Method::GET;
use reqwest::StatusCode;
use serde_json::json;

/// The relay API key configured in `config/test.yaml`.
const RELAY_KEY: &str = "test-relay-key";

/// The provider API key configured in `config/test.yaml`.
const UPSTREAM_KEY: &str = "test-upstream-key";

#[actix_rt::test]
async fn search_rejects_requests_without_an_api_key() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            let upstream = newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .json(&json!({"q": "firefox"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(body, json!({"status": "error", "message": "Unauthorized"}));

            // No upstream call may be made for unauthenticated callers.
            upstream.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_rejects_requests_with_a_wrong_api_key() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            let upstream = newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", "not-the-relay-key")
                .json(&json!({"q": "firefox"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(body, json!({"status": "error", "message": "Unauthorized"}));
            upstream.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_applies_defaults_and_omits_absent_parameters() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            let upstream = newsapi_mock.mock(|when, then| {
                when.method(GET)
                    .path("/v2/everything")
                    .query_param("q", "")
                    .query_param("language", "en")
                    .query_param("sortBy", "publishedAt")
                    .query_param("apiKey", UPSTREAM_KEY)
                    .matches(|req| {
                        // Optional parameters must be left out, not sent
                        // empty.
                        req.query_params.as_ref().map_or(true, |params| {
                            params
                                .iter()
                                .all(|(key, _)| key != "searchIn" && key != "from" && key != "to")
                        })
                    });
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(
                body,
                json!({"status": "ok", "totalResults": 0, "articles": []})
            );
            upstream.assert();

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_forwards_all_provided_parameters() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            let upstream = newsapi_mock.mock(|when, then| {
                when.method(GET)
                    .path("/v2/everything")
                    .query_param("q", "mozilla")
                    .query_param("searchIn", "title")
                    .query_param("from", "2021-11-01")
                    .query_param("to", "2021-11-30")
                    .query_param("language", "de")
                    .query_param("sortBy", "relevancy")
                    .query_param("apiKey", UPSTREAM_KEY);
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({
                    "q": "mozilla",
                    "searchIn": "title",
                    "from": "2021-11-01",
                    "to": "2021-11-30",
                    "language": "de",
                    "sortBy": "relevancy"
                }))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            upstream.assert();

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_projects_articles_through_the_allowlist() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "totalResults": 2,
                    "articles": [
                        {
                            "source": {"id": "the-example", "name": "The Example"},
                            "author": "A. Writer",
                            "title": "An example headline",
                            "description": "Some description",
                            "url": "https://example.com/story",
                            "urlToImage": "https://example.com/story.jpg",
                            "publishedAt": "2021-11-30T12:00:00Z",
                            "content": "Example content...",
                            "sentiment": 0.25
                        },
                        {
                            "title": "A sparse article"
                        }
                    ]
                }));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({"q": "example"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(
                body,
                json!({
                    "status": "ok",
                    "totalResults": 2,
                    "articles": [
                        {
                            "source": {"name": "The Example"},
                            "author": "A. Writer",
                            "title": "An example headline",
                            "description": "Some description",
                            "url": "https://example.com/story",
                            "urlToImage": "https://example.com/story.jpg",
                            "publishedAt": "2021-11-30T12:00:00Z",
                            "content": "Example content..."
                        },
                        {
                            "source": {"name": null},
                            "author": null,
                            "title": "A sparse article",
                            "description": null,
                            "url": null,
                            "urlToImage": null,
                            "publishedAt": null,
                            "content": null
                        }
                    ]
                })
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_passes_through_upstream_errors() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(429).json_body(json!({
                    "status": "error",
                    "code": "rateLimited",
                    "message": "Rate limit exceeded"
                }));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({"q": "firefox"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(
                body,
                json!({"status": "error", "message": "Rate limit exceeded"})
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_falls_back_when_upstream_errors_are_unparsable() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(500).body("gateway exploded");
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({"q": "firefox"}))
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(
                body,
                json!({"status": "error", "message": "Unknown error"})
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_rejects_malformed_bodies_with_the_error_envelope() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             ..
         }| async move {
            let upstream = newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .header("Content-Type", "application/json")
                .body("this is not json")
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: serde_json::Value = response.json().await?;
            assert_eq!(body["status"], json!("error"));
            assert!(body["message"]
                .as_str()
                .expect("message should be a string")
                .starts_with("Invalid request body"));
            upstream.assert_hits(0);

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_emits_request_metrics() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             mut metrics_watcher,
             ..
         }| async move {
            newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "totalResults": 1,
                    "articles": [{"title": "one article"}]
                }));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({"q": "firefox"}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            assert!(metrics_watcher.has_histogram("request.articles-per", 1.0));
            assert!(metrics_watcher.has_timer("request.duration"));

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_logs_requests_with_queries_redacted() -> Result<()> {
    gazette_test(
        |_| (),
        |TestingTools {
             test_client,
             newsapi_mock,
             mut log_watcher,
             ..
         }| async move {
            newsapi_mock.mock(|when, then| {
                when.method(GET).path("/v2/everything");
                then.status(200)
                    .json_body(json!({"status": "ok", "totalResults": 0, "articles": []}));
            });

            let response = test_client
                .post("/")
                .header("X-API-KEY", RELAY_KEY)
                .json(&json!({"q": "a-sensitive-query"}))
                .send()
                .await?;
            assert_eq!(response.status(), StatusCode::OK);

            assert!(log_watcher.has(|event| {
                event.field_contains("message", "handling search request")
            }));
            assert!(!log_watcher.has(|event| {
                event.field_contains("query", "a-sensitive-query")
            }));

            Ok(())
        },
    )
    .await
}
