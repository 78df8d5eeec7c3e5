//! Tests the informational root view of the service.
#![cfg(test)]

use crate::{gazette_test, TestingTools};
use anyhow::Result;
use reqwest::{header::HeaderValue, StatusCode};

#[actix_rt::test]
async fn root_of_service_provides_public_docs() -> Result<()> {
    gazette_test(
        |settings| settings.public_documentation = Some("https://example.com/".to_string()),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(
                response.headers().get("location"),
                Some(&HeaderValue::from_static("https://example.com/"))
            );

            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn root_of_service_has_a_fallback_message() -> Result<()> {
    gazette_test(
        |settings| settings.public_documentation = None,
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.text().await?,
                "Gazette is a relay service in front of the NewsAPI article search API."
            );

            Ok(())
        },
    )
    .await
}
