//! The types exchanged with the news provider.

use serde::{Deserialize, Serialize};

/// A search to forward to the news provider.
///
/// Optional fields are sent to the provider only when they are `Some`. An
/// explicitly empty string still counts as provided and is forwarded as-is.
/// Date strings and query length are not validated here; the provider decides
/// what it accepts.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    /// The text to search for. May be empty.
    pub query: String,

    /// Which article fields to match the query against, such as
    /// "title,description".
    pub search_in: Option<String>,

    /// Oldest publication date to include, as a date string.
    pub from_date: Option<String>,

    /// Newest publication date to include, as a date string.
    pub to_date: Option<String>,

    /// Language to restrict articles to.
    pub language: String,

    /// Ordering of the returned articles.
    pub sort_by: String,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            search_in: None,
            from_date: None,
            to_date: None,
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
        }
    }
}

/// A successful response from the news provider, reduced to the fields
/// Gazette relays.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NewsResponse {
    /// How many articles matched in total, across all pages.
    #[serde(rename = "totalResults")]
    pub total_results: u64,

    /// The matching articles, in the provider's order.
    pub articles: Vec<Article>,
}

/// One article, projected through a fixed allowlist of fields.
///
/// Every field the provider may omit deserializes to `None` and serializes
/// back as an explicit `null`. Fields outside the allowlist are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Article {
    /// Where the article was published.
    pub source: ArticleSource,

    /// The article's author.
    pub author: Option<String>,

    /// The article's headline.
    pub title: Option<String>,

    /// A snippet or summary of the article.
    pub description: Option<String>,

    /// Link to the article itself.
    pub url: Option<String>,

    /// Link to a representative image.
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,

    /// When the article was published, as reported by the provider.
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,

    /// The unformatted article content, truncated by the provider.
    pub content: Option<String>,
}

/// The publication an [`Article`] came from. The provider also reports an
/// `id` here, which Gazette does not relay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ArticleSource {
    /// Display name of the publication.
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{Article, NewsResponse};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn articles_drop_fields_outside_the_allowlist() {
        let article: Article = serde_json::from_value(json!({
            "source": {"id": "the-example", "name": "The Example"},
            "author": "A. Writer",
            "title": "An example headline",
            "description": "Some description",
            "url": "https://example.com/story",
            "urlToImage": "https://example.com/story.jpg",
            "publishedAt": "2021-11-30T12:00:00Z",
            "content": "Example content...",
            "sentiment": 0.25
        }))
        .expect("article should deserialize");

        assert_eq!(
            serde_json::to_value(&article).unwrap(),
            json!({
                "source": {"name": "The Example"},
                "author": "A. Writer",
                "title": "An example headline",
                "description": "Some description",
                "url": "https://example.com/story",
                "urlToImage": "https://example.com/story.jpg",
                "publishedAt": "2021-11-30T12:00:00Z",
                "content": "Example content..."
            })
        );
    }

    #[test]
    fn missing_article_fields_become_null() {
        let article: Article = serde_json::from_value(json!({})).expect("article should deserialize");

        assert_eq!(
            serde_json::to_value(&article).unwrap(),
            json!({
                "source": {"name": null},
                "author": null,
                "title": null,
                "description": null,
                "url": null,
                "urlToImage": null,
                "publishedAt": null,
                "content": null
            })
        );
    }

    #[test]
    fn total_results_defaults_to_zero() {
        let response: NewsResponse =
            serde_json::from_value(json!({"articles": []})).expect("response should deserialize");
        assert_eq!(response.total_results, 0);
        assert!(response.articles.is_empty());
    }

    #[test]
    fn article_order_is_preserved() {
        let response: NewsResponse = serde_json::from_value(json!({
            "totalResults": 2,
            "articles": [
                {"title": "first"},
                {"title": "second"}
            ]
        }))
        .expect("response should deserialize");

        let titles: Vec<_> = response
            .articles
            .iter()
            .map(|a| a.title.as_deref())
            .collect();
        assert_eq!(titles, vec![Some("first"), Some("second")]);
    }
}
