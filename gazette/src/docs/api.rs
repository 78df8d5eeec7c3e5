/*!
# Gazette API documentation

This page describes the API endpoints available on Gazette.

## Search relay

Endpoint: `POST /`

The primary endpoint of the service. It forwards a search to the configured
news provider and returns the matching articles in a fixed shape.

### Headers

- `X-API-KEY` - Required. The relay's shared secret. Requests without it, or
  with a key that does not match the configured one exactly, are rejected
  before any upstream call is made.

### Request body

A JSON object. Every field is optional.

- `q` - The text to search for. Defaults to the empty string.
- `searchIn` - Which article fields to match against, such as
  `"title,description"`. Omitted from the upstream request unless provided.
- `from` - Oldest publication date to include. Passed through to the provider
  verbatim, without validation. Omitted unless provided.
- `to` - Newest publication date to include. Same handling as `from`.
- `language` - Language to restrict articles to. Defaults to `"en"`.
- `sortBy` - Ordering of the returned articles. Defaults to `"publishedAt"`.

### Response

On success, HTTP 200 with a JSON object:

- `status` - Always `"ok"`.
- `totalResults` - Total number of matches reported by the provider.
- `articles` - The matching articles, in the provider's order. Each article
  has `source` (an object with a nullable `name`), and nullable `author`,
  `title`, `description`, `url`, `urlToImage`, `publishedAt`, and `content`
  fields. Fields the provider did not supply are `null`.

On failure, a JSON object with `status` set to `"error"` and a `message`:

- HTTP 401 with message `"Unauthorized"` when the API key is missing or wrong.
- The provider's own status code and message when the upstream search fails.
- HTTP 500 with a description for anything else, including malformed request
  bodies.

## Operational endpoints

The service also exposes the endpoints required by
[Dockerflow](https://github.com/mozilla-services/Dockerflow):
`/__lbheartbeat__`, `/__heartbeat__`, `/__version__`, and `/__error__`, plus
a `GET /` info view that redirects to the configured documentation page when
one is set.
*/
