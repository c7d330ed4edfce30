use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::place::{NearbySearchPage, NearbySearchRequest, PlaceDetails, PlaceSummary};

const DETAIL_FIELDS: &str = "website";

#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn nearby_search(&self, request: &NearbySearchRequest)
        -> anyhow::Result<NearbySearchPage>;

    async fn place_details(&self, place_id: &str) -> anyhow::Result<PlaceDetails>;
}

pub struct PlacesClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Serialize)]
struct NearbySearchQuery<'a> {
    key: &'a str,
    location: String,
    radius: u32,
    #[serde(rename = "type")]
    place_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagetoken: Option<&'a str>,
}

#[derive(Serialize)]
struct DetailsQuery<'a> {
    key: &'a str,
    place_id: &'a str,
    fields: &'a str,
}

#[derive(Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<PlaceSummary>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<PlaceDetails>,
}

fn check_status(status: &str, error_message: Option<String>) -> anyhow::Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => match error_message {
            Some(message) => bail!("Places API returned {}: {}", other, message),
            None => bail!("Places API returned {}", other),
        },
    }
}

impl PlacesClient {
    pub fn new(api_key: String, base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build Places http client")?;

        Ok(PlacesClient {
            client,
            api_key,
            base_url: parse_base_url(base_url)?,
        })
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("Invalid Places endpoint: {}", path))
    }
}

/// Ensures a trailing slash so `Url::join` appends instead of replacing the last segment.
pub(crate) fn parse_base_url(base_url: &str) -> anyhow::Result<Url> {
    let normalized = match base_url.ends_with('/') {
        true => base_url.to_string(),
        false => format!("{}/", base_url),
    };
    Url::parse(&normalized).map_err(|e| anyhow!("Invalid base url {}: {}", base_url, e))
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
    ) -> anyhow::Result<NearbySearchPage> {
        let query = NearbySearchQuery {
            key: &self.api_key,
            location: request.area.center.to_query_value(),
            radius: request.area.radius_meters,
            place_type: &request.place_type,
            pagetoken: request.page_token.as_deref(),
        };

        let response = self
            .client
            .get(self.endpoint("nearbysearch/json")?)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<NearbySearchResponse>()
            .await
            .context("Failed to deserialize nearby search response")?;

        check_status(&response.status, response.error_message)?;

        Ok(NearbySearchPage {
            results: response.results,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn place_details(&self, place_id: &str) -> anyhow::Result<PlaceDetails> {
        let query = DetailsQuery {
            key: &self.api_key,
            place_id,
            fields: DETAIL_FIELDS,
        };

        let response = self
            .client
            .get(self.endpoint("details/json")?)
            .query(&query)
            .send()
            .await?
            .error_for_status()?
            .json::<DetailsResponse>()
            .await
            .context("Failed to deserialize place details response")?;

        check_status(&response.status, response.error_message)?;

        Ok(response.result.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{method, path, query_param, query_param_is_missing},
        Mock, MockServer, ResponseTemplate,
    };

    use crate::domain::place::{Coordinates, NearbySearchRequest, SearchArea};

    use super::{parse_base_url, PlaceSearch, PlacesClient};

    fn request(page_token: Option<&str>) -> NearbySearchRequest {
        NearbySearchRequest {
            area: SearchArea {
                center: Coordinates {
                    latitude: 50.15,
                    longitude: -5.07,
                },
                radius_meters: 1000,
            },
            place_type: "bakery".to_string(),
            page_token: page_token.map(str::to_string),
        }
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:1234/maps/api/place").unwrap();
        assert_eq!(
            url.join("details/json").unwrap().as_str(),
            "http://localhost:1234/maps/api/place/details/json"
        );
    }

    #[tokio::test]
    async fn nearby_search_sends_query_and_reads_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("key", "test-key"))
            .and(query_param("location", "50.15,-5.07"))
            .and(query_param("radius", "1000"))
            .and(query_param("type", "bakery"))
            .and(query_param_is_missing("pagetoken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "results": [
                    {
                        "place_id": "p1",
                        "name": "Rowe's",
                        "vicinity": "Fore St, Truro",
                        "types": ["bakery", "food"]
                    },
                    { "place_id": "p2", "name": "Warrens" }
                ],
                "next_page_token": "token-a"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlacesClient::new("test-key".to_string(), &server.uri()).unwrap();
        let page = client.nearby_search(&request(None)).await.unwrap();

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].address(), "Fore St, Truro");
        assert!(page.results[1].types.is_empty());
        assert_eq!(page.next_page_token.as_deref(), Some("token-a"));
    }

    #[tokio::test]
    async fn empty_token_and_zero_results_end_the_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .and(query_param("pagetoken", "token-a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "ZERO_RESULTS",
                "results": [],
                "next_page_token": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlacesClient::new("test-key".to_string(), &server.uri()).unwrap();
        let page = client.nearby_search(&request(Some("token-a"))).await.unwrap();

        assert!(page.results.is_empty());
        assert_eq!(page.next_page_token, None);
    }

    #[tokio::test]
    async fn provider_error_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nearbysearch/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "REQUEST_DENIED",
                "error_message": "The provided API key is invalid.",
                "results": []
            })))
            .mount(&server)
            .await;

        let client = PlacesClient::new("bad-key".to_string(), &server.uri()).unwrap();
        let err = client.nearby_search(&request(None)).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Places API returned REQUEST_DENIED: The provided API key is invalid."
        );
    }

    #[tokio::test]
    async fn place_details_reads_website() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .and(query_param("place_id", "p1"))
            .and(query_param("fields", "website"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "OK",
                "result": { "website": "https://rowesbakers.co.uk/" }
            })))
            .mount(&server)
            .await;

        let client = PlacesClient::new("test-key".to_string(), &server.uri()).unwrap();
        let details = client.place_details("p1").await.unwrap();

        assert_eq!(details.website(), Some("https://rowesbakers.co.uk/"));
    }

    #[tokio::test]
    async fn place_details_http_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details/json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PlacesClient::new("test-key".to_string(), &server.uri()).unwrap();
        assert!(client.place_details("p1").await.is_err());
    }
}
