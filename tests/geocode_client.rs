use serde_json::json;
use weather_fx::data::geocode::{GeocodeClient, GeocodeError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, query_param},
};

#[tokio::test]
async fn search_sends_city_query_and_ranks_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("name", "Wrocław"))
        .and(query_param("count", "8"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "name": "Wrocławek",
                    "latitude": 52.1,
                    "longitude": 18.4,
                    "country": "Poland",
                    "population": 900000
                },
                {
                    "name": "Wrocław",
                    "latitude": 51.1079,
                    "longitude": 17.0385,
                    "country": "Poland",
                    "admin1": "Lower Silesia",
                    "population": 640000
                },
                { "name": "Wrocław", "country": "Poland" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeocodeClient::with_base_url(server.uri()).expect("client");
    let places = client.search("Wrocław").await.expect("places");

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].name, "Wrocław, Poland");
    assert!((places[0].latitude - 51.1079).abs() < 1e-9);
}

#[tokio::test]
async fn empty_results_resolve_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "generationtime_ms": 0.4 })))
        .mount(&server)
        .await;

    let client = GeocodeClient::with_base_url(server.uri()).expect("client");
    assert!(client.search("Nowhere").await.expect("search").is_empty());

    let err = client.resolve("Nowhere").await.expect_err("no match");
    assert!(matches!(&err, GeocodeError::NotFound(city) if city == "Nowhere"));
    assert_eq!(err.to_string(), "no place found for \"Nowhere\"");
}

#[tokio::test]
async fn server_error_is_reported_as_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = GeocodeClient::with_base_url(server.uri()).expect("client");
    let err = client.resolve("Poznań").await.expect_err("429 should fail");

    assert!(matches!(err, GeocodeError::Status(status) if status.as_u16() == 429));
}
