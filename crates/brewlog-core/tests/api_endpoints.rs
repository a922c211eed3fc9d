//! Resource endpoints of the gateway against a mock backend.

use brewlog_core::models::{BrewingUpdate, NewBrewing, NewCoffeeBrand, RatingScores};
use brewlog_core::{ApiClient, ApiError, SessionHandle};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn brewing(id: i64, created_at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "method": "Chemex",
        "grams": 30,
        "ml": 500,
        "notes": null,
        "latitude": null,
        "longitude": null,
        "location": null,
        "created_at": created_at,
        "rating": {"id": id, "flavor": 4, "acidic": 4, "aroma": 4, "appearance": 4, "bitter": 4, "overall": 4},
        "coffee": {"id": 2, "name": "Yirgacheffe", "price": "18.00", "brand": {"id": 1, "name": "Onyx", "country": "USA"}}
    })
}

#[tokio::test]
async fn list_brewings_parses_nested_coffee() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/brewings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            brewing(2, "2025-03-02T09:00:00"),
            brewing(1, "2025-03-01T09:00:00"),
        ])))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let brewings = api.list_brewings().await.unwrap();
    assert_eq!(brewings.len(), 2);
    assert_eq!(brewings[0].coffee_name(), "Yirgacheffe");
    assert_eq!(brewings[0].brand_name(), Some("Onyx"));
    assert_eq!(brewings[0].overall(), Some(4));
}

#[tokio::test]
async fn create_brewing_sends_scores_without_overall() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/brewings"))
        .and(body_json(json!({
            "coffee_id": 2,
            "method": "Chemex",
            "grams": 30,
            "ml": 500,
            "rating": {"flavor": 3, "acidic": 3, "aroma": 3, "appearance": 3, "bitter": 3}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(brewing(5, "2025-03-03T07:00:00")))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let created = api
        .create_brewing(&NewBrewing {
            coffee_id: 2,
            method: "Chemex".to_string(),
            grams: 30,
            ml: 500,
            notes: None,
            latitude: None,
            longitude: None,
            location: None,
            rating: RatingScores::default(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, 5);
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/brewings/5"))
        .and(body_json(json!({"notes": "Too fine"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(brewing(5, "2025-03-03T07:00:00")))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let update = BrewingUpdate {
        notes: Some("Too fine".to_string()),
        ..Default::default()
    };
    api.update_brewing(5, &update).await.unwrap();
}

#[tokio::test]
async fn delete_missing_brewing_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/brewings/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Brewing not found"})))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let err = api.delete_brewing(99).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.detail().as_deref(), Some("Brewing not found"));
}

#[tokio::test]
async fn coffees_filtered_by_brand() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffees"))
        .and(query_param("brand_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "name": "Yirgacheffe", "price": "18.00", "coffee_brand_id": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let coffees = api.list_coffees(Some(1)).await.unwrap();
    assert_eq!(coffees.len(), 1);
    assert_eq!(coffees[0].display_price(), "$18.00");
}

#[tokio::test]
async fn create_brand_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/coffee-brands"))
        .and(body_json(json!({"name": "Onyx", "country": "USA"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 1, "name": "Onyx", "country": "USA"})),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    let brand = api
        .create_coffee_brand(&NewCoffeeBrand {
            name: "Onyx".to_string(),
            country: "USA".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(brand.id, 1);
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coffee-brands"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), SessionHandle::new()).unwrap();
    assert!(matches!(
        api.list_coffee_brands().await,
        Err(ApiError::InvalidResponse(_))
    ));
}
