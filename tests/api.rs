use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, Utc};
use recipe_planner::{
    AppState,
    api::routes::create_router,
    config::Config,
    models::Recipe,
    services::PdfRenderer,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct FixedRenderer(bool);

impl PdfRenderer for FixedRenderer {
    fn render_recipe(&self, _recipe: &Recipe, _output_path: &Path) -> bool {
        self.0
    }
}

fn app_with(renders: bool) -> Router {
    create_router(AppState::with_renderer(Config::for_tests(), Arc::new(FixedRenderer(renders))))
}

fn app() -> Router {
    app_with(true)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn create_recipe(app: &Router, body: Value) -> u64 {
    let (status, json) = send(app, Method::POST, "/api/recipes", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["id"].as_u64().unwrap()
}

#[tokio::test]
async fn nutrition_for_flour_record() {
    let app = app();
    let body = json!({"ingredients": [{"name": "flour", "amount": 100, "unit": "g"}]});
    let (status, json) = send(&app, Method::POST, "/api/nutrition/calculate", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["status"], "success");
    let data = &json["data"];
    assert_eq!(data["calories"], 364.0);
    assert_eq!(data["protein"], 10.0);
    assert_eq!(data["carbs"], 76.0);
    assert_eq!(data["fat"], 1.0);
    assert_eq!(data["sugar"], 0.3);
    assert_eq!(data["sodium"], 2.0);
    assert_eq!(data["fiber"], 2.7);
}

#[tokio::test]
async fn nutrition_requires_ingredients() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/api/nutrition/calculate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "Request must include an 'ingredients' field");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn nutrition_rejects_non_numeric_amount() {
    let app = app();
    let body = json!({"ingredients": [{"name": "flour", "amount": "lots"}]});
    let (status, json) = send(&app, Method::POST, "/api/nutrition/calculate", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["status"], "error");
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/scrape")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["meta"]["message"], "Request body must be JSON");
}

#[tokio::test]
async fn scrape_validates_url() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/api/scrape", Some(json!({"save": true}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "Request must include a 'url' field");

    let (status, json) = send(&app, Method::POST, "/api/scrape", Some(json!({"url": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "A URL must be provided");
}

#[tokio::test]
async fn recipe_lifecycle() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/api/recipes", Some(json!({"description": "untitled"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "'title' is a required field");

    let id = create_recipe(
        &app,
        json!({
            "title": "Pancakes",
            "servings": 4,
            "ingredients": [{"name": "flour", "amount": 1, "unit": "cup"}],
            "nutrition": {"calories": 520.0}
        }),
    )
    .await;

    let (status, json) = send(&app, Method::GET, &format!("/api/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Pancakes");
    assert_eq!(json["data"]["ingredients"][0]["unit"], "cup");

    let patch = json!({"title": "Fluffy Pancakes", "nutrition": {"protein": 12.0}});
    let (status, json) = send(&app, Method::PUT, &format!("/api/recipes/{}", id), Some(patch)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Fluffy Pancakes");
    assert_eq!(json["data"]["servings"], 4);
    assert_eq!(json["data"]["nutrition"]["calories"], 520.0);
    assert_eq!(json["data"]["nutrition"]["protein"], 12.0);

    let (status, json) = send(&app, Method::DELETE, &format!("/api/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["message"], "Recipe deleted");

    let (status, json) = send(&app, Method::GET, &format!("/api/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["meta"]["message"], "Recipe not found");
}

#[tokio::test]
async fn recipe_list_filters_and_sorts() {
    let app = app();
    create_recipe(&app, json!({"title": "Scones", "nutrition": {"calories": 300.0}})).await;
    create_recipe(&app, json!({"title": "Apple Pie", "nutrition": {"calories": 410.0}})).await;
    create_recipe(&app, json!({"title": "Toast"})).await;

    let (status, json) = send(&app, Method::GET, "/api/recipes?sort_by=title&sort_direction=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json["data"].as_array().unwrap().iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Toast", "Scones", "Apple Pie"]);

    let (_, json) = send(&app, Method::GET, "/api/recipes?min_calories=350", None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["title"], "Apple Pie");

    let (status, _) = send(&app, Method::GET, "/api/recipes?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recipe_pdf_reports_path_or_failure() {
    let app = app();
    let id = create_recipe(&app, json!({"title": "Soup"})).await;
    let (status, json) = send(&app, Method::POST, &format!("/api/recipes/{}/pdf", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let pdf_path = json["data"]["pdf_path"].as_str().unwrap();
    assert!(pdf_path.ends_with(".pdf"));
    assert!(pdf_path.contains(&format!("recipe_{}_", id)));

    let (status, _) = send(&app, Method::POST, "/api/recipes/999/pdf", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let broken = app_with(false);
    let id = create_recipe(&broken, json!({"title": "Soup"})).await;
    let (status, _) = send(&broken, Method::POST, &format!("/api/recipes/{}/pdf", id), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn meal_plan_schedule_and_shopping_list() {
    let app = app();
    let pancakes = create_recipe(
        &app,
        json!({"title": "Pancakes", "ingredients": [
            {"name": "flour", "amount": 1, "unit": "cup"},
            {"name": "egg", "amount": 2, "unit": "whole"}
        ]}),
    )
    .await;
    let bread = create_recipe(
        &app,
        json!({"title": "Bread", "ingredients": [{"name": "Flour", "amount": 3, "unit": "cup"}]}),
    )
    .await;

    let (status, json) = send(&app, Method::POST, "/api/meal-plans", Some(json!({"start_date": "2024-05-01"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "'name' is a required field");

    let (status, json) = send(
        &app,
        Method::POST,
        "/api/meal-plans",
        Some(json!({"name": "Week 1", "start_date": "2024-05-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let plan = json["data"]["id"].as_u64().unwrap();
    assert_eq!(json["data"]["has_shopping_list"], false);

    let uri = format!("/api/meal-plans/{}/recipes", plan);
    let (status, json) = send(&app, Method::POST, &uri, Some(json!({"recipe_id": pancakes, "day": "Monday"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "'meal_type' is required");

    let slot = json!({"recipe_id": pancakes, "day": "Monday", "meal_type": "breakfast"});
    send(&app, Method::POST, &uri, Some(slot.clone())).await;
    let (status, json) = send(&app, Method::POST, &uri, Some(slot)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["days"]["Monday"]["breakfast"].as_array().unwrap().len(), 1);

    let slot = json!({"recipe_id": bread, "day": "Tuesday", "meal_type": "lunch"});
    send(&app, Method::POST, &uri, Some(slot)).await;

    let (status, _) = send(&app, Method::POST, &uri, Some(json!({"recipe_id": 999, "day": "Monday", "meal_type": "lunch"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, Method::POST, &format!("/api/meal-plans/{}/shopping-list", plan), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let list_id = json["data"]["id"].as_u64().unwrap();
    assert_eq!(json["data"]["name"], "Shopping list for Week 1");
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["ingredient_name"], "flour");
    assert_eq!(items[0]["quantity"], 4.0);

    let (status, json) = send(
        &app,
        Method::PUT,
        &format!("/api/shopping-lists/{}/items/1", list_id),
        Some(json!({"checked": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["items"][0]["checked"], true);

    let (_, json) = send(&app, Method::GET, &format!("/api/meal-plans/{}", plan), None).await;
    assert_eq!(json["data"]["has_shopping_list"], true);

    let (status, json) = send(&app, Method::DELETE, &format!("/api/meal-plans/{}/recipes/{}", plan, bread), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["days"].get("Tuesday").is_none());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/meal-plans/{}", plan), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &format!("/api/shopping-lists/{}", list_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pantry_items_and_expiring() {
    let app = app();
    let (status, json) = send(&app, Method::POST, "/api/pantries", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["name"], "My Pantry");
    let pantry = json["data"]["id"].as_u64().unwrap();

    let today = Utc::now().date_naive();
    let soon = (today + Duration::days(1)).format("%Y-%m-%d").to_string();
    let later = (today + Duration::days(30)).format("%Y-%m-%d").to_string();
    let items_uri = format!("/api/pantries/{}/items", pantry);

    let (status, json) = send(
        &app,
        Method::POST,
        &items_uri,
        Some(json!({"ingredient_name": "milk", "expiration_date": soon})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["days_until_expiration"], 1);

    send(&app, Method::POST, &items_uri, Some(json!({"ingredient_name": "rice", "expiration_date": later}))).await;

    let (status, json) = send(&app, Method::POST, &items_uri, Some(json!({"ingredient_name": "jam", "expiration_date": "soon"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["message"], "Dates must be ISO formatted strings (YYYY-MM-DD)");

    let (status, json) = send(&app, Method::GET, &format!("/api/pantries/{}/expiring", pantry), None).await;
    assert_eq!(status, StatusCode::OK);
    let expiring = json["data"].as_array().unwrap();
    assert_eq!(expiring.len(), 1);
    assert_eq!(expiring[0]["ingredient_name"], "milk");

    let (_, json) = send(&app, Method::GET, &format!("/api/pantries/{}/expiring?days=60", pantry), None).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let (status, json) = send(&app, Method::DELETE, &format!("/api/pantries/{}/items/1", pantry), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/api/pantries/42/expiring", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expiring_window_too_large_is_a_bad_request() {
    let app = app();
    let (_, json) = send(&app, Method::POST, "/api/pantries", Some(json!({"name": "Fridge"}))).await;
    let pantry = json["data"]["id"].as_u64().unwrap();

    let (status, json) = send(&app, Method::GET, &format!("/api/pantries/{}/expiring?days=1000000000", pantry), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["meta"]["status"], "error");
}
