use axum::{http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde_json::json;

use calculo_certo::{
    handlers::{calculator::calculate_hourly_rate, quotes::estimate},
    middleware::i18n::Locale,
    models::{calculator::CalculatorInputs, quote::EstimateRequest},
};

mod support;

use support::body_json;

fn decimal(value: &serde_json::Value) -> Decimal {
    // serde-float: decimais saem como número JSON
    Decimal::try_from(value.as_f64().expect("número")).unwrap()
}

#[tokio::test]
async fn hourly_rate_scenario_with_lenient_inputs() {
    let inputs: CalculatorInputs = serde_json::from_value(json!({
        "fixedCosts": [{ "description": "Aluguel", "value": "1000" }],
        "variableCosts": [{ "description": "Lixo", "value": "abc" }],
        "salary1": 3000,
        "salary2": null,
        "hoursPerDay": "8",
        "daysPerMonth": 20
    }))
    .unwrap();

    let response = calculate_hourly_rate(Locale::default(), Json(inputs)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(decimal(&body["hourlyRate"]), Decimal::from(25));
    assert_eq!(body["monthlyHours"], 160);
    assert_eq!(decimal(&body["totalVariableCosts"]), Decimal::ZERO);
}

#[tokio::test]
async fn empty_calculator_yields_zero_rate() {
    let inputs: CalculatorInputs = serde_json::from_value(json!({})).unwrap();
    let body = body_json(calculate_hourly_rate(Locale::default(), Json(inputs)).await.into_response()).await;
    assert_eq!(decimal(&body["hourlyRate"]), Decimal::ZERO);
    assert_eq!(body["monthlyHours"], 0);
}

#[tokio::test]
async fn estimate_scenario_with_default_settings() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": 25,
        "timeFactors": { "research": 2, "creation": 6, "meetings": 2 },
        "complexity": "media",
        "urgency": true,
        "commercialUse": "nacional",
        "revisions": 2
    }))
    .unwrap();

    let response = estimate(Locale::default(), Json(request)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(decimal(&body["totalHours"]), Decimal::from(10));
    assert_eq!(decimal(&body["priceMin"]), Decimal::from(975));
    assert_eq!(decimal(&body["priceMax"]), Decimal::new(12675, 1));
}

#[tokio::test]
async fn zero_margin_override_collapses_the_range() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": 40,
        "timeFactors": { "creation": 5 },
        "complexity": "baixa",
        "settings": { "priceRangePercentage": 0 }
    }))
    .unwrap();

    let body = body_json(estimate(Locale::default(), Json(request)).await.into_response()).await;
    // 5h × 40 × 1.5 × 1.0
    assert_eq!(decimal(&body["priceMin"]), Decimal::from(300));
    assert_eq!(body["priceMin"], body["priceMax"]);
}

#[tokio::test]
async fn invalid_override_is_rejected_with_field_details() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": 40,
        "timeFactors": { "creation": 5 },
        "settings": { "urgencyMultiplier": -1 }
    }))
    .unwrap();

    let response = estimate(Locale("en".into()), Json(request)).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "One or more fields are invalid.");
    assert!(body["details"].get("urgency_multiplier").is_some());
}

#[tokio::test]
async fn zero_hours_estimate_is_zero() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": 100,
        "complexity": "alta",
        "urgency": true
    }))
    .unwrap();

    let body = body_json(estimate(Locale::default(), Json(request)).await.into_response()).await;
    assert_eq!(decimal(&body["priceMin"]), Decimal::ZERO);
    assert_eq!(decimal(&body["priceMax"]), Decimal::ZERO);
}

#[tokio::test]
async fn calculator_overflow_is_a_bad_request() {
    let inputs: CalculatorInputs = serde_json::from_value(json!({
        "fixedCosts": [
            { "description": "A", "value": "7e28" },
            { "description": "B", "value": "7e28" }
        ],
        "hoursPerDay": 8,
        "daysPerMonth": 20
    }))
    .unwrap();

    let response = calculate_hourly_rate(Locale("en".into()), Json(inputs))
        .await
        .into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "The values entered are too large to calculate."
    );
}

#[tokio::test]
async fn estimate_overflow_is_a_bad_request() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": "5e19",
        "timeFactors": { "creation": "5e19" }
    }))
    .unwrap();

    let response = estimate(Locale::default(), Json(request)).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Os valores informados são grandes demais para calcular."
    );
}

#[tokio::test]
async fn oversized_multiplier_override_is_rejected() {
    let request: EstimateRequest = serde_json::from_value(json!({
        "hourlyRate": 40,
        "timeFactors": { "creation": 5 },
        "settings": { "complexityMultipliers": { "media": 10000 } }
    }))
    .unwrap();

    let response = estimate(Locale::default(), Json(request)).await.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["details"]
        .get("complexity_multipliers.media")
        .is_some());
}

