//! API integration tests
//!
//! These run against a live server with seeded data (at least one shop with
//! an active barber, an active service and availability rules for the coming
//! week). Start the server, then: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Register a fresh customer account and return its auth token
async fn register_customer(client: &Client) -> String {
    let email = format!("customer-{}@example.com", Uuid::new_v4());

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "email": email,
            "display_name": "Test Customer",
            "password": "s3cure-pass"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": email,
            "password": "s3cure-pass"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Walk the seeded catalog to a (barber_id, service_id) pair
async fn find_barber_and_service(client: &Client, token: &str) -> (String, String) {
    let shops: Value = client
        .get(format!("{}/shops", BASE_URL))
        .send()
        .await
        .expect("Failed to list shops")
        .json()
        .await
        .expect("Failed to parse shops");

    let shop_id = shops[0]["id"].as_str().expect("No seeded shop").to_string();

    let barbers: Value = client
        .get(format!("{}/shops/{}/barbers", BASE_URL, shop_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list barbers")
        .json()
        .await
        .expect("Failed to parse barbers");

    let services: Value = client
        .get(format!("{}/shops/{}/services", BASE_URL, shop_id))
        .send()
        .await
        .expect("Failed to list services")
        .json()
        .await
        .expect("Failed to parse services");

    (
        barbers[0]["id"].as_str().expect("No seeded barber").to_string(),
        services[0]["id"].as_str().expect("No seeded service").to_string(),
    )
}

/// First bookable slot in the coming week
async fn first_open_slot(
    client: &Client,
    token: &str,
    barber_id: &str,
    service_id: &str,
) -> String {
    let today = chrono::Utc::now().date_naive();
    let in_a_week = today + chrono::Duration::days(7);

    let days: Value = client
        .get(format!(
            "{}/barbers/{}/slots?start_date={}&end_date={}&service_id={}",
            BASE_URL, barber_id, today, in_a_week, service_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to fetch slots")
        .json()
        .await
        .expect("Failed to parse slots");

    days.as_array()
        .expect("Slots response is not an array")
        .iter()
        .flat_map(|day| day["slots"].as_array().cloned().unwrap_or_default())
        .next()
        .and_then(|slot| slot["start_time"].as_str().map(str::to_string))
        .expect("No open slot in the coming week")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "nobody@example.com",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_register_and_get_current_user() {
    let client = Client::new();
    let token = register_customer(&client).await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "customer");
    assert!(body["password_hash"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_slot_listing_is_quantized() {
    let client = Client::new();
    let token = register_customer(&client).await;
    let (barber_id, service_id) = find_barber_and_service(&client, &token).await;

    let start = first_open_slot(&client, &token, &barber_id, &service_id).await;

    // Slot starts sit on 15-minute marks from midnight
    let start: chrono::DateTime<chrono::Utc> = start.parse().expect("Bad slot timestamp");
    assert_eq!(start.timestamp() % (15 * 60), 0);
}

#[tokio::test]
#[ignore]
async fn test_booking_flow_and_double_booking_conflict() {
    let client = Client::new();
    let first_customer = register_customer(&client).await;
    let second_customer = register_customer(&client).await;
    let (barber_id, service_id) = find_barber_and_service(&client, &first_customer).await;
    let start_time = first_open_slot(&client, &first_customer, &barber_id, &service_id).await;

    // First customer takes the slot
    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .header("Authorization", format!("Bearer {}", first_customer))
        .json(&json!({
            "barber_id": barber_id,
            "service_id": service_id,
            "start_time": start_time
        }))
        .send()
        .await
        .expect("Failed to send booking request");

    assert_eq!(response.status(), 201);

    let appointment: Value = response.json().await.expect("Failed to parse appointment");
    assert_eq!(appointment["status"], "booked");
    let appointment_id = appointment["id"].as_str().expect("No appointment ID").to_string();

    // Second customer asking for the same slot loses
    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .header("Authorization", format!("Bearer {}", second_customer))
        .json(&json!({
            "barber_id": barber_id,
            "service_id": service_id,
            "start_time": start_time
        }))
        .send()
        .await
        .expect("Failed to send booking request");

    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "OVERLAPPING_APPOINTMENT");

    // Cancel well before the start, reopening the slot
    let response = client
        .post(format!("{}/appointments/{}/cancel", BASE_URL, appointment_id))
        .header("Authorization", format!("Bearer {}", first_customer))
        .json(&json!({ "reason": "change of plans" }))
        .send()
        .await
        .expect("Failed to send cancel request");

    assert_eq!(response.status(), 200);

    let cancelled: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(cancelled["status"], "cancelled");

    // Cancelling again hits a terminal state
    let response = client
        .post(format!("{}/appointments/{}/cancel", BASE_URL, appointment_id))
        .header("Authorization", format!("Bearer {}", first_customer))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send cancel request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "INVALID_APPOINTMENT_STATE");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_bookings_have_exactly_one_winner() {
    let client = Client::new();

    let mut tokens = Vec::new();
    for _ in 0..5 {
        tokens.push(register_customer(&client).await);
    }

    let (barber_id, service_id) = find_barber_and_service(&client, &tokens[0]).await;
    let start_time = first_open_slot(&client, &tokens[0], &barber_id, &service_id).await;

    // Everyone asks for the same slot at once.
    let mut handles = Vec::new();
    for token in tokens {
        let client = client.clone();
        let barber_id = barber_id.clone();
        let service_id = service_id.clone();
        let start_time = start_time.clone();
        handles.push(tokio::spawn(async move {
            let response = client
                .post(format!("{}/appointments", BASE_URL))
                .header("Authorization", format!("Bearer {}", token))
                .json(&json!({
                    "barber_id": barber_id,
                    "service_id": service_id,
                    "start_time": start_time
                }))
                .send()
                .await
                .expect("Failed to send booking request");

            let status = response.status().as_u16();
            let body: Value = response.json().await.expect("Failed to parse response");
            (status, body)
        }));
    }

    let mut created = 0;
    for handle in handles {
        let (status, body) = handle.await.expect("Booking task panicked");
        match status {
            201 => created += 1,
            409 => {
                let code = body["code"].as_str().unwrap_or_default();
                assert!(
                    code == "OVERLAPPING_APPOINTMENT" || code == "CONCURRENT_MODIFICATION",
                    "unexpected conflict code {code}"
                );
            }
            other => panic!("unexpected status {other}: {body}"),
        }
    }
    assert_eq!(created, 1, "exactly one concurrent booking may win the slot");
}

#[tokio::test]
#[ignore]
async fn test_booking_in_the_past_rejected() {
    let client = Client::new();
    let token = register_customer(&client).await;
    let (barber_id, service_id) = find_barber_and_service(&client, &token).await;

    let yesterday = chrono::Utc::now() - chrono::Duration::days(1);

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "barber_id": barber_id,
            "service_id": service_id,
            "start_time": yesterday.to_rfc3339()
        }))
        .send()
        .await
        .expect("Failed to send booking request");

    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "BOOKING_IN_PAST");
}

#[tokio::test]
#[ignore]
async fn test_my_appointments_lists_own_booking() {
    let client = Client::new();
    let token = register_customer(&client).await;
    let (barber_id, service_id) = find_barber_and_service(&client, &token).await;
    let start_time = first_open_slot(&client, &token, &barber_id, &service_id).await;

    let response = client
        .post(format!("{}/appointments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "barber_id": barber_id,
            "service_id": service_id,
            "start_time": start_time
        }))
        .send()
        .await
        .expect("Failed to send booking request");

    assert_eq!(response.status(), 201);
    let appointment: Value = response.json().await.expect("Failed to parse appointment");

    let mine: Value = client
        .get(format!("{}/customers/me/appointments", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to list appointments")
        .json()
        .await
        .expect("Failed to parse appointments");

    let found = mine
        .as_array()
        .expect("Expected an array")
        .iter()
        .any(|a| a["id"] == appointment["id"]);
    assert!(found);

    // Cleanup
    let _ = client
        .post(format!(
            "{}/appointments/{}/cancel",
            BASE_URL,
            appointment["id"].as_str().unwrap()
        ))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_webhook_unknown_reference_is_acknowledged() {
    let client = Client::new();

    let response = client
        .post(format!("{}/payments/webhook", BASE_URL))
        .json(&json!({
            "type": "payment_intent.succeeded",
            "data": { "object": { "id": "pi_does_not_exist" } }
        }))
        .send()
        .await
        .expect("Failed to send webhook");

    // Unknown references are dropped, never retried
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_require_admin_role() {
    let client = Client::new();
    let token = register_customer(&client).await;

    let response = client
        .post(format!("{}/admin/no-show-sweep", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/customers/me/appointments", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}
