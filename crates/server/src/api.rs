//! JSON API for the chat UI.
//!
//! - `POST /chat`: handle one message and reply with the envelope
//! - `GET  /user/{registration_id}`: attendee lookup for the login flow
//! - `GET  /booking/{confirmation_number}`: booking lookup for the login flow

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use concierge_agent::AgentRuntime;
use concierge_core::domain::booking::BookingRecord;
use concierge_core::domain::context::UserDetails;
use concierge_core::domain::envelope::ReplyEnvelope;
use concierge_core::domain::hints::ContextHints;
use concierge_core::errors::{ApplicationError, InterfaceError};
use concierge_db::{BookingRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    runtime: Arc<AgentRuntime>,
    users: Arc<dyn UserRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ApiState {
    pub fn new(
        runtime: Arc<AgentRuntime>,
        users: Arc<dyn UserRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self { runtime, users, bookings }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub hints: ContextHints,
}

#[derive(Debug, Serialize)]
pub struct UserLookupResponse {
    pub user_id: Option<String>,
    pub registration_id: Option<String>,
    pub status: &'static str,
    pub details: UserDetails,
}

#[derive(Debug, Serialize)]
pub struct BookingLookupResponse {
    pub status: &'static str,
    pub booking: BookingRecord,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

/// HTTP rendering of an [`InterfaceError`].
#[derive(Debug)]
pub struct ApiError(InterfaceError);

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.user_message(),
            detail: self.0.to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: ApiState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/user/{registration_id}", get(user_lookup))
        .route("/booking/{confirmation_number}", get(booking_lookup))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// `*` or an empty list allows any origin; otherwise only the listed origins.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() || allowed_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(event_name = "system.cors.invalid_origin", origin = %origin, "skipping origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Json<ReplyEnvelope> {
    Json(state.runtime.handle(&request.message, request.hints).await)
}

async fn user_lookup(
    State(state): State<ApiState>,
    Path(registration_id): Path<String>,
) -> Result<Json<UserLookupResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let registration_id = registration_id.trim().to_string();

    let user = state
        .users
        .find_by_registration_id(&registration_id)
        .await
        .map_err(|error| {
            ApplicationError::Persistence(error.to_string()).into_interface(&correlation_id)
        })?
        .ok_or_else(|| {
            ApplicationError::NotFound(format!("user with registration id {registration_id}"))
                .into_interface(&correlation_id)
        })?;

    info!(
        event_name = "api.user.found",
        correlation_id = %correlation_id,
        registration_id = %registration_id,
        "user lookup succeeded"
    );

    Ok(Json(UserLookupResponse {
        user_id: user.user_id.clone(),
        registration_id: user.registration_id.clone(),
        status: "found",
        details: user,
    }))
}

async fn booking_lookup(
    State(state): State<ApiState>,
    Path(confirmation_number): Path<String>,
) -> Result<Json<BookingLookupResponse>, ApiError> {
    let correlation_id = Uuid::new_v4().to_string();
    let confirmation_number = confirmation_number.trim().to_ascii_uppercase();

    let booking = state
        .bookings
        .find_by_confirmation(&confirmation_number)
        .await
        .map_err(|error| {
            ApplicationError::Persistence(error.to_string()).into_interface(&correlation_id)
        })?
        .ok_or_else(|| {
            ApplicationError::NotFound(format!("booking {confirmation_number}"))
                .into_interface(&correlation_id)
        })?;

    Ok(Json(BookingLookupResponse { status: "found", booking }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use concierge_agent::{
        AgentRuntime, ContextResolver, GuardrailPolicy, RecordStores, SpecialistRunner,
    };
    use concierge_core::domain::booking::{BookingRecord, CustomerRecord};
    use concierge_core::domain::context::UserDetails;
    use concierge_core::routing::IntentRouter;
    use concierge_db::InMemoryRecordStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, ApiState};

    fn app(origins: &[String]) -> Router {
        let customer = CustomerRecord {
            id: 1,
            name: Some("Ada Okafor".to_string()),
            email: None,
            account_number: Some("ACC-1001".to_string()),
            user_id: Some("u-1001".to_string()),
        };
        let store = Arc::new(
            InMemoryRecordStore::default()
                .with_user(UserDetails {
                    user_id: Some("u-1001".to_string()),
                    registration_id: Some("R-1001".to_string()),
                    user_name: Some("Ada Okafor".to_string()),
                    ..UserDetails::default()
                })
                .with_customer(customer.clone())
                .with_booking(BookingRecord {
                    id: 5,
                    confirmation_number: "CONF001".to_string(),
                    customer_id: Some(1),
                    flight_id: None,
                    seat_number: Some("12A".to_string()),
                    booking_status: Some("Confirmed".to_string()),
                    customer: Some(customer),
                    flight: None,
                }),
        );

        let runtime = AgentRuntime::new(
            IntentRouter::default(),
            ContextResolver::new(store.clone()),
            Arc::new(SpecialistRunner::with_stores(&RecordStores::shared(store.clone()), None)),
            GuardrailPolicy::default(),
        );
        router(ApiState::new(Arc::new(runtime), store.clone(), store), origins)
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::post("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn chat_returns_the_reply_envelope() {
        let response = app(&[])
            .oneshot(post_chat(json!({
                "message": "Show me my booking",
                "account_number": "ACC-1001",
                "registration_id": "R-1001"
            })))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["agent"], "CustomerServiceAgent");
        assert_eq!(body["conversation_id"], "conv_R-1001");
        assert!(body["response"].as_str().is_some_and(|reply| reply.contains("CONF001")));
        assert_eq!(body["context"]["account_number"], "ACC-1001");
        assert_eq!(body["agents"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn chat_with_blank_message_greets() {
        let response = app(&[])
            .oneshot(post_chat(json!({ "message": "  ", "registration_id": "" })))
            .await
            .expect("response");

        let body = json_body(response).await;
        assert_eq!(body["agent"], "TriageAgent");
        assert_eq!(body["conversation_id"], "initial");
        assert_eq!(body["context"]["registration_id"], Value::Null);
    }

    #[tokio::test]
    async fn user_lookup_finds_registered_attendees() {
        let response = app(&[])
            .oneshot(Request::get("/user/R-1001").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "found");
        assert_eq!(body["user_id"], "u-1001");
        assert_eq!(body["details"]["user_name"], "Ada Okafor");
    }

    #[tokio::test]
    async fn unknown_user_is_not_found_with_correlation_id() {
        let response = app(&[])
            .oneshot(Request::get("/user/R-404").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No matching record was found.");
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn booking_lookup_is_case_insensitive() {
        let response = app(&[])
            .oneshot(Request::get("/booking/conf001").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["booking"]["confirmation_number"], "CONF001");
        assert_eq!(body["booking"]["seat_number"], "12A");
    }

    #[tokio::test]
    async fn cors_echoes_configured_origins() {
        let origins = vec!["http://localhost:3000".to_string()];
        let response = app(&origins)
            .oneshot(
                Request::get("/booking/CONF001")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
    }
}
