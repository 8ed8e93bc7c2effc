// JSON surface over the hostConnect gateway
use crate::catalog;
use crate::error::{success, AppError};
use crate::ledger::{BookingStatus, Customer, NewLedgerBooking, PaymentStatus};
use crate::pricing::{self, MAX_CALENDAR_DAYS};
use crate::state::AppState;
use crate::types::{
    BookingKind, NewBooking, ProductType, RoomConfig, RoomType, SearchCriteria, ServiceRequest,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

type Shared = State<Arc<AppState>>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/tourplan/ping", get(ping_handler))
        .route("/api/tourplan/search", post(search_handler))
        .route("/api/tourplan/search-fast", get(search_fast_handler))
        .route("/api/tourplan/destinations", post(destinations_handler))
        .route("/api/tourplan/product/:code", get(product_handler))
        .route("/api/tourplan/pricing/:code", get(pricing_handler))
        .route(
            "/api/tourplan/booking",
            post(create_booking_handler).put(add_service_handler),
        )
        .route(
            "/api/tourplan/booking/:id",
            get(get_booking_handler).delete(cancel_booking_handler),
        )
        .route("/api/tourplan/booking/:id/confirm", post(confirm_booking_handler))
        .route("/api/catalog/cruises", get(cruises_handler))
        .route("/api/catalog/regions", get(regions_handler))
        .route("/api/admin/bookings", get(list_bookings_handler))
        .route("/api/admin/bookings/:id/payment", patch(payment_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .with_state(state)
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    let value = value.trim();
    if value.len() != 10 {
        return Err(AppError::Validation(format!("{field}: expected YYYY-MM-DD, got {value:?}")));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field}: expected YYYY-MM-DD, got {value:?}")))
}

fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_date(field, v))
        .transpose()
}

// URL values arrive slugged ("south-africa") while the vendor matches on "South Africa"
fn vendor_destination(value: Option<String>, from_url: bool) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("all") || !(from_url || trimmed.contains('-')) {
        return Some(value);
    }
    Some(catalog::slug_to_title(trimmed))
}

fn validate_rooms(configs: &[RoomConfig]) -> Result<(), AppError> {
    for (index, config) in configs.iter().enumerate() {
        config
            .validate()
            .map_err(|e| AppError::Validation(format!("roomConfigs[{index}].{e}")))?;
    }
    Ok(())
}

fn validate_travellers(adults: Option<u32>, children: Option<u32>) -> Result<(), AppError> {
    if matches!(adults, Some(n) if !(1..=20).contains(&n)) {
        return Err(AppError::Validation("adults: must be between 1 and 20".to_string()));
    }
    if matches!(children, Some(n) if n > 20) {
        return Err(AppError::Validation("children: must be at most 20".to_string()));
    }
    Ok(())
}

async fn health_handler(State(state): Shared) -> impl IntoResponse {
    success(json!({
        "status": "ok",
        "cacheEntries": state.cache.len(),
        "bookings": state.ledger.len(),
    }))
}

async fn ping_handler(State(state): Shared) -> Result<impl IntoResponse, AppError> {
    state.client().ping().await?;
    Ok(success(json!({ "connected": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody {
    product_type: ProductType,
    country: Option<String>,
    destination: Option<String>,
    #[serde(rename = "class")]
    class_filter: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    adults: Option<u32>,
    children: Option<u32>,
    #[serde(default)]
    room_configs: Vec<RoomConfig>,
    #[serde(default)]
    cabin_configs: Vec<RoomConfig>,
}

impl SearchBody {
    fn into_criteria(self) -> Result<SearchCriteria, AppError> {
        let date_from = optional_date("dateFrom", self.date_from.as_deref())?;
        let date_to = optional_date("dateTo", self.date_to.as_deref())?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if to < from {
                return Err(AppError::Validation("dateTo: must not be before dateFrom".to_string()));
            }
        }
        validate_travellers(self.adults, self.children)?;

        let room_configs = if self.room_configs.is_empty() {
            self.cabin_configs
        } else {
            self.room_configs
        };
        validate_rooms(&room_configs)?;

        if self.product_type == ProductType::Accommodation {
            if date_from.is_none() || date_to.is_none() {
                return Err(AppError::Validation(
                    "dateFrom and dateTo are required for accommodation".to_string(),
                ));
            }
            if room_configs.is_empty() {
                return Err(AppError::Validation(
                    "roomConfigs: at least one room is required for accommodation".to_string(),
                ));
            }
        }

        Ok(SearchCriteria {
            product_type: self.product_type,
            country: self.country,
            destination: vendor_destination(self.destination, false),
            class_filter: self.class_filter,
            date_from: date_from.map(|d| d.format("%Y-%m-%d").to_string()),
            date_to: date_to.map(|d| d.format("%Y-%m-%d").to_string()),
            adults: self.adults,
            children: self.children,
            room_configs,
        })
    }
}

async fn search_handler(
    State(state): Shared,
    payload: Result<Json<SearchBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let criteria = body.into_criteria()?;
    let outcome = state.search.search_products(&criteria).await?;
    info!(product_type = %criteria.product_type, total = outcome.total, "search complete");
    Ok(success(json!({ "searchCriteria": criteria, "outcome": outcome })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FastSearchQuery {
    product_type: Option<String>,
    country: Option<String>,
    destination: Option<String>,
    class: Option<String>,
    adults: Option<u32>,
    travelers: Option<u32>,
    children: Option<u32>,
    stats: Option<bool>,
}

async fn search_fast_handler(
    State(state): Shared,
    query: Result<Query<FastSearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    if query.stats == Some(true) {
        return Ok(success(json!({ "cache": state.search.cache_stats() })));
    }

    let product_type = match query.product_type.as_deref() {
        Some(value) => value
            .parse::<ProductType>()
            .map_err(|e| AppError::Validation(format!("productType: {e}")))?,
        None => ProductType::GroupTours,
    };
    let adults = query.adults.or(query.travelers);
    validate_travellers(adults, query.children)?;

    // Broad range so every seasonal rate comes back for "from" prices
    let today = Utc::now().date_naive();
    let until = today.checked_add_months(Months::new(24)).unwrap_or(today);
    let criteria = SearchCriteria {
        country: query.country,
        destination: vendor_destination(query.destination, true),
        class_filter: query.class,
        date_from: Some(today.format("%Y-%m-%d").to_string()),
        date_to: Some(until.format("%Y-%m-%d").to_string()),
        adults,
        children: query.children,
        ..SearchCriteria::new(product_type)
    };
    let outcome = state.search.search_products(&criteria).await?;
    Ok(success(json!({ "searchCriteria": criteria, "outcome": outcome })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DestinationsBody {
    country_name: String,
    req_type: Option<String>,
}

async fn destinations_handler(
    State(state): Shared,
    payload: Result<Json<DestinationsBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let country = body.country_name.trim();
    if country.is_empty() {
        return Err(AppError::Validation("countryName: is required".to_string()));
    }
    let req_type = body
        .req_type
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("Day Tours");
    Ok(success(state.search.destinations(country, req_type).await))
}

async fn product_handler(
    State(state): Shared,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = state.search.product_details(&code).await?;
    Ok(success(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingQuery {
    date_from: Option<String>,
    date_to: Option<String>,
    adults: Option<u32>,
    children: Option<u32>,
    room_type: Option<String>,
}

async fn pricing_handler(
    State(state): Shared,
    Path(code): Path<String>,
    query: Result<Query<PricingQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let from = optional_date("dateFrom", query.date_from.as_deref())?
        .unwrap_or_else(|| Utc::now().date_naive());
    let to = optional_date("dateTo", query.date_to.as_deref())?
        .unwrap_or_else(|| pricing::default_range_end(&code, from));
    if to < from {
        return Err(AppError::Validation("dateTo: must not be before dateFrom".to_string()));
    }
    if (to - from).num_days() >= MAX_CALENDAR_DAYS {
        return Err(AppError::Validation(format!(
            "date range: at most {MAX_CALENDAR_DAYS} days"
        )));
    }

    let room_type = match query.room_type.as_deref() {
        Some(value) => value
            .parse::<RoomType>()
            .map_err(|e| AppError::Validation(format!("roomType: {e}")))?,
        None => RoomType::Double,
    };
    let room = RoomConfig {
        children: query.children.unwrap_or(0),
        room_type,
        ..RoomConfig::adults(query.adults.unwrap_or(2))
    };
    validate_rooms(std::slice::from_ref(&room))?;

    let calendar = state
        .search
        .pricing_calendar(&code, from, to, std::slice::from_ref(&room))
        .await?;
    Ok(success(calendar))
}

fn default_booking_kind() -> BookingKind {
    BookingKind::Booking
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBookingBody {
    customer_name: String,
    email: Option<String>,
    mobile: Option<String>,
    #[serde(default = "default_booking_kind")]
    booking_type: BookingKind,
    #[serde(flatten)]
    service: ServiceRequest,
}

fn validate_service(service: &ServiceRequest) -> Result<NaiveDate, AppError> {
    if service.product_code.trim().is_empty() {
        return Err(AppError::Validation("productCode: is required".to_string()));
    }
    let tour_date = parse_date("dateFrom", &service.date_from)?;
    validate_travellers(service.adults, service.children)?;
    validate_rooms(&service.room_configs)?;
    Ok(tour_date)
}

async fn create_booking_handler(
    State(state): Shared,
    payload: Result<Json<CreateBookingBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    let tour_date = validate_service(&body.service)?;
    if body.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customerName: is required".to_string()));
    }
    if matches!(body.email.as_deref(), Some(email) if !email.contains('@')) {
        return Err(AppError::Validation("email: invalid address".to_string()));
    }

    let new_booking = NewBooking {
        customer_name: body.customer_name.trim().to_string(),
        kind: body.booking_type,
        email: body.email.clone(),
        mobile: body.mobile.clone(),
    };
    let confirmation = state
        .client()
        .add_service(&body.service, Some(&new_booking), None)
        .await?;

    let first_room = body.service.room_configs.first();
    let record = state.ledger.record(NewLedgerBooking {
        vendor_booking_id: confirmation.booking_id.clone(),
        reference: confirmation.reference.clone(),
        product_code: body.service.product_code.clone(),
        customer: Customer {
            name: new_booking.customer_name,
            email: body.email,
            phone: body.mobile,
        },
        tour_date,
        adults: first_room.map(|r| r.adults).or(body.service.adults).unwrap_or(0),
        children: first_room.map(|r| r.children).or(body.service.children).unwrap_or(0),
        total: confirmation.total_cost,
        currency: confirmation.currency.clone(),
        status: if body.booking_type == BookingKind::Booking && confirmation.status == "OK" {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        },
    });

    Ok((
        StatusCode::CREATED,
        success(json!({ "booking": confirmation, "localId": record.id })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddServiceBody {
    booking_id: String,
    #[serde(flatten)]
    service: ServiceRequest,
}

async fn add_service_handler(
    State(state): Shared,
    payload: Result<Json<AddServiceBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    if body.booking_id.trim().is_empty() {
        return Err(AppError::Validation("bookingId: is required".to_string()));
    }
    validate_service(&body.service)?;
    let confirmation = state
        .client()
        .add_service(&body.service, None, Some(body.booking_id.trim()))
        .await?;
    Ok(success(confirmation))
}

async fn get_booking_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success(state.client().get_booking(&id).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmQuery {
    send_supplier_message: Option<bool>,
}

async fn confirm_booking_handler(
    State(state): Shared,
    Path(id): Path<String>,
    query: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let status = state
        .client()
        .quote_to_book(&id, query.send_supplier_message.unwrap_or(true))
        .await?;
    let updated = state.ledger.confirm_by_vendor_id(&id);
    info!(booking_id = %id, %status, updated, "quote converted to booking");
    Ok(success(json!({ "bookingId": id, "status": status })))
}

async fn cancel_booking_handler(
    State(state): Shared,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let status = state.client().cancel_services(&reference).await?;
    let cancelled = state.ledger.cancel_by_reference(&reference);
    info!(%reference, %status, cancelled, "booking services cancelled");
    Ok(success(json!({
        "reference": reference,
        "status": status,
        "localBookingsCancelled": cancelled,
    })))
}

#[derive(Debug, Deserialize)]
struct CruiseQuery {
    country: Option<String>,
}

async fn cruises_handler(Query(query): Query<CruiseQuery>) -> impl IntoResponse {
    let country = query.country.unwrap_or_default();
    let products: Vec<&catalog::CruiseProduct> = if country.trim().is_empty() {
        catalog::CRUISE_PRODUCTS.iter().collect()
    } else {
        catalog::cruise_products_for_region(&country)
    };
    success(json!({
        "country": country,
        "showsDestinationAndClass": catalog::shows_destination_and_class(&country),
        "products": products,
    }))
}

async fn regions_handler() -> impl IntoResponse {
    success(catalog::cruise_regions())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookingsQuery {
    payment_due_from: Option<String>,
    payment_due_to: Option<String>,
}

async fn list_bookings_handler(
    State(state): Shared,
    query: Result<Query<BookingsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let from = optional_date("paymentDueFrom", query.payment_due_from.as_deref())?;
    let to = optional_date("paymentDueTo", query.payment_due_to.as_deref())?;
    let bookings = match (from, to) {
        (Some(from), Some(to)) => state.ledger.needing_payment_reminders(from, to),
        (None, None) => state.ledger.list(),
        _ => {
            return Err(AppError::Validation(
                "paymentDueFrom and paymentDueTo must be given together".to_string(),
            ))
        }
    };
    Ok(success(bookings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentBody {
    payment_status: PaymentStatus,
}

async fn payment_handler(
    State(state): Shared,
    Path(id): Path<String>,
    payload: Result<Json<PaymentBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload?;
    state
        .ledger
        .update_payment_status(&id, body.payment_status)
        .map(success)
        .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found")))
}

async fn clear_cache_handler(State(state): Shared) -> impl IntoResponse {
    let cleared = state.cache.len();
    state.search.clear_cache();
    info!(cleared, "response cache cleared");
    success(json!({ "cleared": cleared }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, ResponseCache};
    use crate::client::mock_transport::{client_with, option_reply, MockTransport};
    use crate::search::CacheTtls;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app_with(transport: Arc<MockTransport>) -> (Router, Arc<AppState>) {
        let state = AppState::from_parts(
            client_with(transport),
            Arc::new(ResponseCache::new(CacheConfig::default())),
            CacheTtls::default(),
        );
        (router(Arc::clone(&state)), state)
    }

    fn app(reply: &'static str) -> Router {
        app_with(Arc::new(MockTransport::replying(reply))).0
    }

    async fn call(
        app: Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    const ADD_SERVICE_OK: &str = "<Reply><AddServiceReply><BookingId>321</BookingId><Ref>TIA-321</Ref><Status>OK</Status><TotalCost>900000</TotalCost><Currency>AUD</Currency></AddServiceReply></Reply>";

    const PRICING_REPLY: &str = "<Reply><OptionInfoReply><Option><Opt>NBOGTARP001CKSE</Opt><OptGeneral><Description>Classic Kenya</Description></OptGeneral><OptAvail>0 4 0</OptAvail></Option></OptionInfoReply></Reply>";

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(app("<Reply/>"), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_ping_auth_failure_is_bad_gateway() {
        let app = app("<Reply><ErrorReply><Error>1051 SCN denied</Error></ErrorReply></Reply>");
        let (status, body) = call(app, Method::GET, "/api/tourplan/ping", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "TOURPLAN_1051");
    }

    #[tokio::test]
    async fn test_search_validation() {
        let cases = [
            json!({"productType": "Accommodation", "destination": "Cape Town"}),
            json!({"productType": "Group Tours", "dateFrom": "2025/01/01"}),
            json!({"productType": "Group Tours", "dateFrom": "2025-03-01", "dateTo": "2025-02-01"}),
            json!({"productType": "Group Tours", "roomConfigs": [{"Adults": 12}]}),
            json!({"productType": "Hovercraft"}),
        ];
        for case in cases {
            let (status, body) = call(
                app("<Reply/>"),
                Method::POST,
                "/api/tourplan/search",
                Some(case.clone()),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{case}");
            assert_eq!(body["error"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_search_returns_products() {
        let app = app("<Reply><OptionInfoReply><Option><Opt>NBOGTARP001CKSE</Opt><OptGeneral><Description>Classic Kenya</Description><LocalityDescription>Nairobi</LocalityDescription></OptGeneral></Option></OptionInfoReply></Reply>");
        let (status, body) = call(
            app,
            Method::POST,
            "/api/tourplan/search",
            Some(json!({"productType": "Guided group tours", "destination": "Nairobi"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"]["total"], 1);
        assert_eq!(body["data"]["outcome"]["products"][0]["code"], "NBOGTARP001CKSE");
        assert_eq!(body["data"]["searchCriteria"]["productType"], "Group Tours");
    }

    fn empty_search_transport() -> Arc<MockTransport> {
        Arc::new(MockTransport::replying(
            "<Reply><OptionInfoReply></OptionInfoReply></Reply>",
        ))
    }

    #[tokio::test]
    async fn test_search_fast_turns_slug_into_destination_name() {
        let transport = empty_search_transport();
        let (app, _) = app_with(Arc::clone(&transport));
        let (status, body) = call(
            app,
            Method::GET,
            "/api/tourplan/search-fast?productType=Day%20Tours&destination=south-africa",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["searchCriteria"]["destination"], "South Africa");

        let sent = &transport.requests()[0];
        assert!(sent.contains("<DestinationName>South Africa</DestinationName>"), "{sent}");
    }

    #[tokio::test]
    async fn test_search_body_slug_destination() {
        let transport = empty_search_transport();
        let (app, _) = app_with(Arc::clone(&transport));
        call(
            app,
            Method::POST,
            "/api/tourplan/search",
            Some(json!({"productType": "Day Tours", "destination": "victoria-falls"})),
        )
        .await;
        let sent = &transport.requests()[0];
        assert!(sent.contains("<DestinationName>Victoria Falls</DestinationName>"), "{sent}");
    }

    #[tokio::test]
    async fn test_search_fast_defaults_to_group_tours_over_two_years() {
        let transport = empty_search_transport();
        let (app, _) = app_with(Arc::clone(&transport));
        let (status, _) = call(app, Method::GET, "/api/tourplan/search-fast", None).await;
        assert_eq!(status, StatusCode::OK);

        let today = Utc::now().date_naive();
        let until = today.checked_add_months(Months::new(24)).unwrap();
        let sent = &transport.requests()[0];
        assert!(sent.contains("<ButtonName>Group Tours</ButtonName>"), "{sent}");
        assert!(sent.contains("<Info>GMFTD</Info>"), "{sent}");
        assert!(sent.contains(&format!(
            "<DateFrom>{}</DateFrom><DateTo>{}</DateTo>",
            today.format("%Y-%m-%d"),
            until.format("%Y-%m-%d")
        )));
    }

    #[tokio::test]
    async fn test_cruise_search_uses_cabin_configs() {
        let transport = empty_search_transport();
        let (app, _) = app_with(Arc::clone(&transport));
        call(
            app,
            Method::POST,
            "/api/tourplan/search",
            Some(json!({"productType": "Cruises", "cabinConfigs": [{"Adults": 3, "Children": 1}]})),
        )
        .await;
        let sent = &transport.requests()[0];
        assert!(sent.contains("<ButtonName>Cruises</ButtonName>"), "{sent}");
        assert!(
            sent.contains("<RoomConfig><Adults>3</Adults><Children>1</Children></RoomConfig>"),
            "{sent}"
        );
    }

    #[tokio::test]
    async fn test_room_configs_win_over_cabin_configs() {
        let transport = empty_search_transport();
        let (app, _) = app_with(Arc::clone(&transport));
        call(
            app,
            Method::POST,
            "/api/tourplan/search",
            Some(json!({
                "productType": "Cruises",
                "roomConfigs": [{"Adults": 1}],
                "cabinConfigs": [{"Adults": 3}]
            })),
        )
        .await;
        let sent = &transport.requests()[0];
        assert!(sent.contains("<RoomConfig><Adults>1</Adults></RoomConfig>"), "{sent}");
        assert!(!sent.contains("<Adults>3</Adults>"), "{sent}");
    }

    #[tokio::test]
    async fn test_search_fast_stats() {
        let (status, body) = call(
            app("<Reply/>"),
            Method::GET,
            "/api/tourplan/search-fast?stats=true",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cache"]["itemsCount"], 0);
    }

    #[tokio::test]
    async fn test_product_not_found() {
        let app = app("<Reply><OptionInfoReply></OptionInfoReply></Reply>");
        let (status, body) = call(app, Method::GET, "/api/tourplan/product/NOPE", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Product not found");
    }

    #[tokio::test]
    async fn test_pricing_calendar() {
        let (status, body) = call(
            app(PRICING_REPLY),
            Method::GET,
            "/api/tourplan/pricing/NBOGTARP001CKSE?dateFrom=2025-03-03&dateTo=2025-03-05",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let days = body["data"]["days"].as_array().unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[1]["available"], true);
        assert_eq!(days[1]["dayOfWeek"], "Tuesday");
    }

    #[tokio::test]
    async fn test_pricing_rejects_inverted_range() {
        let (status, _) = call(
            app("<Reply/>"),
            Method::GET,
            "/api/tourplan/pricing/X?dateFrom=2025-03-05&dateTo=2025-03-03",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_booking_lifecycle() {
        let transport = Arc::new(MockTransport::new(|xml, _| {
            if xml.contains("<AddServiceRequest>") {
                Ok(ADD_SERVICE_OK.to_string())
            } else if xml.contains("<CancelServicesRequest>") {
                Ok(
                    "<Reply><CancelServicesReply><Status>XX</Status></CancelServicesReply></Reply>"
                        .to_string(),
                )
            } else {
                Ok("<Reply/>".to_string())
            }
        }));
        let (app, state) = app_with(Arc::clone(&transport));

        let (status, body) = call(
            app.clone(),
            Method::POST,
            "/api/tourplan/booking",
            Some(json!({
                "customerName": "Jane Smith",
                "email": "jane@example.com",
                "productCode": "NBOGTARP001CKSE",
                "dateFrom": "2025-06-01",
                "adults": 2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["booking"]["reference"], "TIA-321");
        let local_id = body["data"]["localId"].as_str().unwrap().to_string();
        assert_eq!(state.ledger.get(&local_id).unwrap().status, BookingStatus::Confirmed);

        let (status, body) = call(
            app.clone(),
            Method::PATCH,
            &format!("/api/admin/bookings/{local_id}/payment"),
            Some(json!({"paymentStatus": "paid"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["paymentStatus"], "paid");

        let (status, body) =
            call(app.clone(), Method::DELETE, "/api/tourplan/booking/TIA-321", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["localBookingsCancelled"], 1);

        let (_, body) = call(app, Method::GET, "/api/admin/bookings", None).await;
        assert_eq!(body["data"][0]["status"], "cancelled");
    }

    #[tokio::test]
    async fn test_booking_validation() {
        let (status, body) = call(
            app(ADD_SERVICE_OK),
            Method::POST,
            "/api/tourplan/booking",
            Some(json!({"customerName": " ", "productCode": "X", "dateFrom": "2025-06-01"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "customerName: is required");
    }

    #[tokio::test]
    async fn test_payment_update_unknown_booking() {
        let (status, _) = call(
            app("<Reply/>"),
            Method::PATCH,
            "/api/admin/bookings/BK-missing/payment",
            Some(json!({"paymentStatus": "paid"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_catalog_routes() {
        let (status, body) =
            call(app("<Reply/>"), Method::GET, "/api/catalog/cruises?country=Botswana", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["products"].as_array().unwrap().len(), 6);
        assert_eq!(body["data"]["showsDestinationAndClass"], true);

        let (_, body) = call(app("<Reply/>"), Method::GET, "/api/catalog/regions", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_cache_clear() {
        let transport = Arc::new(MockTransport::new(|_, _| {
            Ok(option_reply("NBOGTARP001CKSE", "Classic Kenya"))
        }));
        let (app, state) = app_with(transport);
        call(app.clone(), Method::GET, "/api/tourplan/search-fast?destination=Nairobi", None).await;
        assert_eq!(state.cache.len(), 1);

        let (_, body) = call(app, Method::POST, "/api/cache/clear", None).await;
        assert_eq!(body["data"]["cleared"], 1);
        assert!(state.cache.is_empty());
    }

    #[tokio::test]
    async fn test_destinations_default_req_type() {
        let app = app("<Reply><GetServiceButtonDetailsReply><ClassDescriptions><ClassDescription>Deluxe</ClassDescription></ClassDescriptions></GetServiceButtonDetailsReply></Reply>");
        let (status, body) = call(
            app,
            Method::POST,
            "/api/tourplan/destinations",
            Some(json!({"countryName": "Kenya"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["reqType"], "Day Tours");
        assert_eq!(body["data"]["classesCount"], 1);
    }
}
