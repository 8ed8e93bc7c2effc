// hostConnect client: XML over HTTP POST with retry and batched product lookups
use crate::types::{
    AgentInfo, BookingConfirmation, BookingDetails, ButtonDetails, Credentials, NewBooking,
    Product, RoomConfig, SearchCriteria, ServiceRequest,
};
use crate::xml_request::{InfoLevel, RequestBuilder, XmlError};
use crate::xml_response::{self, OptionInfo, ParsedOption, ReplyError, VendorError};
use async_trait::async_trait;
use chrono::{Months, Utc};
use futures::future::join_all;
use reqwest::header::CONTENT_TYPE;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

const BATCH_CONCURRENCY: usize = 3;
const BATCH_DELAY: Duration = Duration::from_millis(100);
const MAX_ERROR_BODY: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error(transparent)]
    Vendor(#[from] VendorError),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error(transparent)]
    Xml(#[from] XmlError),
}

impl ApiError {
    // Vendor and XML errors are deterministic, resending cannot help
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::NetworkError(_) | ApiError::Timeout(_) => true,
            ApiError::ApiResponseError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

impl From<ReplyError> for ApiError {
    fn from(error: ReplyError) -> Self {
        match error {
            ReplyError::Vendor(e) => ApiError::Vendor(e),
            ReplyError::Xml(e) => ApiError::Xml(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub timeout_ms: u64,
    pub retry_config: RetryConfig,
}

/// Moves one XML document to hostConnect and returns the raw reply body.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn post_xml(&self, xml: String) -> Result<String, ApiError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    timeout_ms: u64,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            timeout_ms,
        })
    }
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_xml(&self, xml: String) -> Result<String, ApiError> {
        let response = self
            .http
            .post(&self.base_url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(xml)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout(self.timeout_ms)
                } else {
                    ApiError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::ApiResponseError {
                status_code: status.as_u16(),
                message: truncate_body(&body),
            });
        }
        Ok(body)
    }
}

#[derive(Clone)]
pub struct TourPlanClient {
    transport: Arc<dyn Transport>,
    builder: RequestBuilder,
    retry_config: RetryConfig,
}

impl TourPlanClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.base_url, config.timeout_ms)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config.credentials,
            config.retry_config,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        credentials: Credentials,
        retry_config: RetryConfig,
    ) -> Self {
        Self {
            transport,
            builder: RequestBuilder::new(credentials),
            retry_config,
        }
    }

    // Helper to calculate exponential backoff with jitter
    pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
        let base_backoff_ms = (config.initial_backoff_ms as f64
            * config.backoff_multiplier.powf(retry_attempt as f64))
        .min(config.max_backoff_ms as f64);

        let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
        let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

        Duration::from_millis(backoff_ms as u64)
    }

    /// Send with retry on transport failures. Vendor replies are returned as-is for parsing.
    async fn send(&self, kind: &'static str, xml: String) -> Result<String, ApiError> {
        let max_attempts = self.retry_config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            let started = Instant::now();
            let result = self.transport.post_xml(xml.clone()).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(body) => {
                    debug!(kind, attempt, elapsed_ms, bytes = body.len(), "hostConnect reply");
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let wait = Self::calculate_backoff(attempt, &self.retry_config);
                    warn!(
                        kind,
                        attempt,
                        elapsed_ms,
                        error = %e,
                        wait_ms = wait.as_millis() as u64,
                        "retrying hostConnect request"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!(
                        kind,
                        attempts = attempt + 1,
                        error = %e,
                        "hostConnect retries exhausted"
                    );
                    return Err(ApiError::RetriesExhausted {
                        attempts: attempt + 1,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn ping(&self) -> Result<(), ApiError> {
        let reply = self.send("PingRequest", self.builder.ping()?).await?;
        Ok(xml_response::parse_ping(&reply)?)
    }

    pub async fn agent_info(&self) -> Result<AgentInfo, ApiError> {
        let reply = self.send("AgentInfoRequest", self.builder.agent_info()?).await?;
        Ok(xml_response::parse_agent_info(&reply)?)
    }

    pub async fn service_button_details(
        &self,
        button_name: &str,
    ) -> Result<ButtonDetails, ApiError> {
        let xml = self.builder.service_button_details(button_name)?;
        let reply = self.send("GetServiceButtonDetailsRequest", xml).await?;
        Ok(xml_response::parse_button_details(&reply)?)
    }

    pub async fn search_options(&self, criteria: &SearchCriteria) -> Result<OptionInfo, ApiError> {
        let xml = self.builder.search(criteria)?;
        let reply = self.send("OptionInfoRequest", xml).await?;
        let info = xml_response::parse_option_info(&reply)?;
        info!(
            product_type = %criteria.product_type,
            options = info.options.len(),
            "search returned options"
        );
        Ok(info)
    }

    async fn single_option(
        &self,
        code: &str,
        level: InfoLevel,
        date_from: Option<&str>,
        date_to: Option<&str>,
        room_configs: &[RoomConfig],
    ) -> Result<ParsedOption, ApiError> {
        let xml = self
            .builder
            .option_info(code, level, date_from, date_to, room_configs)?;
        let reply = self.send("OptionInfoRequest", xml).await?;
        xml_response::parse_option_info(&reply)?
            .options
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Vendor(VendorError::from_detail(&format!(
                "{} no option returned for {}",
                VendorError::PRODUCT_NOT_FOUND,
                code
            ))))
    }

    pub async fn product_details(&self, code: &str) -> Result<ParsedOption, ApiError> {
        self.single_option(code, InfoLevel::Details, None, None, &[])
            .await
    }

    pub async fn product_pricing(
        &self,
        code: &str,
        date_from: &str,
        date_to: &str,
        room_configs: &[RoomConfig],
    ) -> Result<ParsedOption, ApiError> {
        self.single_option(
            code,
            InfoLevel::Pricing,
            Some(date_from),
            Some(date_to),
            room_configs,
        )
        .await
    }

    /// Summary lookups for many codes, a few at a time. Codes that fail are skipped.
    pub async fn batch_products(&self, codes: &[&str]) -> Vec<Product> {
        let today = Utc::now().date_naive();
        let date_from = today.format("%Y-%m-%d").to_string();
        let date_to = (today + Months::new(12)).format("%Y-%m-%d").to_string();

        let mut products = Vec::with_capacity(codes.len());
        for (index, chunk) in codes.chunks(BATCH_CONCURRENCY).enumerate() {
            if index > 0 {
                tokio::time::sleep(BATCH_DELAY).await;
            }
            let lookups = chunk.iter().map(|code| {
                self.single_option(code, InfoLevel::Summary, Some(&date_from), Some(&date_to), &[])
            });
            for (code, result) in chunk.iter().zip(join_all(lookups).await) {
                match result {
                    Ok(option) => products.push(option.product),
                    Err(e) => warn!(code = %code, error = %e, "dropping product from batch"),
                }
            }
        }
        products
    }

    pub async fn add_service(
        &self,
        service: &ServiceRequest,
        new_booking: Option<&NewBooking>,
        booking_id: Option<&str>,
    ) -> Result<BookingConfirmation, ApiError> {
        let xml = self.builder.add_service(service, new_booking, booking_id)?;
        let reply = self.send("AddServiceRequest", xml).await?;
        let confirmation = xml_response::parse_add_service(&reply)?;
        info!(
            booking_id = %confirmation.booking_id,
            reference = %confirmation.reference,
            product = %service.product_code,
            "service added"
        );
        Ok(confirmation)
    }

    pub async fn get_booking(&self, booking_id: &str) -> Result<BookingDetails, ApiError> {
        let reply = self
            .send("GetBookingRequest", self.builder.get_booking(booking_id)?)
            .await?;
        Ok(xml_response::parse_get_booking(&reply)?)
    }

    pub async fn quote_to_book(
        &self,
        booking_id: &str,
        send_supplier_message: bool,
    ) -> Result<String, ApiError> {
        let xml = self.builder.quote_to_book(booking_id, send_supplier_message)?;
        let reply = self.send("QuoteToBookRequest", xml).await?;
        Ok(xml_response::parse_quote_to_book(&reply)?)
    }

    pub async fn cancel_services(&self, reference: &str) -> Result<String, ApiError> {
        let xml = self.builder.cancel_services(reference)?;
        let reply = self.send("CancelServicesRequest", xml).await?;
        Ok(xml_response::parse_cancel_services(&reply)?)
    }
}

// Canned hostConnect for client, service and route tests
#[cfg(test)]
pub mod mock_transport {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Handler = Box<dyn Fn(&str, usize) -> Result<String, ApiError> + Send + Sync>;

    pub struct MockTransport {
        handler: Handler,
        calls: AtomicUsize,
        requests: Mutex<Vec<String>>,
    }

    impl MockTransport {
        /// `handler` receives the request XML and the zero-based call number.
        pub fn new<F>(handler: F) -> Self
        where
            F: Fn(&str, usize) -> Result<String, ApiError> + Send + Sync + 'static,
        {
            Self {
                handler: Box::new(handler),
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(xml: &'static str) -> Self {
            Self::new(move |_, _| Ok(xml.to_string()))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_xml(&self, xml: String) -> Result<String, ApiError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = (self.handler)(&xml, call);
            self.requests.lock().push(xml);
            result
        }
    }

    pub fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    pub fn client_with(transport: Arc<MockTransport>) -> TourPlanClient {
        TourPlanClient::with_transport(
            transport,
            Credentials {
                agent_id: "SAMAGT".to_string(),
                password: "S3cret".to_string(),
            },
            fast_retry(),
        )
    }

    pub fn option_reply(code: &str, name: &str) -> String {
        format!(
            "<Reply><OptionInfoReply><Option><Opt>{}</Opt><OptGeneral><Description>{}</Description></OptGeneral></Option></OptionInfoReply></Reply>",
            code, name
        )
    }
}
