//! Checkout gate and payment-intent client.
//!
//! - `CheckoutGate` rate-limits, sanitises and price-checks a checkout form.
//! - `CheckoutClient` posts the gated form to the configured payment-intent endpoint.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::domain::{
    rates::ANODE_INSTALLATION_RATE, PriceCheckDetails, PriceRejection, PriceValidator, RateTable,
    ServiceInterval,
};

const USER_AGENT: &str = concat!("dive-estimator/", env!("CARGO_PKG_VERSION"));
const MAX_TEXT_LEN: usize = 1000;
pub const RATE_LIMIT_REQUESTS: u32 = 5;
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("too many requests, please try again later")]
    RateLimited,
    /// The rejection reason is kept for logs only.
    #[error("invalid price calculation")]
    InvalidPrice(PriceRejection),
    #[error("checkout endpoint is not configured")]
    Disabled,
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment service error: {0}")]
    Api(String),
}

/// Checkout form as posted by the booking screens.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    /// Service id or display name.
    pub service: String,
    pub estimate: f64,
    pub service_details: PriceCheckDetails,
    pub service_interval: ServiceInterval,
    pub customer_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_notes: String,
    pub boat_name: String,
    pub boat_make: String,
    pub boat_model: String,
    pub marina_name: String,
    pub slip_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
}

impl CheckoutForm {
    pub fn sanitized(mut self) -> Self {
        for field in [
            &mut self.customer_name,
            &mut self.customer_notes,
            &mut self.boat_name,
            &mut self.boat_make,
            &mut self.boat_model,
        ] {
            *field = sanitize(field);
        }
        for field in [&mut self.recovery_location, &mut self.item_description]
            .into_iter()
            .flatten()
        {
            *field = sanitize(field);
        }
        self
    }

    /// Lowercased e-mail, then the client address, then `unknown`.
    pub fn rate_limit_key(&self, client_addr: Option<&str>) -> String {
        let email = self.customer_email.trim();
        if !email.is_empty() {
            return email.to_lowercase();
        }
        client_addr
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .unwrap_or("unknown")
            .to_string()
    }
}

/// Strips angle brackets, trims and caps free text.
pub fn sanitize(text: &str) -> String {
    let stripped: String = text.chars().filter(|ch| !matches!(ch, '<' | '>')).collect();
    stripped.trim().chars().take(MAX_TEXT_LEN).collect()
}

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// `ORD-<unix millis>-<5 uppercase alphanumerics>`.
pub fn order_number(unix_millis: i128, suffix: &str) -> String {
    let suffix: String = suffix
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .take(5)
        .collect();
    format!("ORD-{unix_millis}-{suffix}")
}

fn next_order_number() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    order_number(millis, &uuid::Uuid::new_v4().simple().to_string())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentKind {
    /// Card is charged now.
    Payment,
    /// Card is saved for recurring service.
    Setup,
}

impl IntentKind {
    pub fn for_interval(interval: ServiceInterval) -> Self {
        if interval.is_recurring() {
            Self::Setup
        } else {
            Self::Payment
        }
    }
}

/// A form that passed the gate and is ready to post.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedCheckout {
    pub form: CheckoutForm,
    pub order_number: String,
    pub intent: IntentKind,
    /// Charged amount; `None` for setup intents.
    pub amount_cents: Option<i64>,
}

/// Fixed-window request counter per key.
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    entries: Mutex<HashMap<String, LimitWindow>>,
}

#[derive(Clone, Copy, Debug)]
struct LimitWindow {
    count: u32,
    reset_at: Instant,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_REQUESTS, RATE_LIMIT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// Keys with a live window.
    pub fn tracked_keys(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match entries.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.limit {
                    return false;
                }
                entry.count += 1;
                true
            }
            _ => {
                entries.retain(|_, window| now <= window.reset_at);
                entries.insert(
                    key.to_string(),
                    LimitWindow {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}

pub struct CheckoutGate {
    rates: Arc<RateTable>,
    minimum_charge: f64,
    anode_rate: f64,
    limiter: Arc<RateLimiter>,
}

impl CheckoutGate {
    pub fn new(rates: Arc<RateTable>, minimum_charge: f64) -> Self {
        Self {
            rates,
            minimum_charge,
            anode_rate: ANODE_INSTALLATION_RATE,
            limiter: Arc::new(RateLimiter::default()),
        }
    }

    pub fn with_anode_rate(mut self, anode_rate: f64) -> Self {
        self.anode_rate = anode_rate;
        self
    }

    /// Shares request counts with other gates built from the same limiter.
    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn prepare(
        &self,
        form: CheckoutForm,
        client_addr: Option<&str>,
    ) -> Result<PreparedCheckout, CheckoutError> {
        let key = form.rate_limit_key(client_addr);
        if !self.limiter.check(&key) {
            warn!(key = %key, "checkout rate limit hit");
            return Err(CheckoutError::RateLimited);
        }

        let form = form.sanitized();
        PriceValidator::new(&self.rates, self.minimum_charge)
            .with_anode_rate(self.anode_rate)
            .check(&form.service, form.estimate, &form.service_details)
            .map_err(|reason| {
                warn!(service = %form.service, %reason, "checkout rejected");
                CheckoutError::InvalidPrice(reason)
            })?;

        let intent = IntentKind::for_interval(form.service_interval);
        let amount_cents = (intent == IntentKind::Payment).then(|| to_cents(form.estimate));
        Ok(PreparedCheckout {
            order_number: next_order_number(),
            intent,
            amount_cents,
            form,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
    pub intent_type: IntentKind,
    #[serde(default)]
    pub order_id: Option<String>,
    pub order_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntentEnvelope {
    Ok(IntentResponse),
    Err { error: String },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntentRequest<'a> {
    form_data: &'a CheckoutForm,
    order_number: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    amount_cents: Option<i64>,
}

#[derive(Clone)]
pub struct CheckoutClient {
    http: Client,
    endpoint: Url,
}

impl CheckoutClient {
    pub fn new(endpoint: &str) -> Result<Self, CheckoutError> {
        if endpoint.trim().is_empty() {
            return Err(CheckoutError::Disabled);
        }
        let endpoint = Url::parse(endpoint.trim())?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn from_settings(endpoint: Option<&str>) -> Result<Self, CheckoutError> {
        endpoint
            .ok_or(CheckoutError::Disabled)
            .and_then(Self::new)
    }

    pub async fn submit(&self, prepared: &PreparedCheckout) -> Result<IntentResponse, CheckoutError> {
        let body = IntentRequest {
            form_data: &prepared.form,
            order_number: &prepared.order_number,
            amount_cents: prepared.amount_cents,
        };

        info!(
            order = %prepared.order_number,
            intent = ?prepared.intent,
            "posting checkout to {}",
            self.endpoint
        );

        // Error bodies come back with 4xx, so the status is not checked before decoding.
        let response = self.http.post(self.endpoint.clone()).json(&body).send().await?;
        let status = response.status();
        let envelope: IntentEnvelope = response.json().await?;

        match envelope {
            IntentEnvelope::Ok(intent) if status.is_success() => Ok(intent),
            IntentEnvelope::Ok(_) => Err(CheckoutError::Api(status.to_string())),
            IntentEnvelope::Err { error } => Err(CheckoutError::Api(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    fn gate() -> CheckoutGate {
        CheckoutGate::new(Arc::new(RateTable::builtin().clone()), 150.0)
    }

    fn form(service: &str, estimate: f64, feet: Option<f64>) -> CheckoutForm {
        CheckoutForm {
            service: service.to_string(),
            estimate,
            service_details: PriceCheckDetails {
                boat_length_feet: feet,
                ..PriceCheckDetails::default()
            },
            customer_email: "Skipper@Example.com".to_string(),
            customer_name: "  <b>Skipper</b> ".to_string(),
            ..CheckoutForm::default()
        }
    }

    #[test]
    fn sanitizes_free_text() {
        assert_eq!(sanitize("  <script>hi</script> "), "scripthi/script");
        assert_eq!(sanitize(&"x".repeat(1500)).len(), 1000);
        let cleaned = form("item_recovery", 199.0, None).sanitized();
        assert_eq!(cleaned.customer_name, "bSkipper/b");
    }

    #[test]
    fn amounts_become_cents() {
        assert_eq!(to_cents(580.0), 58_000);
        assert_eq!(to_cents(199.99), 19_999);
        assert_eq!(to_cents(0.1 + 0.2), 30);
    }

    #[test]
    fn order_numbers_are_stamped() {
        assert_eq!(order_number(1_700_000_000_000, "a1-b2c3d4"), "ORD-1700000000000-A1B2C");
        let generated = next_order_number();
        let suffix = generated.rsplit('-').next().unwrap();
        assert!(generated.starts_with("ORD-"));
        assert_eq!(suffix.len(), 5);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn limiter_resets_after_window() {
        let limiter = RateLimiter::new(5, Duration::from_secs(900));
        let start = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at("skipper@example.com", start));
        }
        assert!(!limiter.check_at("skipper@example.com", start + Duration::from_secs(60)));
        assert!(limiter.check_at("other@example.com", start));
        assert!(limiter.check_at("skipper@example.com", start + Duration::from_secs(901)));
    }

    #[test]
    fn limiter_forgets_expired_windows() {
        let limiter = RateLimiter::new(5, Duration::from_millis(1));
        let start = Instant::now();
        for n in 0..10_000 {
            assert!(limiter.check_at(&format!("customer-{n}@example.com"), start));
        }
        assert_eq!(limiter.tracked_keys(), 10_000);

        assert!(limiter.check_at("late@example.com", start + Duration::from_secs(3600)));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn rate_limit_key_falls_back() {
        let mut anonymous = CheckoutForm::default();
        assert_eq!(anonymous.rate_limit_key(Some("10.0.0.7")), "10.0.0.7");
        assert_eq!(anonymous.rate_limit_key(None), "unknown");
        anonymous.customer_email = " Jo@Example.COM ".to_string();
        assert_eq!(anonymous.rate_limit_key(Some("10.0.0.7")), "jo@example.com");
    }

    #[test]
    fn gate_decides_intent_kind() {
        let gate = gate();
        let one_time = gate
            .prepare(form("onetime_cleaning", 580.0, Some(35.0)), None)
            .unwrap();
        assert_eq!(one_time.intent, IntentKind::Payment);
        assert_eq!(one_time.amount_cents, Some(58_000));

        let mut recurring = form("Recurring Cleaning & Anodes", 180.0, Some(40.0));
        recurring.service_interval = ServiceInterval::Quarterly;
        let recurring = gate.prepare(recurring, None).unwrap();
        assert_eq!(recurring.intent, IntentKind::Setup);
        assert_eq!(recurring.amount_cents, None);
    }

    #[test]
    fn gate_rejects_with_generic_message() {
        let err = gate()
            .prepare(form("onetime_cleaning", 58_000.0, Some(35.0)), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid price calculation");
        assert!(matches!(
            err,
            CheckoutError::InvalidPrice(PriceRejection::OutOfRange { .. })
        ));
    }

    #[test]
    fn gate_allows_declared_anode_labor() {
        let gate = gate().with_anode_rate(15.0);
        let mut bulk = form("anodes_only", 765.0, None);
        assert!(matches!(
            gate.prepare(bulk.clone(), Some("10.0.0.1")),
            Err(CheckoutError::InvalidPrice(_))
        ));
        bulk.service_details.anodes_to_install = 41;
        let prepared = gate.prepare(bulk, Some("10.0.0.1")).unwrap();
        assert_eq!(prepared.amount_cents, Some(76_500));
    }

    #[test]
    fn gate_rate_limits_per_customer() {
        let gate = gate();
        for _ in 0..5 {
            gate.prepare(form("item_recovery", 199.0, None), None).unwrap();
        }
        assert!(matches!(
            gate.prepare(form("item_recovery", 199.0, None), None),
            Err(CheckoutError::RateLimited)
        ));
    }

    #[test]
    fn gates_can_share_a_limiter() {
        let limiter = Arc::new(RateLimiter::new(1, RATE_LIMIT_WINDOW));
        let first = gate().with_limiter(limiter.clone());
        let second = gate().with_limiter(limiter);
        first.prepare(form("item_recovery", 199.0, None), None).unwrap();
        assert!(matches!(
            second.prepare(form("item_recovery", 199.0, None), None),
            Err(CheckoutError::RateLimited)
        ));
    }

    #[test]
    fn client_requires_endpoint() {
        assert!(matches!(
            CheckoutClient::from_settings(None),
            Err(CheckoutError::Disabled)
        ));
        assert!(matches!(
            CheckoutClient::new("  "),
            Err(CheckoutError::Disabled)
        ));
        assert!(matches!(
            CheckoutClient::new("not a url"),
            Err(CheckoutError::InvalidUrl(_))
        ));
    }

    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}/create-payment-intent")
    }

    #[tokio::test]
    async fn submit_decodes_intent() {
        let endpoint = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"clientSecret":"pi_secret","intentType":"payment","orderId":"42","orderNumber":"ORD-1-ABCDE"}"#,
        )
        .await;
        let prepared = gate()
            .prepare(form("onetime_cleaning", 580.0, Some(35.0)), None)
            .unwrap();
        let response = CheckoutClient::new(&endpoint)
            .unwrap()
            .submit(&prepared)
            .await
            .unwrap();
        assert_eq!(response.client_secret, "pi_secret");
        assert_eq!(response.intent_type, IntentKind::Payment);
        assert_eq!(response.order_id.as_deref(), Some("42"));
    }

    #[tokio::test]
    async fn submit_surfaces_api_errors() {
        let endpoint = serve_once(
            "HTTP/1.1 400 Bad Request",
            r#"{"error":"Card declined"}"#,
        )
        .await;
        let prepared = gate()
            .prepare(form("item_recovery", 199.0, None), None)
            .unwrap();
        let err = CheckoutClient::new(&endpoint)
            .unwrap()
            .submit(&prepared)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Api(message) if message == "Card declined"));
    }
}
