//! Tebex plugin API client.
//!
//! A thin pass-through to the storefront's plugin API: every call sends the
//! server secret, checks for the one status code the endpoint documents as
//! success and decodes the body into typed models. The API is loose about types
//! (amounts arrive as strings or numbers, empty maps arrive as `[]`), so the models
//! accept both shapes and fall back to empty defaults for missing fields.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, fmt, time::Duration};
use tracing::{debug, instrument, warn};

/// Production endpoint of the Tebex plugin API.
pub const DEFAULT_TEBEX_BASE_URL: &str = "https://plugin.tebex.io";

/// Header carrying the game server secret key.
pub const SECRET_HEADER: &str = "X-Tebex-Secret";

/// A price or total as Tebex sends it: sometimes a JSON string, sometimes a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    /// Numeric amount
    Number(f64),
    /// Amount already formatted by the API
    Text(String),
}

impl Default for Amount {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A completed or pending payment, from `GET /payments/{transaction}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Payment {
    /// Amount paid
    pub amount: Amount,
    /// Payment status, e.g. "Complete"
    pub status: String,
    /// When the payment was made, as sent by the API
    pub date: String,
    /// Currency the payment was made in
    pub currency: Option<Currency>,
    /// Player the payment was made for
    pub player: PaymentPlayer,
    /// Packages bought in this payment
    pub packages: Vec<PaymentPackage>,
}

impl Payment {
    /// Package names joined for display.
    #[must_use]
    pub fn package_names(&self) -> String {
        self.packages
            .iter()
            .map(|package| package.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Currency attached to a payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Currency {
    /// ISO 4217 code
    pub iso_4217: String,
    /// Display symbol
    pub symbol: String,
}

/// Player reference embedded in a payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentPlayer {
    /// In-game name
    pub name: String,
    /// Player UUID, when the game has one
    pub uuid: Option<String>,
}

/// Package line of a payment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentPackage {
    /// Package id
    pub id: u64,
    /// Package name at the time of purchase
    pub name: String,
}

/// A package in the store catalog, from `GET /packages`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Package id used by `updateproduct` and `createurl`
    pub id: u64,
    /// Display name
    pub name: String,
    /// Current price
    pub price: Amount,
    /// Whether the package is hidden from the store
    pub disabled: bool,
}

/// A player lookup, from `GET /user/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerLookup {
    /// The player record
    pub player: LookupPlayer,
    /// Number of bans on record
    pub ban_count: u64,
    /// Share of payments charged back
    pub chargeback_rate: Amount,
    /// Lifetime spend per currency code
    #[serde(deserialize_with = "purchase_totals")]
    pub purchase_totals: BTreeMap<String, Amount>,
}

/// Player record inside a lookup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LookupPlayer {
    /// In-game username
    pub username: String,
}

/// Body of `PUT /package/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageUpdate {
    /// Hide the package from the store
    pub disabled: bool,
    /// New display name
    pub name: String,
    /// New price
    pub price: f64,
}

#[derive(Debug, Serialize)]
struct CheckoutRequest<'a> {
    package_id: &'a str,
    username: &'a str,
}

/// A checkout link, from `POST /checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Checkout {
    /// Link the player opens to pay
    pub url: String,
    /// When the link stops working, as sent by the API
    pub expires: String,
}

/// Tebex sends `[]` instead of `{}` when a player has no purchases.
fn purchase_totals<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Totals {
        Map(BTreeMap<String, Amount>),
        List(Vec<serde_json::Value>),
    }

    Ok(match Totals::deserialize(deserializer)? {
        Totals::Map(totals) => totals,
        Totals::List(_) => BTreeMap::new(),
    })
}

/// Parses the timestamps Tebex sends (RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Client for the Tebex plugin API.
#[derive(Clone)]
pub struct TebexClient {
    http: Client,
    base_url: Url,
    secret: String,
}

impl fmt::Debug for TebexClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TebexClient")
            .field("base_url", &self.base_url.as_str())
            .field("secret", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TebexClient {
    /// Builds a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, secret: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Config {
            message: format!("Invalid Tebex base URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config {
                message: format!("Tebex base URL '{base_url}' cannot hold paths"),
            });
        }

        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(Error::Config {
                message: "Tebex secret cannot be empty".to_string(),
            });
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            secret,
        })
    }

    /// Looks up a payment by its transaction id (`tbx-...`).
    #[instrument(skip(self))]
    pub async fn payment(&self, transaction_id: &str) -> Result<Payment> {
        let url = self.endpoint(&["payments", require_id("transaction id", transaction_id)?])?;
        self.fetch(self.http.get(url.clone()), &url, StatusCode::OK)
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Lists every package in the store catalog.
    #[instrument(skip(self))]
    pub async fn packages(&self) -> Result<Vec<Package>> {
        let url = self.endpoint(&["packages"])?;
        self.fetch(self.http.get(url.clone()), &url, StatusCode::OK)
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Looks up a player by Tebex id (not a transaction id).
    #[instrument(skip(self))]
    pub async fn player(&self, tebex_id: &str) -> Result<PlayerLookup> {
        let url = self.endpoint(&["user", require_id("Tebex id", tebex_id)?])?;
        self.fetch(self.http.get(url.clone()), &url, StatusCode::OK)
            .await?
            .json()
            .await
            .map_err(Into::into)
    }

    /// Renames, reprices and enables or disables a package.
    #[instrument(skip(self))]
    pub async fn update_package(&self, package_id: u64, update: &PackageUpdate) -> Result<()> {
        if !update.price.is_finite() || update.price < 0.0 {
            return Err(Error::InvalidArgument {
                message: format!("price must be a non-negative number (got {})", update.price),
            });
        }
        let url = self.endpoint(&["package", &package_id.to_string()])?;
        self.fetch(
            self.http.put(url.clone()).json(update),
            &url,
            StatusCode::NO_CONTENT,
        )
        .await?;
        Ok(())
    }

    /// Creates a checkout link for `username` to buy `package_id`.
    #[instrument(skip(self))]
    pub async fn create_checkout(&self, package_id: &str, username: &str) -> Result<Checkout> {
        let request = CheckoutRequest {
            package_id: require_id("package id", package_id)?,
            username: require_id("Tebex id", username)?,
        };
        let url = self.endpoint(&["checkout"])?;
        self.fetch(
            self.http.post(url.clone()).json(&request),
            &url,
            StatusCode::CREATED,
        )
        .await?
        .json()
        .await
        .map_err(Into::into)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config {
                message: format!("Tebex base URL '{}' cannot hold paths", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn fetch(
        &self,
        request: RequestBuilder,
        url: &Url,
        expected: StatusCode,
    ) -> Result<reqwest::Response> {
        let response = request.header(SECRET_HEADER, &self.secret).send().await?;
        let status = response.status();
        debug!(%status, endpoint = url.path(), "Tebex responded");

        if status != expected {
            warn!(%status, %expected, endpoint = url.path(), "Unexpected Tebex status");
            return Err(Error::TebexStatus {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

fn require_id<'a>(what: &str, id: &'a str) -> Result<&'a str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument {
            message: format!("{what} cannot be empty"),
        });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::JoinHandle,
    };

    const SECRET: &str = "s3cret";

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .find_map(|line| {
                        line.to_ascii_lowercase()
                            .strip_prefix("content-length:")
                            .map(|value| value.trim().parse::<usize>().unwrap())
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Serves a single canned response and hands back the raw request it received.
    async fn serve_once(response: String) -> (TebexClient, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        let client =
            TebexClient::new(&format!("http://{addr}"), SECRET, Duration::from_secs(5)).unwrap();
        (client, handle)
    }

    #[test]
    fn test_client_rejects_bad_configuration() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            TebexClient::new("not a url", SECRET, timeout),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            TebexClient::new("mailto:ops@example.com", SECRET, timeout),
            Err(Error::Config { .. })
        ));
        assert!(matches!(
            TebexClient::new(DEFAULT_TEBEX_BASE_URL, "  ", timeout),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn test_endpoint_escapes_ids() -> Result<()> {
        let client = TebexClient::new(DEFAULT_TEBEX_BASE_URL, SECRET, Duration::from_secs(1))?;
        let url = client.endpoint(&["payments", "tbx-1/../packages"])?;
        assert_eq!(
            url.as_str(),
            "https://plugin.tebex.io/payments/tbx-1%2F..%2Fpackages"
        );
        Ok(())
    }

    #[test]
    fn test_debug_redacts_secret() -> Result<()> {
        let client = TebexClient::new(DEFAULT_TEBEX_BASE_URL, SECRET, Duration::from_secs(1))?;
        let debug = format!("{client:?}");
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
        Ok(())
    }

    #[test]
    fn test_payment_model_tolerates_string_amounts() {
        let json = r#"{
            "id": 1,
            "amount": "12.50",
            "date": "2023-06-01T10:15:00+00:00",
            "status": "Complete",
            "currency": {"iso_4217": "JPY", "symbol": "¥"},
            "player": {"id": 9, "name": "Taro", "uuid": null},
            "packages": [{"id": 10, "name": "VIP"}, {"id": 11, "name": "Car"}]
        }"#;
        let payment: Payment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.amount.to_string(), "12.50");
        assert_eq!(payment.player.name, "Taro");
        assert_eq!(payment.package_names(), "VIP, Car");
        assert_eq!(payment.currency.unwrap().iso_4217, "JPY");
    }

    #[test]
    fn test_payment_model_defaults_missing_fields() {
        let payment: Payment = serde_json::from_str(r#"{"amount": 3}"#).unwrap();
        assert_eq!(payment.amount, Amount::Number(3.0));
        assert!(payment.status.is_empty());
        assert!(payment.package_names().is_empty());
    }

    #[test]
    fn test_player_lookup_accepts_empty_list_totals() {
        let empty: PlayerLookup = serde_json::from_str(
            r#"{"player": {"id": "abc", "username": "Taro"}, "banCount": 0, "chargebackRate": 0, "purchaseTotals": []}"#,
        )
        .unwrap();
        assert_eq!(empty.player.username, "Taro");
        assert!(empty.purchase_totals.is_empty());

        let spent: PlayerLookup = serde_json::from_str(
            r#"{"player": {"username": "Hanako"}, "banCount": 2, "chargebackRate": "0.5", "purchaseTotals": {"USD": 15.5, "JPY": "2000"}}"#,
        )
        .unwrap();
        assert_eq!(spent.ban_count, 2);
        assert_eq!(spent.chargeback_rate.to_string(), "0.5");
        assert_eq!(spent.purchase_totals["USD"], Amount::Number(15.5));
        assert_eq!(spent.purchase_totals["JPY"].to_string(), "2000");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc = parse_timestamp("2023-06-01T10:15:00+09:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2023-06-01T01:15:00+00:00");

        let plain = parse_timestamp("2023-06-01 10:15:00").unwrap();
        assert_eq!(plain.to_rfc3339(), "2023-06-01T10:15:00+00:00");

        assert!(parse_timestamp("next tuesday").is_none());
    }

    #[tokio::test]
    async fn test_payment_sends_secret_and_decodes() -> Result<()> {
        let body = r#"{"amount": "5.00", "status": "Complete", "date": "2023-06-01 10:15:00", "player": {"name": "Taro"}, "packages": [{"id": 1, "name": "VIP"}]}"#;
        let (client, server) = serve_once(http_response("200 OK", body)).await;

        let payment = client.payment(" tbx-123 ").await?;
        assert_eq!(payment.status, "Complete");
        assert_eq!(payment.package_names(), "VIP");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /payments/tbx-123 HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-tebex-secret: s3cret"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unexpected_status_is_reported() -> Result<()> {
        let (client, server) =
            serve_once(http_response("404 Not Found", r#"{"error_code": 404}"#)).await;

        let result = client.payment("tbx-missing").await;
        assert!(matches!(
            result,
            Err(Error::TebexStatus { status: 404, ref endpoint }) if endpoint == "/payments/tbx-missing"
        ));
        server.await.unwrap();
        Ok(())
    }

    #[tokio::test]
    async fn test_update_package_puts_json_and_expects_no_content() -> Result<()> {
        let (client, server) = serve_once(http_response("204 No Content", "")).await;

        let update = PackageUpdate {
            disabled: true,
            name: "VIP Apartment".to_string(),
            price: 12.5,
        };
        client.update_package(42, &update).await?;

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /package/42 HTTP/1.1"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({"disabled": true, "name": "VIP Apartment", "price": 12.5})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_package_rejects_bad_price_without_calling_api() -> Result<()> {
        let client = TebexClient::new(DEFAULT_TEBEX_BASE_URL, SECRET, Duration::from_secs(1))?;
        for price in [-1.0, f64::NAN, f64::INFINITY] {
            let update = PackageUpdate {
                disabled: false,
                name: "VIP".to_string(),
                price,
            };
            assert!(matches!(
                client.update_package(1, &update).await,
                Err(Error::InvalidArgument { .. })
            ));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_create_checkout_posts_and_expects_created() -> Result<()> {
        let body = r#"{"url": "https://checkout.tebex.io/abc", "expires": "2023-06-02T10:15:00+00:00"}"#;
        let (client, server) = serve_once(http_response("201 Created", body)).await;

        let checkout = client.create_checkout("1234", "Taro").await?;
        assert_eq!(checkout.url, "https://checkout.tebex.io/abc");
        assert!(parse_timestamp(&checkout.expires).is_some());

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /checkout HTTP/1.1"));
        let body = request.split("\r\n\r\n").nth(1).unwrap();
        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({"package_id": "1234", "username": "Taro"})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_packages_lists_catalog() -> Result<()> {
        let body = r#"[{"id": 1, "name": "VIP", "price": "10.00"}, {"id": 2, "name": "Car", "price": 25, "disabled": true}]"#;
        let (client, server) = serve_once(http_response("200 OK", body)).await;

        let packages = client.packages().await?;
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].price.to_string(), "10.00");
        assert!(!packages[0].disabled);
        assert!(packages[1].disabled);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /packages HTTP/1.1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_ids_are_rejected() {
        let client =
            TebexClient::new(DEFAULT_TEBEX_BASE_URL, SECRET, Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.payment("  ").await,
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.player("").await,
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            client.create_checkout("1", " ").await,
            Err(Error::InvalidArgument { .. })
        ));
    }
}
