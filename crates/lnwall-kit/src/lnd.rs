//! An [`InvoiceClient`] backed by lnd's REST interface.
//!
//! ```no_run
//! use lnwall_kit::lnd::{LndClient, LndOptions};
//!
//! let client = LndClient::new(
//!     LndOptions::builder()
//!         .address("localhost:8080")
//!         .cert_file("/home/user/.lnd/tls.cert")
//!         .macaroon_file("/home/user/.lnd/data/chain/bitcoin/mainnet/invoice.macaroon")
//!         .build(),
//! )
//! .expect("lnd credentials should be readable");
//! ```

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bon::Builder;
use lnwall_core::{
    client::InvoiceClient,
    errors::ClientError,
    types::{Invoice, PaymentHash, Preimage, Sats},
};
use reqwest::{
    Certificate, StatusCode,
    header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue},
};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ADDRESS: &str = "localhost:8080";
pub const DEFAULT_CERT_FILE: &str = "tls.cert";
pub const DEFAULT_MACAROON_FILE: &str = "invoice.macaroon";

/// lnd answers lookups for unknown hashes with this message.
const INVOICE_NOT_FOUND: &str = "unable to locate invoice";

/// gRPC `NotFound`, as reported in the `code` field of gateway errors.
const GRPC_NOT_FOUND: i32 = 5;

/// Connection options for an lnd node.
///
/// Empty fields fall back to the `DEFAULT_*` constants of this module, so a partially filled
/// configuration file is enough.
#[derive(Builder, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LndOptions {
    /// Address of the node's REST listener, including the port.
    ///
    /// Plain `host:port` values are reached over HTTPS.
    #[builder(into, default = DEFAULT_ADDRESS.to_string())]
    pub address: String,
    /// Path to the `tls.cert` file the node serves.
    #[builder(into, default = PathBuf::from(DEFAULT_CERT_FILE))]
    pub cert_file: PathBuf,
    /// Path to a macaroon allowed to create and read invoices.
    #[builder(into, default = PathBuf::from(DEFAULT_MACAROON_FILE))]
    pub macaroon_file: PathBuf,
    /// Overall timeout for each request to the node, in seconds.
    pub timeout_secs: Option<u64>,
}

impl Default for LndOptions {
    fn default() -> Self {
        LndOptions::builder().build()
    }
}

impl LndOptions {
    /// Replace empty fields with their defaults.
    pub fn with_defaults(mut self) -> Self {
        if self.address.is_empty() {
            self.address = DEFAULT_ADDRESS.to_string();
        }
        if self.cert_file.as_os_str().is_empty() {
            self.cert_file = PathBuf::from(DEFAULT_CERT_FILE);
        }
        if self.macaroon_file.as_os_str().is_empty() {
            self.macaroon_file = PathBuf::from(DEFAULT_MACAROON_FILE);
        }
        self
    }

    /// Base URL of the REST interface.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        if self.address.starts_with("https://") || self.address.starts_with("http://") {
            Url::parse(&self.address)
        } else {
            Url::parse(&format!("https://{}", self.address))
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LndClientError {
    #[error("Failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid macaroon header value: {0}")]
    InvalidMacaroon(#[from] InvalidHeaderValue),
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("HTTP request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),
    #[error("lnd responded with {status}: {message}")]
    NodeError { status: StatusCode, message: String },
}

impl From<LndClientError> for ClientError {
    fn from(err: LndClientError) -> Self {
        ClientError::unavailable(err)
    }
}

#[derive(Debug, Clone, Serialize)]
struct AddInvoiceRequest<'a> {
    value: Sats,
    memo: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct AddInvoiceResponse {
    payment_request: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct LookupInvoiceResponse {
    settled: bool,
    state: String,
}

impl LookupInvoiceResponse {
    fn is_settled(&self) -> bool {
        self.settled || self.state == "SETTLED"
    }
}

/// Error payload of lnd's REST gateway.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct NodeErrorBody {
    code: Option<i32>,
    message: String,
}

impl NodeErrorBody {
    fn is_invoice_not_found(&self) -> bool {
        self.code == Some(GRPC_NOT_FOUND) || self.message.contains(INVOICE_NOT_FOUND)
    }
}

/// A client for a single lnd node.
///
/// Cheap to clone; clones share the underlying connection pool. Build one per node and share
/// it between paywalls.
#[derive(Debug, Clone)]
pub struct LndClient {
    base_url: Url,
    client: reqwest::Client,
}

impl LndClient {
    /// Connect to the node described by `options`.
    ///
    /// Reads the TLS certificate and the macaroon from disk. No request is sent until the
    /// first invoice is created or looked up.
    pub fn new(options: LndOptions) -> Result<Self, LndClientError> {
        let options = options.with_defaults();

        let cert = read_file(&options.cert_file)?;
        let macaroon = read_file(&options.macaroon_file)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("grpc-metadata-macaroon"),
            macaroon_header(&macaroon)?,
        );

        let mut builder = reqwest::Client::builder()
            .add_root_certificate(Certificate::from_pem(&cert)?)
            .default_headers(headers);
        if let Some(secs) = options.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(LndClient {
            base_url: options.base_url()?,
            client: builder.build()?,
        })
    }

    async fn add_invoice(&self, amount: Sats, memo: &str) -> Result<Invoice, LndClientError> {
        let response = self
            .client
            .post(self.base_url.join("v1/invoices")?)
            .json(&AddInvoiceRequest {
                value: amount,
                memo,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            return Err(LndClientError::NodeError {
                status,
                message: node_error_message(&body),
            });
        }

        let added: AddInvoiceResponse = response.json().await?;
        Ok(Invoice(added.payment_request))
    }

    /// Look up an invoice by hash. `None` means the node does not know it.
    async fn lookup_invoice(
        &self,
        hash: PaymentHash,
    ) -> Result<Option<LookupInvoiceResponse>, LndClientError> {
        let response = self
            .client
            .get(self.base_url.join(&format!("v1/invoice/{}", hash.to_hex()))?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        parse_lookup(status, &body)
    }
}

impl InvoiceClient for LndClient {
    async fn create_invoice(&self, amount: Sats, memo: &str) -> Result<Invoice, ClientError> {
        if !amount.is_chargeable() {
            return Err(ClientError::InvalidAmount(amount));
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Creating invoice for a new API request: amount={amount}, memo='{memo}'");

        Ok(self.add_invoice(amount, memo).await?)
    }

    async fn is_settled(&self, preimage: &str) -> Result<bool, ClientError> {
        let hash = preimage.parse::<Preimage>()?.payment_hash();

        #[cfg(feature = "tracing")]
        tracing::debug!("Checking invoice for hash {}", hash.to_base64());

        match self.lookup_invoice(hash).await? {
            Some(invoice) => Ok(invoice.is_settled()),
            None => Err(ClientError::ChargeNotFound(hash)),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, LndClientError> {
    std::fs::read(path).map_err(|source| LndClientError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

/// lnd expects the macaroon as uppercase hex.
fn macaroon_header(macaroon: &[u8]) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&hex::encode_upper(macaroon))?;
    value.set_sensitive(true);
    Ok(value)
}

fn node_error_message(body: &str) -> String {
    parse_node_error(body)
        .map(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

fn parse_node_error(body: &str) -> Option<NodeErrorBody> {
    serde_json::from_str(body).ok()
}

fn parse_lookup(
    status: StatusCode,
    body: &str,
) -> Result<Option<LookupInvoiceResponse>, LndClientError> {
    if status.is_success() {
        return serde_json::from_str(body)
            .map(Some)
            .map_err(|err| LndClientError::NodeError {
                status,
                message: format!("Unexpected invoice payload: {err}"),
            });
    }

    // Only trust a miss lnd itself reports; a bare 404 may come from a proxy or a wrong address.
    if parse_node_error(body).is_some_and(|err| err.is_invoice_not_found()) {
        return Ok(None);
    }

    Err(LndClientError::NodeError {
        status,
        message: node_error_message(body),
    })
}
