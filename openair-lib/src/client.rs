//! Main OpenAirClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::api::FetchCursor;
use crate::api::Page;
use crate::api::ReadRequest;
use crate::api::ReadResponse;
use crate::api::envelope;
use crate::config::Config;
use crate::error::ApiError;
use crate::error::Error;
use crate::retry::RetryConfig;
use crate::retry::retry;
use crate::schema::RecordTypeDescriptor;
use crate::transport::HttpTransport;
use crate::transport::Transport;

/// The main client for the OpenAir XML API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across tasks; nothing in it changes after construction.
///
/// # Example
///
/// ```ignore
/// use openair_lib::{Config, OpenAirClient};
///
/// let client = OpenAirClient::builder()
///     .config(Config::from_env()?)
///     .build()?;
///
/// let customer = client.probe("Customer").await?;
/// let mut pages = client.enumerate(&customer, None, CancellationToken::new());
/// while let Some(page) = pages.next().await {
///     for record in page? {
///         println!("{:?}", record.get("Name"));
///     }
/// }
/// ```
#[derive(Clone)]
pub struct OpenAirClient {
    pub(crate) inner: Arc<OpenAirClientInner>,
}

pub(crate) struct OpenAirClientInner {
    pub(crate) config: Config,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) retry: RetryConfig,
}

impl OpenAirClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> OpenAirClientBuilder<Missing> {
        OpenAirClientBuilder::new()
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Returns the retry policy used for page reads.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Sends a read and parses the response envelope.
    async fn read(&self, request: &ReadRequest) -> Result<ReadResponse, Error> {
        let body = envelope(&self.inner.config, request);
        let response = self.inner.transport.send(body).await?;
        ReadResponse::parse(&response)
    }

    /// Infers the field layout of a record type from one sample record.
    ///
    /// Requests a single record (including deleted records and custom
    /// fields) and turns each child of it into a field. Not retried: a
    /// failure here is reported as is.
    pub async fn probe(&self, type_name: &str) -> Result<RecordTypeDescriptor, Error> {
        debug!(type_name, "probing record type");
        let response = self.read(&ReadRequest::new(type_name).limit(1)).await?;

        let sample = response.sample().ok_or_else(|| {
            ApiError::parse(format!("no sample record returned for {type_name}"))
        })?;
        let descriptor = RecordTypeDescriptor::from_sample(type_name, sample);

        info!(
            type_name,
            fields = descriptor.fields().len(),
            "probed record type"
        );
        Ok(descriptor)
    }

    /// Probes several record types in order, stopping at the first failure.
    pub async fn probe_all<I, S>(&self, type_names: I) -> Result<Vec<RecordTypeDescriptor>, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut descriptors = Vec::new();
        for type_name in type_names {
            descriptors.push(self.probe(type_name.as_ref()).await?);
        }
        Ok(descriptors)
    }

    /// Fetches one page of records at the cursor's position.
    pub async fn fetch_page(
        &self,
        descriptor: &RecordTypeDescriptor,
        cursor: &FetchCursor,
    ) -> Result<Page, Error> {
        debug!(
            type_name = descriptor.type_name(),
            offset = cursor.offset,
            limit = cursor.limit,
            "fetching page"
        );
        let request = ReadRequest::new(descriptor.type_name())
            .offset(cursor.offset)
            .limit(cursor.limit)
            .modified_since(cursor.modified_since);

        let response = self.read(&request).await?;
        Ok(Page::new(response.records(descriptor), cursor.offset))
    }

    /// Fetches one page, retrying transient failures with exponential backoff.
    pub async fn fetch_page_with_retry(
        &self,
        descriptor: &RecordTypeDescriptor,
        cursor: &FetchCursor,
        cancel: &CancellationToken,
    ) -> Result<Page, Error> {
        retry(&self.inner.retry, cancel, move |_| self.fetch_page(descriptor, cursor)).await
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`OpenAirClient`].
///
/// Uses the typestate pattern to ensure the config is set at compile time.
///
/// # Example
///
/// ```ignore
/// let client = OpenAirClient::builder()
///     .config(config)
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct OpenAirClientBuilder<C> {
    config: C,
    transport: Option<Arc<dyn Transport>>,
    retry: Option<RetryConfig>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl OpenAirClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: Missing,
            transport: None,
            retry: None,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }

    /// Sets the connection settings and credentials.
    pub fn config(self, config: Config) -> OpenAirClientBuilder<Set<Config>> {
        OpenAirClientBuilder {
            config: Set(config),
            transport: self.transport,
            retry: self.retry,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl Default for OpenAirClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> OpenAirClientBuilder<C> {
    /// Sets a custom transport instead of the default HTTP one.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Overrides the retry policy.
    ///
    /// Defaults to 8 attempts starting at the config's retry delay.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl OpenAirClientBuilder<Set<Config>> {
    /// Builds the [`OpenAirClient`].
    ///
    /// Fails if the endpoint URL is invalid or the HTTP client cannot be created.
    pub fn build(self) -> Result<OpenAirClient, Error> {
        let config = self.config.0;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let http_client = match self.http_client {
                    Some(client) => client,
                    None => {
                        let mut builder = Client::builder();
                        if let Some(timeout) = self.connect_timeout {
                            builder = builder.connect_timeout(timeout);
                        }
                        builder.build().map_err(ApiError::from)?
                    }
                };
                let http = HttpTransport::new(config.endpoint()?, http_client).timeout(self.timeout);
                Arc::new(http) as Arc<dyn Transport>
            }
        };

        let retry = self
            .retry
            .unwrap_or_else(|| RetryConfig::default().initial_delay(config.retry_delay));

        Ok(OpenAirClient {
            inner: Arc::new(OpenAirClientInner {
                config,
                transport,
                retry,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::schema::ValueKind;

    /// Records request bodies and answers with a fixed response.
    struct Canned {
        response: String,
        requests: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Canned {
        async fn send(&self, body: String) -> Result<String, ApiError> {
            self.requests.lock().unwrap().push(body);
            Ok(self.response.clone())
        }
    }

    fn client(response: &str) -> (OpenAirClient, Arc<Canned>) {
        let canned = Arc::new(Canned {
            response: response.to_string(),
            requests: Mutex::new(Vec::new()),
        });
        let client = OpenAirClient::builder()
            .config(Config::new("key", "Acme", "jdoe", "pw").namespace("ns"))
            .transport(canned.clone())
            .build()
            .unwrap();
        (client, canned)
    }

    const SAMPLE: &str = r#"<response><Auth status="0"/><Read status="0">
        <Project>
            <id>10</id>
            <name>Apollo</name>
            <customerid>3</customerid>
            <customer_id>3</customer_id>
            <start_date><Date><year>2024</year><month>5</month><day>1</day></Date></start_date>
            <billing_address><Address><city>Oslo</city></Address></billing_address>
        </Project>
    </Read></response>"#;

    #[tokio::test]
    async fn test_probe() {
        let (client, canned) = client(SAMPLE);
        let descriptor = client.probe("Project").await.unwrap();

        let fields: Vec<_> = descriptor
            .fields()
            .iter()
            .map(|f| (f.normalized_name.as_str(), f.value_kind))
            .collect();
        assert_eq!(
            fields,
            [
                ("ID", ValueKind::Text),
                ("Name", ValueKind::Text),
                ("CustomerID", ValueKind::Text),
                ("CustomerID1", ValueKind::Text),
                ("StartDate", ValueKind::Date),
                ("BillingAddress", ValueKind::Address),
            ]
        );

        let requests = canned.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].contains(
            r#"<Read type="Project" method="all" limit="1" enable_custom="1" include_nondeleted="1" deleted="1"></Read>"#
        ));
        assert!(requests[0].contains(r#"namespace="ns" key="key""#));
    }

    #[tokio::test]
    async fn test_probe_empty_type_is_malformed() {
        let (client, _) = client(r#"<response><Auth status="0"/><Read status="0"/></response>"#);
        let err = client.probe("Project").await.unwrap_err();
        assert!(matches!(err, Error::Api(ApiError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_probe_auth_failure() {
        let (client, canned) = client(r#"<response><Auth status="1"/></response>"#);
        let err = client.probe_all(["Project", "Customer"]).await.unwrap_err();
        assert!(err.is_auth());
        // Fails fast on the first type.
        assert_eq!(canned.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let (client, canned) = client(SAMPLE);
        let descriptor = client.probe("Project").await.unwrap();

        let cursor = FetchCursor {
            offset: 2000,
            limit: 1000,
            modified_since: None,
        };
        let page = client.fetch_page(&descriptor, &cursor).await.unwrap();

        assert_eq!(page.offset(), 2000);
        assert_eq!(page.len(), 1);
        let record = &page.records()[0];
        assert_eq!(record.get_text("Name").unwrap(), "Apollo");
        assert_eq!(
            record.get_date("StartDate").unwrap().to_date().unwrap().to_string(),
            "2024-05-01"
        );
        assert!(canned.requests.lock().unwrap()[1].contains(r#"limit="2000,1000""#));
    }

    #[test]
    fn test_default_retry_uses_config_delay() {
        let (client, _) = client(SAMPLE);
        assert_eq!(client.retry_config().initial_delay, Duration::from_millis(100));
        assert_eq!(client.retry_config().max_attempts, 8);
    }

    #[test]
    fn test_build_rejects_bad_endpoint() {
        let result = OpenAirClient::builder()
            .config(Config::new("k", "c", "u", "p").domain("bad host"))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
