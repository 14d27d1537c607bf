//! Background enumeration of every record of a type.

use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use chrono::DateTime;
use chrono::Utc;
use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::OpenAirClient;
use crate::api::FetchCursor;
use crate::api::Page;
use crate::error::Error;
use crate::model::Record;
use crate::schema::RecordTypeDescriptor;

/// Pages of an enumeration, in ascending offset order.
///
/// Yields zero or more `Ok(page)` items, then at most one `Err`, then `None`.
/// The stream ends exactly once, when the background task finishes. Dropping
/// it stops the task at its next delivery.
///
/// # Example
///
/// ```ignore
/// let mut pages = client.enumerate(&descriptor, None, CancellationToken::new());
///
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     for record in page.records() {
///         println!("{:?}", record.get("Name"));
///     }
/// }
/// ```
pub struct RecordStream {
    receiver: mpsc::Receiver<Result<Page, Error>>,
    cancel: CancellationToken,
}

impl RecordStream {
    /// Waits for the next page.
    ///
    /// Returns `None` once the enumeration has finished.
    pub async fn next(&mut self) -> Option<Result<Page, Error>> {
        self.receiver.recv().await
    }

    /// Cancels the enumeration.
    ///
    /// The stream then ends with [`Error::Cancelled`] unless it had already
    /// finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drains the stream into one list of records.
    pub async fn collect_records(mut self) -> Result<Vec<Record>, Error> {
        let mut records = Vec::new();
        while let Some(page) = self.next().await {
            records.extend(page?.into_records());
        }
        Ok(records)
    }
}

impl Stream for RecordStream {
    type Item = Result<Page, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl OpenAirClient {
    /// Fetches every record of a type in the background.
    ///
    /// Pages of [`PAGE_SIZE`](crate::api::PAGE_SIZE) records are requested one
    /// after another, each through the retry policy, until a short page
    /// arrives. `modified_since` restricts the read to records modified on or
    /// after that day. Must be called within a tokio runtime.
    pub fn enumerate(
        &self,
        descriptor: &RecordTypeDescriptor,
        modified_since: Option<DateTime<Utc>>,
        cancel: CancellationToken,
    ) -> RecordStream {
        self.enumerate_with_cursor(descriptor, FetchCursor::new(modified_since), cancel)
    }

    /// Like [`enumerate`](Self::enumerate), starting from an explicit cursor.
    pub fn enumerate_with_cursor(
        &self,
        descriptor: &RecordTypeDescriptor,
        cursor: FetchCursor,
        cancel: CancellationToken,
    ) -> RecordStream {
        let (sender, receiver) = mpsc::channel(1);
        let client = self.clone();
        let descriptor = descriptor.clone();
        let task_cancel = cancel.clone();

        tokio::spawn(async move {
            run(client, descriptor, cursor, task_cancel, sender).await;
        });

        RecordStream { receiver, cancel }
    }
}

/// Drives the fetch loop; dropping `sender` on return closes the stream.
async fn run(
    client: OpenAirClient,
    descriptor: RecordTypeDescriptor,
    mut cursor: FetchCursor,
    cancel: CancellationToken,
    sender: mpsc::Sender<Result<Page, Error>>,
) {
    let type_name = descriptor.type_name();
    let mut delivered = 0usize;

    loop {
        if cancel.is_cancelled() {
            let _ = sender.send(Err(Error::Cancelled)).await;
            return;
        }

        let page = match client.fetch_page_with_retry(&descriptor, &cursor, &cancel).await {
            Ok(page) => page,
            Err(err) => {
                debug!(type_name, offset = cursor.offset, error = %err, "enumeration failed");
                let _ = sender.send(Err(err)).await;
                return;
            }
        };

        let full = page.is_full(cursor.limit);
        delivered += page.len();
        debug!(type_name, offset = cursor.offset, records = page.len(), "page fetched");

        if sender.send(Ok(page)).await.is_err() {
            debug!(type_name, "consumer dropped the stream");
            return;
        }

        if !full {
            debug!(type_name, records = delivered, "enumeration complete");
            return;
        }
        cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use futures::StreamExt;

    use super::*;
    use crate::Config;
    use crate::error::ApiError;
    use crate::retry::RetryConfig;
    use crate::schema::Field;
    use crate::schema::ValueKind;
    use crate::transport::Transport;

    /// Serves `total` numbered records, honoring the requested limit.
    struct Numbered {
        total: usize,
        calls: AtomicUsize,
    }

    fn limit_of(body: &str) -> (usize, usize) {
        let start = body.find(r#"limit=""#).map(|i| i + 7).unwrap_or_default();
        let end = start + body[start..].find('"').unwrap_or_default();
        let (offset, count) = body[start..end].split_once(',').unwrap_or(("0", "1"));
        (offset.parse().unwrap_or(0), count.parse().unwrap_or(1))
    }

    #[async_trait]
    impl Transport for Numbered {
        async fn send(&self, body: String) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (offset, count) = limit_of(&body);
            let records: String = (offset..(offset + count).min(self.total))
                .map(|i| format!("<Task><id>{i}</id></Task>"))
                .collect();
            Ok(format!(
                r#"<response><Auth status="0"/><Read status="0">{records}</Read></response>"#
            ))
        }
    }

    fn setup(total: usize) -> (OpenAirClient, Arc<Numbered>, RecordTypeDescriptor) {
        let transport = Arc::new(Numbered {
            total,
            calls: AtomicUsize::new(0),
        });
        let client = OpenAirClient::builder()
            .config(Config::new("k", "c", "u", "p"))
            .transport(transport.clone())
            .retry(RetryConfig::default().initial_delay(std::time::Duration::ZERO))
            .build()
            .unwrap();
        let descriptor = RecordTypeDescriptor::new("Task", vec![Field::new("id", ValueKind::Text)]);
        (client, transport, descriptor)
    }

    #[tokio::test]
    async fn test_pages_until_short_page() {
        let (client, transport, descriptor) = setup(2500);
        let stream = client.enumerate(&descriptor, None, CancellationToken::new());

        let pages: Vec<_> = stream.collect().await;
        let lengths: Vec<_> = pages.iter().map(|p| p.as_ref().unwrap().len()).collect();
        let offsets: Vec<_> = pages.iter().map(|p| p.as_ref().unwrap().offset()).collect();

        assert_eq!(lengths, [1000, 1000, 500]);
        assert_eq!(offsets, [0, 1000, 2000]);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_ends_with_empty_page() {
        let (client, transport, descriptor) = setup(2000);
        let records = client
            .enumerate(&descriptor, None, CancellationToken::new())
            .collect_records()
            .await
            .unwrap();

        assert_eq!(records.len(), 2000);
        assert_eq!(records[1999].get_text("ID").unwrap(), "1999");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (client, transport, descriptor) = setup(2500);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut stream = client.enumerate(&descriptor, None, cancel);
        assert!(stream.next().await.unwrap().unwrap_err().is_cancelled());
        assert!(stream.next().await.is_none());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_enumeration() {
        let (client, transport, descriptor) = setup(5000);
        let mut stream = client.enumerate(&descriptor, None, CancellationToken::new());

        assert_eq!(stream.next().await.unwrap().unwrap().len(), 1000);
        stream.cancel();

        // The task may have fetched the next page before observing the
        // cancellation; after it, only the cancellation error follows.
        let mut rest = Vec::new();
        while let Some(item) = stream.next().await {
            rest.push(item);
        }
        let (last, pages) = rest.split_last().unwrap();
        assert!(last.as_ref().unwrap_err().is_cancelled());
        assert!(pages.iter().all(Result::is_ok));
        assert!(pages.len() <= 1);
        assert!(transport.calls.load(Ordering::SeqCst) <= 2);
    }

    /// Accepts requests and never answers.
    struct Hang {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Hang {
        async fn send(&self, _body: String) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_cancel_while_request_in_flight() {
        let transport = Arc::new(Hang {
            calls: AtomicUsize::new(0),
        });
        let client = OpenAirClient::builder()
            .config(Config::new("k", "c", "u", "p"))
            .transport(transport.clone())
            .build()
            .unwrap();
        let descriptor = RecordTypeDescriptor::new("Task", vec![Field::new("id", ValueKind::Text)]);

        let mut stream = client.enumerate(&descriptor, None, CancellationToken::new());
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
        stream.cancel();

        let next = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next())
            .await
            .expect("cancellation did not interrupt the pending request");
        assert!(next.unwrap().unwrap_err().is_cancelled());
        assert!(stream.next().await.is_none());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_consumer_drop_stops_task() {
        let (client, transport, descriptor) = setup(10_000);
        let mut stream = client.enumerate(&descriptor, None, CancellationToken::new());
        stream.next().await.unwrap().unwrap();
        drop(stream);

        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(transport.calls.load(Ordering::SeqCst) <= 3);
    }
}
