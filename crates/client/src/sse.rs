//! Server-sent-events [`NotificationChannel`] over the service's callback
//! route.

use async_trait::async_trait;
use loyalty_primitives::job::ExternalId;
use loyalty_primitives::notification::{NotificationEvent, CALLBACK_PATH};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::channel::{ChannelError, NotificationChannel, Subscription};

const EVENT_STREAM: &str = "text/event-stream";

#[derive(Clone, Debug)]
pub struct SseChannel {
    client: Client,
    endpoint: Url,
}

impl SseChannel {
    pub fn new(client: Client, base_url: &Url) -> Result<Self, ChannelError> {
        Ok(Self {
            client,
            endpoint: base_url.join(CALLBACK_PATH)?,
        })
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationChannel for SseChannel {
    type Subscription = SseSubscription;

    async fn subscribe(&self, job: &ExternalId) -> Result<SseSubscription, ChannelError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("id", job.to_string())])
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status(status.as_u16()));
        }

        debug!(%job, "Subscribed to pass notifications");

        Ok(SseSubscription {
            job: job.clone(),
            response: Some(response),
            decoder: Decoder::default(),
        })
    }
}

#[derive(Debug)]
pub struct SseSubscription {
    job: ExternalId,
    response: Option<Response>,
    decoder: Decoder,
}

#[async_trait]
impl Subscription for SseSubscription {
    async fn next_event(&mut self) -> Result<Option<NotificationEvent>, ChannelError> {
        loop {
            while let Some(frame) = self.decoder.next_frame() {
                if let Some(event) = frame.into_event()? {
                    return Ok(Some(event));
                }
            }

            let Some(response) = self.response.as_mut() else {
                return Ok(None);
            };

            match response.chunk().await? {
                Some(chunk) => self.decoder.push(&chunk),
                None => {
                    self.response = None;
                    return Ok(None);
                }
            }
        }
    }

    async fn close(mut self) {
        drop(self.response.take());
        debug!(job = %self.job, "Closed pass notification subscription");
    }
}

/// One dispatched SSE event.
#[derive(Debug, Default, Eq, PartialEq)]
struct Frame {
    event: Option<String>,
    data: String,
}

impl Frame {
    fn parse(block: &str) -> Option<Self> {
        let mut frame = Self::default();
        let mut has_data = false;

        for line in block.lines() {
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);

            match field {
                "event" => frame.event = Some(value.to_owned()),
                "data" => {
                    if has_data {
                        frame.data.push('\n');
                    }
                    frame.data.push_str(value);
                    has_data = true;
                }
                _ => trace!(field, "Ignoring SSE field"),
            }
        }

        has_data.then_some(frame)
    }

    /// Events carrying no download location are not the completion signal
    /// and are skipped.
    fn into_event(self) -> Result<Option<NotificationEvent>, ChannelError> {
        match self.event.as_deref() {
            None | Some("message") => {}
            Some("error") => return Err(ChannelError::Remote(self.data)),
            Some(other) => {
                trace!(event = other, "Ignoring SSE event");
                return Ok(None);
            }
        }

        let value: Value = serde_json::from_str(&self.data)?;

        let file_url = value
            .get("fileURL")
            .or_else(|| value.get("fileUrl"))
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty());

        Ok(file_url.map(|url| NotificationEvent::new(url.to_owned())))
    }
}

/// Splits a byte stream into SSE frames. Frames end at a blank line.
#[derive(Debug, Default)]
struct Decoder {
    buffer: Vec<u8>,
}

impl Decoder {
    fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
    }

    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let end = self.buffer.windows(2).position(|pair| pair == b"\n\n")?;
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();

            if let Some(frame) = Frame::parse(&String::from_utf8_lossy(&block[..end])) {
                return Some(frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::Query;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;

    const ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

    #[test]
    fn decoder_reassembles_split_frames() {
        let mut decoder = Decoder::default();

        decoder.push(b": keep-alive\n\nevent: mess");
        assert_eq!(decoder.next_frame(), None);

        decoder.push(b"age\r\ndata: {\"fileURL\":\r\ndata: \"x\"}\r\n\r\n");
        let frame = decoder.next_frame().unwrap();

        assert_eq!(frame.event.as_deref(), Some("message"));
        assert_eq!(frame.data, "{\"fileURL\":\n\"x\"}");
        assert_eq!(decoder.next_frame(), None);
    }

    #[test]
    fn frame_without_file_url_is_skipped() {
        let frame = Frame::parse("data: {\"status\":\"pending\"}").unwrap();
        assert_eq!(frame.into_event().unwrap(), None);

        let frame = Frame::parse("event: message\ndata: {\"fileURL\":\"https://files.test/a\"}").unwrap();
        assert_eq!(
            frame.into_event().unwrap(),
            Some(NotificationEvent::new("https://files.test/a".to_owned()))
        );
    }

    #[test]
    fn garbage_data_and_error_events_fail() {
        let frame = Frame::parse("data: not json").unwrap();
        assert!(matches!(frame.into_event(), Err(ChannelError::Decode(_))));

        let frame = Frame::parse("event: error\ndata: upstream gone").unwrap();
        assert!(matches!(frame.into_event(), Err(ChannelError::Remote(msg)) if msg == "upstream gone"));
    }

    async fn serve(app: Router) -> Url {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        drop(tokio::spawn(async move { axum::serve(listener, app).await }));
        format!("http://{addr}").parse().unwrap()
    }

    #[tokio::test]
    async fn subscription_reads_the_job_event() {
        async fn stream(Query(query): Query<Vec<(String, String)>>) -> impl IntoResponse {
            assert_eq!(query, vec![("id".to_owned(), format!("card1-{ADDRESS}"))]);
            let event = json!({ "fileURL": "https://files.test/card1.pkpass" });
            (
                [(CONTENT_TYPE, EVENT_STREAM)],
                format!(": keep-alive\n\nevent: message\ndata: {event}\n\n"),
            )
        }

        let base = serve(Router::new().route(CALLBACK_PATH, get(stream))).await;
        let channel = SseChannel::new(Client::new(), &base).unwrap();
        let job = ExternalId::from_parts("card1", ADDRESS).unwrap();

        let mut subscription = channel.subscribe(&job).await.unwrap();

        let event = subscription.next_event().await.unwrap();
        assert_eq!(event.unwrap().file_url, "https://files.test/card1.pkpass");

        assert_eq!(subscription.next_event().await.unwrap(), None);
        subscription.close().await;
    }

    #[tokio::test]
    async fn refused_subscription_reports_status() {
        let base = serve(Router::new().route(
            CALLBACK_PATH,
            get(|| async { StatusCode::BAD_REQUEST }),
        ))
        .await;
        let channel = SseChannel::new(Client::new(), &base).unwrap();
        let job = ExternalId::from_parts("card1", ADDRESS).unwrap();

        let err = channel.subscribe(&job).await.unwrap_err();

        assert!(matches!(err, ChannelError::Status(400)));
    }
}
