use anyhow::Result;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use webchat_core::{DeliveryOptions, RenderedEntry, Renderer, WidgetOptions};
use webchat_delivery::{Delivery, DeliveryClient, HttpTransport, SendState, Transport};
use webchat_session::SessionStore;

use crate::transcript::TranscriptRenderer;

/// Hides the typing indicator when dropped, so a send abandoned mid-flight
/// still clears it.
struct TypingGuard<'a, R: Renderer> {
    renderer: &'a R,
}

impl<'a, R: Renderer> TypingGuard<'a, R> {
    fn show(renderer: &'a R) -> Self {
        renderer.show_typing();
        Self { renderer }
    }
}

impl<R: Renderer> Drop for TypingGuard<'_, R> {
    fn drop(&mut self) {
        self.renderer.hide_typing();
    }
}

/// A chat widget bound to one delivery client and one rendering surface.
///
/// `submit` takes `&self`; overlapping submits are allowed and render in
/// completion order.
pub struct ChatWidget<T = HttpTransport, R = Arc<TranscriptRenderer>> {
    options: WidgetOptions,
    client: DeliveryClient<T>,
    renderer: R,
    last: Mutex<Option<Delivery>>,
}

impl<R: Renderer> ChatWidget<HttpTransport, R> {
    /// Wire a widget to the reqwest transport.
    pub fn with_http(
        options: WidgetOptions,
        delivery: DeliveryOptions,
        sessions: SessionStore,
        renderer: R,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&delivery)?;
        let destination = options.destination().map(str::to_string);
        let client = DeliveryClient::new(transport, sessions, destination, delivery);
        Ok(Self::new(options, client, renderer))
    }
}

impl<T: Transport, R: Renderer> ChatWidget<T, R> {
    /// Build the widget and render the welcome message, if any.
    pub fn new(options: WidgetOptions, client: DeliveryClient<T>, renderer: R) -> Self {
        if !options.welcome_message.is_empty() {
            renderer.append(RenderedEntry::received(options.welcome_message.as_str()));
        }
        Self {
            options,
            client,
            renderer,
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &WidgetOptions {
        &self.options
    }

    #[must_use]
    pub const fn client(&self) -> &DeliveryClient<T> {
        &self.client
    }

    #[must_use]
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The outcome of the most recent finished send, including the raw
    /// webhook response or the failed attempts behind it.
    #[must_use]
    pub fn last_delivery(&self) -> Option<Delivery> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle one submit event and return the terminal state of the send.
    ///
    /// Blank input leaves the widget `Idle` and renders nothing.
    pub async fn submit(&self, input: &str) -> SendState {
        self.submit_with_cancel(input, &CancellationToken::new())
            .await
    }

    pub async fn submit_with_cancel(&self, input: &str, cancel: &CancellationToken) -> SendState {
        let message = input.trim();
        if message.is_empty() {
            return SendState::Idle;
        }

        self.renderer.append(RenderedEntry::sent(message));
        let delivery = {
            let _typing = TypingGuard::show(&self.renderer);
            self.client.send_with_cancel(message, cancel).await
        };

        let Some(delivery) = delivery else {
            return SendState::Idle;
        };
        if let Some(text) = delivery.rendered_text() {
            self.renderer.append(RenderedEntry::received(text));
        }
        let state = delivery.state();
        debug!(state = ?state, "Submit finished");
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(delivery);
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use webchat_core::{DEFAULT_APOLOGY, EntryKind, Sender};
    use webchat_delivery::{OutboundPayload, TransportError, TransportRequest, TransportResponse};

    struct FixedTransport {
        response: Result<TransportResponse, TransportError>,
        calls: Mutex<usize>,
    }

    impl FixedTransport {
        fn new(response: Result<TransportResponse, TransportError>) -> Self {
            Self {
                response,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn post(
            &self,
            _request: &TransportRequest,
            _payload: &OutboundPayload,
        ) -> Result<TransportResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            self.response.clone()
        }
    }

    fn widget(
        transport: Arc<FixedTransport>,
        destination: Option<&str>,
    ) -> ChatWidget<Arc<FixedTransport>, Arc<TranscriptRenderer>> {
        let client = DeliveryClient::new(
            transport,
            SessionStore::in_memory(),
            destination.map(str::to_string),
            DeliveryOptions::default(),
        );
        ChatWidget::new(
            WidgetOptions::default(),
            client,
            Arc::new(TranscriptRenderer::new()),
        )
    }

    #[tokio::test]
    async fn welcome_message_renders_first() {
        let widget = widget(
            Arc::new(FixedTransport::new(Ok(TransportResponse::new(200, "{}")))),
            None,
        );

        let entries = widget.renderer().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::Received);
        assert_eq!(entries[0].text, widget.options().welcome_message);
    }

    #[tokio::test]
    async fn no_welcome_when_empty() {
        let options = WidgetOptions {
            welcome_message: String::new(),
            ..WidgetOptions::default()
        };
        let client = DeliveryClient::new(
            FixedTransport::new(Ok(TransportResponse::new(200, "{}"))),
            SessionStore::in_memory(),
            None,
            DeliveryOptions::default(),
        );
        let widget = ChatWidget::new(options, client, Arc::new(TranscriptRenderer::new()));

        assert!(widget.renderer().entries().is_empty());
    }

    #[tokio::test]
    async fn reply_rendered_after_user_entry() {
        let transport = Arc::new(FixedTransport::new(Ok(TransportResponse::new(
            200,
            r#"{"response":"hi"}"#,
        ))));
        let widget = widget(transport.clone(), Some("https://hooks.example/chat"));

        let state = widget.submit("  hello ").await;

        assert_eq!(state, SendState::Delivered);
        let entries = widget.renderer().entries();
        assert_eq!(
            entries[1..],
            [RenderedEntry::sent("hello"), RenderedEntry::received("hi")]
        );
        assert_eq!(widget.renderer().typing(), 0);
        assert_eq!(*transport.calls.lock().unwrap(), 1);

        let last = widget.last_delivery().unwrap();
        assert_eq!(last.raw_response().unwrap()["response"], "hi");
    }

    #[tokio::test]
    async fn blank_submit_stays_idle() {
        let transport = Arc::new(FixedTransport::new(Ok(TransportResponse::new(
            200,
            r#"{"response":"hi"}"#,
        ))));
        let widget = widget(transport.clone(), Some("https://hooks.example/chat"));

        assert_eq!(widget.submit("   ").await, SendState::Idle);
        assert_eq!(widget.renderer().entries().len(), 1);
        assert!(widget.last_delivery().is_none());
        assert_eq!(*transport.calls.lock().unwrap(), 0);
        assert!(widget.client().sessions().current().await.is_none());
    }

    #[tokio::test]
    async fn unconfigured_destination_renders_apology() {
        let transport = Arc::new(FixedTransport::new(Ok(TransportResponse::new(200, "{}"))));
        let widget = widget(transport.clone(), None);

        let state = widget.submit("hello").await;

        assert_eq!(state, SendState::Failed);
        let entries = widget.renderer().entries();
        assert_eq!(entries.last(), Some(&RenderedEntry::received(DEFAULT_APOLOGY)));
        assert_eq!(*transport.calls.lock().unwrap(), 0);

        let history = widget.client().sessions().recent_history(5).await;
        assert_eq!(history.last().unwrap().sender, Sender::Error);
    }

    #[tokio::test]
    async fn failure_renders_notice_and_clears_typing() {
        let transport = Arc::new(FixedTransport::new(Err(TransportError::Network(
            "connection refused".to_string(),
        ))));
        let widget = widget(transport, Some("https://hooks.example/chat"));

        let state = widget.submit("hello").await;

        assert_eq!(state, SendState::Failed);
        let last = widget.renderer().entries().pop().unwrap();
        assert!(last.text.starts_with("Network error"));
        assert_eq!(widget.renderer().typing(), 0);
        assert_eq!(
            widget.last_delivery().unwrap().failed_attempts().len(),
            1
        );
    }

    #[tokio::test]
    async fn cancelled_submit_renders_no_outcome() {
        let transport = Arc::new(FixedTransport::new(Ok(TransportResponse::new(
            200,
            r#"{"response":"hi"}"#,
        ))));
        let widget = widget(transport, Some("https://hooks.example/chat"));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = widget.submit_with_cancel("hello", &cancel).await;

        assert_eq!(state, SendState::Cancelled);
        let entries = widget.renderer().entries();
        assert_eq!(entries.last(), Some(&RenderedEntry::sent("hello")));
        assert_eq!(widget.renderer().typing(), 0);
    }
}
