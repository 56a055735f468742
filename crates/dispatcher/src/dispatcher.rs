//! Dispatcher - fire-and-forget fan-out of one event to its topics
//!
//! Each `send` spawns one task tracked by a [`TaskTracker`]. Within a task
//! topics are published sequentially in list order; a failing topic never
//! stops the remaining ones.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    ContractError, Event, EventOutput, PubSubOutputConfig, PublishClient, TemplateOptions,
};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, info_span, instrument, Instrument};

use crate::error::DispatcherError;
use crate::metrics::TopicMetrics;
use crate::template::{MessageFormatter, TopicResolver};
use crate::topics::split_topics;

/// Output name reported through [`EventOutput::name`]
pub const OUTPUT_NAME: &str = "PubSub";

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder<C> {
    client: C,
    formatter: MessageFormatter,
    selector: Option<TopicResolver>,
    publish_timeout: Option<Duration>,
}

impl<C> DispatcherBuilder<C>
where
    C: PublishClient + Sync + 'static,
{
    /// Create a new DispatcherBuilder; the message formatter is mandatory
    pub fn new(client: C, formatter: MessageFormatter) -> Self {
        Self {
            client,
            formatter,
            selector: None,
            publish_timeout: None,
        }
    }

    /// Set the topic selector (`None` = every event ends in "topics not found")
    pub fn selector(mut self, selector: Option<TopicResolver>) -> Self {
        self.selector = selector;
        self
    }

    /// Bound each publish attempt (`None` = wait for the acknowledgment forever)
    pub fn publish_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.publish_timeout = timeout;
        self
    }

    /// Build the dispatcher on the current Tokio runtime
    ///
    /// # Errors
    /// Returns `Runtime` when called outside a Tokio runtime.
    pub fn build(self) -> Result<Dispatcher<C>, DispatcherError> {
        let runtime = Handle::try_current()?;

        Ok(Dispatcher {
            pipeline: Arc::new(Pipeline {
                client: self.client,
                formatter: self.formatter,
                selector: self.selector,
                publish_timeout: self.publish_timeout,
                metrics: Arc::new(TopicMetrics::new()),
            }),
            tracker: TaskTracker::new(),
            runtime,
        })
    }
}

/// Per-event publish pipeline shared by all spawned tasks
struct Pipeline<C> {
    client: C,
    formatter: MessageFormatter,
    selector: Option<TopicResolver>,
    publish_timeout: Option<Duration>,
    metrics: Arc<TopicMetrics>,
}

impl<C> Pipeline<C>
where
    C: PublishClient + Sync + 'static,
{
    /// Runs inside the send span; every early return closes it
    async fn run(&self, event: Event) {
        if event.data.is_none() {
            error!("Event data is empty");
            return;
        }

        let object = match event.json_object() {
            Ok(object) => object,
            Err(e) => {
                error!(error = %e, "Event conversion failed");
                return;
            }
        };

        let topics = self.render_topics(&object);
        if topics.trim().is_empty() {
            error!("PubSub topics are not found");
            return;
        }

        let rendered = match self.formatter.render(&object) {
            Ok(rendered) => rendered,
            Err(e) => {
                error!(error = %e, "PubSub message render failed");
                return;
            }
        };

        let message = String::from_utf8_lossy(&rendered);
        let message = message.trim();
        if message.is_empty() {
            debug!("PubSub message is empty");
            return;
        }

        debug!(payload = %message, "PubSub message");
        let payload = Bytes::copy_from_slice(message.as_bytes());

        for topic in split_topics(&topics) {
            self.metrics.record_request(topic);

            let started = Instant::now();
            let result = self.publish(topic, payload.clone()).await;
            observability::record_publish_latency_ms(topic, started.elapsed().as_secs_f64() * 1000.0);

            match result {
                Ok(message_id) => {
                    debug!(topic = %topic, message_id = %message_id, "PubSub server ID");
                }
                Err(e) => {
                    self.metrics.record_error(topic);
                    error!(topic = %topic, error = %e, "PubSub publish failed");
                }
            }
        }
    }

    /// Selector failures are expected on partially configured outputs and
    /// only logged at debug; the empty result is reported by the caller.
    fn render_topics(&self, object: &Value) -> String {
        let Some(selector) = &self.selector else {
            return String::new();
        };

        match selector.render(object) {
            Ok(topics) => topics,
            Err(e) => {
                debug!(error = %e, "PubSub topic selector failed");
                String::new()
            }
        }
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<String, ContractError> {
        let publish = self.client.publish(topic, payload);

        match self.publish_timeout {
            Some(timeout) => tokio::time::timeout(timeout, publish)
                .await
                .unwrap_or_else(|_| {
                    Err(ContractError::PublishTimeout {
                        topic: topic.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    })
                }),
            None => publish.await,
        }
    }
}

/// The Pub/Sub output: renders topics and message, publishes to each topic
pub struct Dispatcher<C> {
    pipeline: Arc<Pipeline<C>>,
    tracker: TaskTracker,
    runtime: Handle,
}

impl<C> Dispatcher<C>
where
    C: PublishClient + Sync + 'static,
{
    /// Schedule the pipeline for `event` and return immediately
    ///
    /// Safe to call from any thread; the task runs on the runtime the
    /// dispatcher was built on.
    pub fn send(&self, event: Option<Event>) {
        let pipeline = Arc::clone(&self.pipeline);

        self.tracker.spawn_on(
            async move {
                let Some(event) = event else {
                    debug!("Event is empty");
                    return;
                };

                let span = info_span!(
                    "pubsub_output_send",
                    channel = %event.channel,
                    event_type = %event.event_type
                );
                span.follows_from(event.span());

                pipeline.run(event).instrument(span).await;
            },
            &self.runtime,
        );
    }

    /// Per-topic request/error counters
    pub fn metrics(&self) -> &Arc<TopicMetrics> {
        &self.pipeline.metrics
    }

    /// Underlying bus client
    pub fn client(&self) -> &C {
        &self.pipeline.client
    }

    /// Number of sends still running
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait for every in-flight send, then shut the client down
    ///
    /// Sends issued after this call are still tracked and awaited.
    #[instrument(name = "dispatcher_shutdown", skip(self))]
    pub async fn shutdown(&self) {
        info!(in_flight = self.tracker.len(), "Draining PubSub output");

        self.tracker.close();
        self.tracker.wait().await;
        self.pipeline.client.shutdown().await;

        info!(
            requests = self.pipeline.metrics.total_requests(),
            errors = self.pipeline.metrics.total_errors(),
            "PubSub output shutdown complete"
        );
    }
}

impl<C> EventOutput for Dispatcher<C>
where
    C: PublishClient + Sync + 'static,
{
    fn name(&self) -> &str {
        OUTPUT_NAME
    }

    fn send(&self, event: Option<Event>) {
        Dispatcher::send(self, event);
    }
}

/// Build a dispatcher from output settings with a caller-supplied client
///
/// - missing credentials or project id: `Ok(None)`, the output is disabled
/// - client creation failure: `Err(ClientCreation)`
/// - message template compile failure: `Err(MessageTemplate)`
/// - selector compile failure: logged, the dispatcher runs without selector
#[instrument(name = "dispatcher_create", skip_all, fields(project_id = %config.project_id))]
pub async fn create_dispatcher<'a, C, F, Fut>(
    config: &'a PubSubOutputConfig,
    options: &TemplateOptions,
    connect: F,
) -> Result<Option<Dispatcher<C>>, DispatcherError>
where
    C: PublishClient + Sync + 'static,
    F: FnOnce(&'a PubSubOutputConfig) -> Fut,
    Fut: Future<Output = Result<C, ContractError>>,
{
    if !config.is_enabled() {
        debug!("PubSub output credentials or project ID is not defined. Skipped");
        return Ok(None);
    }

    let client = connect(config).await.map_err(|e| {
        error!(error = %e, "PubSub client creation failed");
        DispatcherError::ClientCreation(e)
    })?;

    let formatter = MessageFormatter::from_template(&config.message, options).map_err(|e| {
        error!(error = %e, "PubSub message template is invalid");
        DispatcherError::MessageTemplate(e)
    })?;

    let selector = if config.topic_selector.trim().is_empty() {
        debug!("PubSub topic selector is not defined");
        None
    } else {
        match TopicResolver::from_template(&config.topic_selector, options) {
            Ok(selector) => Some(selector),
            Err(e) => {
                error!(error = %e, "PubSub topic selector is invalid");
                None
            }
        }
    };

    let dispatcher = DispatcherBuilder::new(client, formatter)
        .selector(selector)
        .publish_timeout(config.publish_timeout())
        .build()?;

    info!(
        client = %dispatcher.client().name(),
        publish_timeout = ?config.publish_timeout(),
        "PubSub output created"
    );

    Ok(Some(dispatcher))
}

/// Build the Google Pub/Sub output (see [`create_dispatcher`] for the policy)
#[cfg(feature = "gcp")]
pub async fn create_pubsub_output(
    config: &contracts::OutputConfig,
) -> Result<Option<Dispatcher<crate::clients::GcpPubSubClient>>, DispatcherError> {
    create_dispatcher(
        &config.pubsub,
        &config.template,
        crate::clients::GcpPubSubClient::connect,
    )
    .await
}
