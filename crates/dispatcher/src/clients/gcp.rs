//! GcpPubSubClient - Google Cloud Pub/Sub publisher
//!
//! Topics are addressed by id inside the configured project and are never
//! created: publishing to a missing topic fails for that topic only.
//!
//! # Authentication
//!
//! `credentials` is either a path to a service account key file or the key
//! JSON itself.

use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;
use contracts::{ContractError, PubSubOutputConfig, PublishClient};
use gcloud_googleapis::pubsub::v1::PubsubMessage;
use gcloud_pubsub::client::google_cloud_auth::credentials::CredentialsFile;
use gcloud_pubsub::client::{Client, ClientConfig};
use gcloud_pubsub::publisher::Publisher;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Google Pub/Sub client with one cached publisher per topic
pub struct GcpPubSubClient {
    client: Client,
    project_id: String,
    publishers: RwLock<HashMap<String, Publisher>>,
}

impl GcpPubSubClient {
    /// Create a client from output settings
    ///
    /// # Errors
    /// Returns `ClientConnection` when credentials cannot be loaded or the
    /// client cannot be created.
    #[instrument(name = "gcp_pubsub_connect", skip(config), fields(project_id = %config.project_id))]
    pub async fn connect(config: &PubSubOutputConfig) -> Result<Self, ContractError> {
        let credentials = load_credentials(&config.credentials).await?;

        let mut client_config = ClientConfig::default()
            .with_credentials(credentials)
            .await
            .map_err(|e| {
                ContractError::client_connection(format!("failed to configure Pub/Sub auth: {e}"))
            })?;
        client_config.project_id = Some(config.project_id.clone());

        let client = Client::new(client_config).await.map_err(|e| {
            ContractError::client_connection(format!("failed to create Pub/Sub client: {e}"))
        })?;

        info!(project_id = %config.project_id, "Connected to Google Pub/Sub");

        Ok(Self {
            client,
            project_id: config.project_id.clone(),
            publishers: RwLock::new(HashMap::new()),
        })
    }

    /// Get or create the publisher for a topic
    async fn publisher(&self, topic: &str) -> Publisher {
        {
            let publishers = self.publishers.read().await;
            if let Some(publisher) = publishers.get(topic) {
                return publisher.clone();
            }
        }

        let mut publishers = self.publishers.write().await;
        publishers
            .entry(topic.to_string())
            .or_insert_with(|| {
                debug!(project_id = %self.project_id, topic = %topic, "Creating Pub/Sub publisher");
                self.client.topic(topic).new_publisher(None)
            })
            .clone()
    }
}

impl PublishClient for GcpPubSubClient {
    fn name(&self) -> &str {
        "gcp-pubsub"
    }

    async fn publish(&self, topic: &str, payload: Bytes) -> Result<String, ContractError> {
        let publisher = self.publisher(topic).await;

        let message = PubsubMessage {
            data: payload.to_vec().into(),
            ..Default::default()
        };

        let awaiter = publisher.publish(message).await;
        awaiter
            .get()
            .await
            .map_err(|status| ContractError::publish(topic, status.to_string()))
    }

    #[instrument(name = "gcp_pubsub_shutdown", skip(self))]
    async fn shutdown(&self) {
        let mut publishers = self.publishers.write().await;
        for (topic, mut publisher) in publishers.drain() {
            publisher.shutdown().await;
            debug!(topic = %topic, "Pub/Sub publisher stopped");
        }
        info!(project_id = %self.project_id, "Pub/Sub client closed");
    }
}

/// Credentials file path if it exists, inline JSON otherwise
async fn load_credentials(credentials: &str) -> Result<CredentialsFile, ContractError> {
    let loaded = if Path::new(credentials).is_file() {
        CredentialsFile::new_from_file(credentials.to_string()).await
    } else {
        CredentialsFile::new_from_str(credentials).await
    };

    loaded.map_err(|e| ContractError::client_connection(format!("invalid credentials: {e}")))
}
