//! Client of the storage service that holds the captured protocol messages
//! and the details of each test session.

use {
    crate::{
        domain::{
            Message,
            session::{SessionDetails, SessionDirectory},
        },
        infra::observe,
    },
    reqwest::{Client, StatusCode},
    serde::{Deserialize, Serialize},
    std::{collections::HashMap, time::Duration},
    url::Url,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to build client")]
    FailedToBuildClient(#[source] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("bad status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Source of captured messages.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PayloadStore: Send + Sync {
    /// The messages stored under `ids`.
    async fn payloads(&self, ids: &[String]) -> Result<Vec<Message>, Error>;
}

#[derive(Serialize)]
struct PayloadsRequest<'a> {
    payload_ids: &'a [String],
}

#[derive(Deserialize)]
struct PayloadsResponse {
    payloads: Vec<Message>,
}

/// The storage service's HTTP API.
pub struct Http {
    client: Client,
    base: Url,
}

impl Http {
    pub fn try_new(base: Url, timeout: Duration) -> Result<Self, Error> {
        tracing::info!(%base, ?timeout, "creating payload store client");
        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .map_err(Error::FailedToBuildClient)?,
            base,
        })
    }

    /// Resolves `path` below the base URL, keeping any path the base has.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join(path)?)
    }

    async fn roundtrip<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let response = request.send().await?;
        let status = response.status();
        tracing::trace!(%status, "storage response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PayloadStore for Http {
    async fn payloads(&self, ids: &[String]) -> Result<Vec<Message>, Error> {
        let url = self.endpoint("payload/ids")?;
        tracing::trace!(path = url.path(), ?ids, "storage request");
        let response: PayloadsResponse = self
            .roundtrip(
                self.client
                    .post(url)
                    .json(&PayloadsRequest { payload_ids: ids }),
            )
            .await?;
        Ok(response.payloads)
    }
}

#[async_trait::async_trait]
impl SessionDirectory for Http {
    async fn details(&self, session: &str) -> anyhow::Result<SessionDetails> {
        let url = self.endpoint(&format!("api/sessions/{session}"))?;
        tracing::trace!(path = url.path(), "storage request");
        Ok(self.roundtrip(self.client.get(url)).await?)
    }
}

/// Fetches the messages of every flow concurrently. A flow whose messages
/// cannot be fetched is validated without messages.
pub async fn fetch_flows(
    store: &dyn PayloadStore,
    ids: HashMap<String, Vec<String>>,
) -> HashMap<String, Vec<Message>> {
    futures::future::join_all(ids.into_iter().map(|(flow, ids)| async move {
        let messages = match store.payloads(&ids).await {
            Ok(messages) => messages,
            Err(err) => {
                observe::payload_fetch_failed(&flow, &err);
                Vec::new()
            }
        };
        (flow, messages)
    }))
    .await
    .into_iter()
    .collect()
}
