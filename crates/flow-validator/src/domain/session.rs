use serde::Deserialize;

/// Domain and protocol version a session was run against.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SessionDetails {
    pub domain: String,
    pub version: String,
}

/// Resolves a session id to its details.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionDirectory: Send + Sync {
    async fn details(&self, session: &str) -> anyhow::Result<SessionDetails>;
}

/// A directory that knows a single, fixed set of details.
pub struct Fixed(pub SessionDetails);

#[async_trait::async_trait]
impl SessionDirectory for Fixed {
    async fn details(&self, _: &str) -> anyhow::Result<SessionDetails> {
        Ok(self.0.clone())
    }
}
