//! Cross-message state. Rules validating one message record facts here that
//! rules validating later messages of the same transaction read back.
//!
//! The store is best effort: a failing read is treated as "not known yet" and a
//! failing write is logged and dropped, so store trouble never aborts a rule.

use {
    crate::{domain::Action, infra::observe},
    serde_json::Value,
    std::{fmt, time::Duration},
};

/// Identifies one stored fact. Facts without a transaction are session wide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key {
    pub session: String,
    pub transaction: Option<String>,
    pub name: String,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transaction {
            Some(transaction) => write!(f, "{}:{}:{}", self.session, transaction, self.name),
            None => write!(f, "{}:{}", self.session, self.name),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("state store unavailable: {0}")]
    Unavailable(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &Key) -> Result<Option<Value>, Error>;

    /// Stores `value`, replacing any previous value. `ttl` overrides the
    /// store's default expiry.
    async fn set(&self, key: Key, value: Value, ttl: Option<Duration>) -> Result<(), Error>;
}

/// One entry of the ApiMap, the recorded action history of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiMapEntry {
    Action(Action),
    SoftCancel,
    ConfirmCancel,
    TechnicalCancel,
}

impl ApiMapEntry {
    fn token(self) -> String {
        match self {
            Self::Action(action) => action.to_string(),
            Self::SoftCancel => "soft_cancel".to_owned(),
            Self::ConfirmCancel => "confirm_cancel".to_owned(),
            Self::TechnicalCancel => "technical_cancel".to_owned(),
        }
    }

    fn parse(token: &str) -> Option<Self> {
        match token {
            "soft_cancel" => Some(Self::SoftCancel),
            "confirm_cancel" => Some(Self::ConfirmCancel),
            "technical_cancel" => Some(Self::TechnicalCancel),
            other => Action::parse(other).map(Self::Action),
        }
    }
}

const API_MAP: &str = "apiMap";

/// State access scoped to one session and transaction.
#[derive(Clone, Copy)]
pub struct Scope<'a> {
    store: &'a dyn StateStore,
    session: &'a str,
    transaction: &'a str,
}

impl<'a> Scope<'a> {
    pub fn new(store: &'a dyn StateStore, session: &'a str, transaction: &'a str) -> Self {
        Self {
            store,
            session,
            transaction,
        }
    }

    fn key(&self, name: &str) -> Key {
        Key {
            session: self.session.to_owned(),
            transaction: Some(self.transaction.to_owned()),
            name: name.to_owned(),
        }
    }

    /// Reads a fact; absent when never recorded, expired or unreadable.
    pub async fn fetch(&self, name: &str) -> Option<Value> {
        fetch(self.store, &self.key(name)).await
    }

    pub async fn fetch_str(&self, name: &str) -> Option<String> {
        self.fetch(name)
            .await
            .and_then(|value| value.as_str().map(str::to_owned))
    }

    pub async fn save(&self, name: &str, value: Value) {
        save(self.store, self.key(name), value).await
    }

    pub async fn api_map(&self) -> Vec<ApiMapEntry> {
        let Some(Value::Array(tokens)) = self.fetch(API_MAP).await else {
            return Vec::new();
        };
        tokens
            .iter()
            .filter_map(Value::as_str)
            .filter_map(ApiMapEntry::parse)
            .collect()
    }

    pub async fn last_action(&self) -> Option<ApiMapEntry> {
        self.api_map().await.last().copied()
    }

    /// Appends an entry to the transaction's ApiMap.
    pub async fn record(&self, entry: ApiMapEntry) {
        let mut tokens: Vec<Value> = self
            .api_map()
            .await
            .into_iter()
            .map(|entry| Value::String(entry.token()))
            .collect();
        tokens.push(Value::String(entry.token()));
        self.save(API_MAP, Value::Array(tokens)).await
    }
}

fn transactions_key(session: &str, flow: &str) -> Key {
    Key {
        session: session.to_owned(),
        transaction: None,
        name: format!("transactions:{flow}"),
    }
}

/// Adds a transaction id to the ids seen for a flow of a session. Ids are
/// kept once, in the order they were first seen.
pub async fn record_transaction(store: &dyn StateStore, session: &str, flow: &str, id: &str) {
    let mut ids = transaction_ids(store, session, flow).await;
    if ids.iter().any(|known| known == id) {
        return;
    }
    ids.push(id.to_owned());
    save(
        store,
        transactions_key(session, flow),
        Value::Array(ids.into_iter().map(Value::String).collect()),
    )
    .await
}

/// Transaction ids recorded for a flow of a session, oldest first.
pub async fn transaction_ids(store: &dyn StateStore, session: &str, flow: &str) -> Vec<String> {
    match fetch(store, &transactions_key(session, flow)).await {
        Some(Value::Array(ids)) => ids
            .into_iter()
            .filter_map(|id| id.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

async fn fetch(store: &dyn StateStore, key: &Key) -> Option<Value> {
    match store.get(key).await {
        Ok(value) => value.filter(|value| !value.is_null()),
        Err(err) => {
            observe::state_unavailable(key, &err);
            None
        }
    }
}

async fn save(store: &dyn StateStore, key: Key, value: Value) {
    let display = key.to_string();
    if let Err(err) = store.set(key, value, None).await {
        observe::state_write_dropped(&display, &err);
    }
}
