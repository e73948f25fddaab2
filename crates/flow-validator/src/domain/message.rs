use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// One captured protocol exchange as handed out by the payload store.
///
/// Messages are read-only to the engine; rules only ever inspect the request
/// and response bodies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub flow_id: String,
    /// Raw action token, not necessarily lower case.
    pub action: String,
    #[serde(default)]
    pub bpp_id: Option<String>,
    #[serde(default)]
    pub bap_id: Option<String>,
    #[serde(default)]
    pub payload_id: Option<String>,
    pub json_request: Value,
    #[serde(default)]
    pub json_response: Option<Value>,
    #[serde(default)]
    pub http_status: Option<u16>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Message {
    /// The request envelope's `context` object, or `Null`.
    pub fn context(&self) -> &Value {
        &self.json_request["context"]
    }

    /// The request's `message` object, or `Null`.
    pub fn body(&self) -> &Value {
        &self.json_request["message"]
    }

    pub fn domain(&self) -> Option<&str> {
        self.context()["domain"].as_str()
    }

    pub fn version(&self) -> Option<&str> {
        let context = self.context();
        context["version"]
            .as_str()
            .or_else(|| context["core_version"].as_str())
    }

    /// The transaction id from the request context, falling back to the one
    /// recorded by the payload store.
    pub fn transaction(&self) -> &str {
        self.context()["transaction_id"]
            .as_str()
            .unwrap_or(&self.transaction_id)
    }

    pub fn context_timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.context()["timestamp"])
    }

    /// The synchronous ACK/NACK response the counterparty returned, if any.
    pub fn response(&self) -> Option<&Value> {
        self.json_response
            .as_ref()
            .map(|response| &response["response"])
            .filter(|response| !response.is_null())
    }
}

/// Parses an RFC 3339 timestamp held in a JSON string.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[test]
    fn deserializes_payload_store_shape() {
        let message: Message = serde_json::from_value(json!({
            "id": 7,
            "messageId": "m-1",
            "transactionId": "t-stored",
            "flowId": "STANDARD_FLOW",
            "action": "ON_SEARCH",
            "bppId": null,
            "bapId": "buyer.example",
            "payloadId": "p-1",
            "jsonRequest": {
                "context": {
                    "domain": "ONDC:LOG10",
                    "core_version": "1.2.5",
                    "transaction_id": "t-context",
                    "timestamp": "2024-05-01T10:00:00.000Z"
                },
                "message": { "catalog": {} }
            },
            "jsonResponse": { "response": { "message": { "ack": { "status": "ACK" } } } },
            "httpStatus": 200,
            "createdAt": "2024-05-01T10:00:01.000Z",
            "updatedAt": "2024-05-01T10:00:01.000Z"
        }))
        .unwrap();

        assert_eq!(message.domain(), Some("ONDC:LOG10"));
        assert_eq!(message.version(), Some("1.2.5"));
        assert_eq!(message.transaction(), "t-context");
        assert_eq!(
            message.context_timestamp().unwrap().to_rfc3339(),
            "2024-05-01T10:00:00+00:00"
        );
        assert_eq!(
            message.response().unwrap()["message"]["ack"]["status"],
            "ACK"
        );
        assert!(message.body()["catalog"].is_object());
    }

    #[test]
    fn missing_response_is_absent() {
        let message: Message = serde_json::from_value(json!({
            "action": "search",
            "transactionId": "t-1",
            "jsonRequest": { "context": {} },
            "createdAt": "2024-05-01T10:00:01Z"
        }))
        .unwrap();

        assert_eq!(message.response(), None);
        assert_eq!(message.transaction(), "t-1");
        assert_eq!(message.context_timestamp(), None);
    }
}
