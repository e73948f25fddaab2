use crate::domain::{
    report::TestResult,
    rules::{Context, Rule, common},
};

pub struct OnTrack;

#[async_trait::async_trait]
impl Rule for OnTrack {
    fn name(&self) -> &'static str {
        "logistics-legacy::on_track"
    }

    async fn check(&self, ctx: &Context<'_>) -> TestResult {
        let mut checks = ctx.checks();
        let location = &ctx.message.body()["tracking"]["location"];
        let context = ctx.message.context_timestamp();
        let located_at = common::timestamp_at(location, "/time/timestamp");
        let updated_at = common::timestamp_at(location, "/updated_at");

        checks.assert(
            common::not_later(located_at, context) && common::not_later(located_at, updated_at),
            "Location timestamp validation passed",
            "Location timestamp should not be future dated w.r.t context timestamp and updated timestamp",
        );
        checks.assert(
            common::not_later(updated_at, context),
            "Updated timestamp validation passed",
            "Updated timestamp should not be future dated w.r.t context timestamp",
        );

        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::domain::rules::testing::{Harness, message},
        serde_json::json,
    };

    #[tokio::test]
    async fn location_timestamps() {
        let harness = Harness::default();
        let track = |located: &str, updated: &str| {
            message(
                "on_track",
                json!({ "domain": "nic2004:60232" }),
                json!({ "tracking": { "location": {
                    "gps": "12.974002,77.613458",
                    "time": { "timestamp": located },
                    "updated_at": updated
                } } }),
            )
        };

        let result = harness
            .run(&OnTrack, "STANDARD_FLOW", &track("2024-05-01T09:50:00.000Z", "2024-05-01T09:55:00.000Z"))
            .await;
        assert!(result.failed.is_empty());
        assert_eq!(result.passed.len(), 2);

        let result = harness
            .run(&OnTrack, "STANDARD_FLOW", &track("2024-05-01T09:58:00.000Z", "2024-05-01T10:05:00.000Z"))
            .await;
        assert_eq!(
            result.failed,
            vec!["Updated timestamp should not be future dated w.r.t context timestamp"]
        );

        let result = harness
            .run(&OnTrack, "STANDARD_FLOW", &track("2024-05-01T09:58:00.000Z", "2024-05-01T09:55:00.000Z"))
            .await;
        assert_eq!(
            result.failed,
            vec!["Location timestamp should not be future dated w.r.t context timestamp and updated timestamp"]
        );
    }
}
