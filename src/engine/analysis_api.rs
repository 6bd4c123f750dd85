use super::prompts;
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::AnalysisAPI,
    auth::{Platform, User},
    entities::{RouteAnalysis, RouteAnalysisRequest},
    error::Error,
    external::generation::generate_validated,
};

#[async_trait]
impl AnalysisAPI for Engine {
    #[tracing::instrument(skip(self, input), fields(driver = %input.driver_id))]
    async fn analyze_historical_route(
        &self,
        user: User,
        input: RouteAnalysisRequest,
    ) -> Result<RouteAnalysis, Error> {
        self.authorize(user, "analyze_route", Platform::default())?;

        input.validate()?;

        generate_validated(self.generator.as_ref(), prompts::historical_route(&input)).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{admin, driver_user, engine, ScriptedGenerator};
    use super::*;
    use crate::config::RouteGrounding;
    use crate::db::MemoryStore;
    use chrono::{Duration, Utc};
    use serde_json::json;
    use std::sync::Arc;

    fn input() -> RouteAnalysisRequest {
        let end = Utc::now();
        RouteAnalysisRequest {
            driver_id: "DRI-001".into(),
            start_date: end - Duration::days(1),
            end_date: end,
            live_location_data: "31.32,75.57 at 09:40".into(),
            expected_route: "Jalandhar to Amritsar via NH 3".into(),
        }
    }

    fn analysis() -> serde_json::Value {
        json!({
            "deviations": [
                { "timestamp": "09:40", "latitude": 31.32, "longitude": 75.57, "reason": "detour through Kartarpur" },
            ],
            "summary": "One detour, otherwise on route.",
        })
    }

    #[tokio::test]
    async fn admin_gets_deviations() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(analysis())]));
        let engine = engine(
            Arc::new(MemoryStore::new()),
            generator.clone(),
            RouteGrounding::Knowledge,
        );

        let result = engine
            .analyze_historical_route(admin(), input())
            .await
            .unwrap();
        assert_eq!(result.deviations.len(), 1);
        assert!(generator.requests()[0].prompt.contains("DRI-001"));
    }

    #[tokio::test]
    async fn invalid_request_skips_generation() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(analysis())]));
        let engine = engine(
            Arc::new(MemoryStore::new()),
            generator.clone(),
            RouteGrounding::Knowledge,
        );

        let mut request = input();
        request.live_location_data = "".into();

        let err = engine
            .analyze_historical_route(admin(), request)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input_error());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn drivers_cannot_analyze() {
        let engine = engine(
            Arc::new(MemoryStore::new()),
            Arc::new(ScriptedGenerator::new(vec![Ok(analysis())])),
            RouteGrounding::Knowledge,
        );

        let err = engine
            .analyze_historical_route(driver_user("DRI-001"), input())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized_error());
    }
}
