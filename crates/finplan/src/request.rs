use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, EngineResult};

/// A planning question together with the optional investor profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_gross_income: Option<f64>,
}

impl PlanningRequest {
    pub fn new<S: Into<String>>(query: S) -> Self {
        PlanningRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.query.trim().is_empty() {
            return Err(EngineError::InvalidRequest(
                "Missing or empty 'query' in request.".to_string(),
            ));
        }
        Ok(())
    }

    /// The task text handed to the conversation: the question followed by the profile.
    pub fn enhanced_query(&self) -> String {
        let mut query = self.query.trim().to_string();
        let mut profile = Vec::new();
        if let Some(risk) = non_empty(&self.risk_tolerance) {
            profile.push(format!("- Risk tolerance: {}", risk));
        }
        if let Some(horizon) = non_empty(&self.time_horizon) {
            profile.push(format!("- Time horizon: {}", horizon));
        }
        if let Some(income) = self.annual_gross_income {
            profile.push(format!("- Annual gross income: ${:.2}", income));
        }
        if !profile.is_empty() {
            query.push_str("\n\nInvestor profile:\n");
            query.push_str(&profile.join("\n"));
        }
        query
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
