use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use concierge_core::domain::context::ConversationContext;
use concierge_core::specialists::tool_names;
use concierge_db::repositories::FlightRepository;

use super::{required_arg, Tool, ToolError, ToolOutput};

pub struct FlightStatusTool {
    flights: Arc<dyn FlightRepository>,
}

impl FlightStatusTool {
    pub fn new(flights: Arc<dyn FlightRepository>) -> Self {
        Self { flights }
    }
}

#[async_trait]
impl Tool for FlightStatusTool {
    fn name(&self) -> &'static str {
        tool_names::FLIGHT_STATUS
    }

    fn description(&self) -> &'static str {
        "Reports the live status, gate, terminal and delay of a flight."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let flight_number = required_arg(input, "flight_number", context.flight_number.as_ref())?;

        let Some(flight) = self.flights.find_by_number(&flight_number).await? else {
            return Ok(ToolOutput::text(format!(
                "No flight found for flight number {flight_number}"
            )));
        };

        context.flight_number = Some(flight.flight_number.clone());
        context.flight_id = Some(flight.id);

        Ok(ToolOutput::text(format!(
            "Flight {} Status:\nStatus: {}\nGate: {}\nTerminal: {}\nDelay: {} minutes",
            flight.flight_number,
            flight.current_status.as_deref().unwrap_or("unknown"),
            flight.gate.as_deref().unwrap_or("TBD"),
            flight.terminal.as_deref().unwrap_or("TBD"),
            flight.delay_minutes,
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use concierge_core::domain::context::ConversationContext;

    use super::FlightStatusTool;
    use crate::tools::test_support::store;
    use crate::tools::{Tool, ToolError};

    #[tokio::test]
    async fn reports_status_and_remembers_the_flight() {
        let tool = FlightStatusTool::new(store());
        let mut context = ConversationContext::default();

        let output =
            tool.execute(&json!({ "flight_number": "flt-123" }), &mut context).await.expect("status");

        assert_eq!(
            output.text,
            "Flight FLT-123 Status:\nStatus: Delayed\nGate: A10\nTerminal: 1\nDelay: 30 minutes"
        );
        assert_eq!(context.flight_id, Some(10));
    }

    #[tokio::test]
    async fn unknown_flight_and_missing_number() {
        let tool = FlightStatusTool::new(store());
        let mut context = ConversationContext::default();

        let unknown =
            tool.execute(&json!({ "flight_number": "XX9" }), &mut context).await.expect("status");
        assert_eq!(unknown.text, "No flight found for flight number XX9");

        let missing = tool.execute(&json!({}), &mut context).await.expect_err("no flight");
        assert!(matches!(missing, ToolError::MissingArgument("flight_number")));
    }
}
