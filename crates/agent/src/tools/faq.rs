use async_trait::async_trait;
use serde_json::Value;

use concierge_core::domain::context::ConversationContext;
use concierge_core::specialists::tool_names;

use super::{string_arg, Tool, ToolError, ToolOutput};

const BAGGAGE_WORDS: &[&str] = &["bag", "baggage", "luggage", "carry", "checked"];
const AIRCRAFT_WORDS: &[&str] =
    &["seats", "plane", "aircraft", "how many", "configuration", "layout"];

const BAGGAGE_ANSWER: &str = "**Baggage Information:**\n\n\
**Carry-on:** one bag up to 22\" x 14\" x 9\" (56cm x 36cm x 23cm) and 50 pounds (22.7 kg), \
plus one personal item such as a laptop bag.\n\
**Checked:** the first bag is included in most fares; additional bags cost $50-$150 depending \
on the route. Each bag may weigh up to 50 pounds (22.7 kg); bags of 51-70 lbs incur a \
$100-$200 overweight fee.\n\
**Restricted:** liquids over 3.4oz in carry-on, sharp objects or tools over 7 inches, \
flammable materials and batteries over 100Wh.";

const AIRCRAFT_ANSWER: &str = "**Aircraft Configuration:**\n\n\
**Total capacity:** 120 passengers.\n\
- **Business Class:** 22 seats (rows 1-4) with priority boarding and complimentary meals.\n\
- **Economy Plus:** 20 seats (rows 5-8) with 4-6 inches of extra legroom.\n\
- **Economy:** 78 seats (rows 9-24) in a 3-3 layout.\n\
Exit rows are 4 and 16. Window seats are A and F, aisle seats C and D, middle seats B and E.";

const OVERVIEW_ANSWER: &str = "I can answer questions about:\n\n\
- **Baggage policies:** carry-on and checked bag rules\n\
- **Aircraft information:** seating, configuration and capacity\n\
- **Check-in procedures:** online and airport options\n\
- **Cancellation policies:** refunds and change fees\n\n\
Please ask about one of these topics. For questions about a specific booking, share your \
confirmation number.";

/// Canned answers to common airline policy questions.
pub struct FaqLookupTool;

pub fn answer(question: &str) -> &'static str {
    let question = question.to_lowercase();
    if BAGGAGE_WORDS.iter().any(|word| question.contains(word)) {
        BAGGAGE_ANSWER
    } else if AIRCRAFT_WORDS.iter().any(|word| question.contains(word)) {
        AIRCRAFT_ANSWER
    } else {
        OVERVIEW_ANSWER
    }
}

#[async_trait]
impl Tool for FaqLookupTool {
    fn name(&self) -> &'static str {
        tool_names::FAQ_LOOKUP
    }

    fn description(&self) -> &'static str {
        "Answers airline policy questions about baggage, aircraft and check-in."
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let question = string_arg(input, "question").ok_or(ToolError::MissingArgument("question"))?;
        Ok(ToolOutput::text(answer(&question)))
    }
}
