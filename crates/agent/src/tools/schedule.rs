use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use concierge_core::domain::conference::{ConferenceSession, CONFERENCE_NAME};
use concierge_core::domain::context::ConversationContext;
use concierge_core::specialists::tool_names;
use concierge_db::repositories::ScheduleRepository;

use super::{Tool, ToolError, ToolOutput};

pub const SESSION_LIMIT: u32 = 5;
pub const SPEAKER_LIMIT: usize = 10;

fn or_tba(value: Option<&String>) -> &str {
    value.map(String::as_str).filter(|value| !value.trim().is_empty()).unwrap_or("TBA")
}

fn render_sessions(sessions: &[ConferenceSession]) -> String {
    if sessions.is_empty() {
        return "No conference sessions found.".to_string();
    }

    let blocks = sessions
        .iter()
        .enumerate()
        .map(|(index, session)| {
            format!(
                "**{}. {}**\n   Speaker: {}\n   Date: {}\n   Time: {}\n   Room: {}\n   Track: {}",
                index + 1,
                or_tba(session.topic.as_ref()),
                or_tba(session.speaker_name.as_ref()),
                or_tba(session.conference_date.as_ref()),
                or_tba(session.start_time.as_ref()),
                or_tba(session.conference_room_name.as_ref()),
                or_tba(session.track_name.as_ref()),
            )
        })
        .collect::<Vec<_>>();
    format!(
        "**{CONFERENCE_NAME} Sessions** ({} found):\n\n{}",
        sessions.len(),
        blocks.join("\n\n")
    )
}

/// Numbered list with a "...and N more" tail once `limit` is exceeded.
fn render_list(noun: &str, values: &[String], limit: Option<usize>) -> String {
    if values.is_empty() {
        return format!("No {} found.", noun.to_lowercase());
    }

    let shown = limit.unwrap_or(values.len()).min(values.len());
    let lines = values
        .iter()
        .take(shown)
        .enumerate()
        .map(|(index, value)| format!("{}. {value}", index + 1))
        .collect::<Vec<_>>();
    let mut out =
        format!("**{CONFERENCE_NAME} {noun}** ({} total):\n\n{}", values.len(), lines.join("\n"));
    if values.len() > shown {
        out.push_str(&format!("\n\n...and {} more {}.", values.len() - shown, noun.to_lowercase()));
    }
    out
}

pub struct ConferenceSessionsTool {
    schedule: Arc<dyn ScheduleRepository>,
}

impl ConferenceSessionsTool {
    pub fn new(schedule: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule }
    }
}

#[async_trait]
impl Tool for ConferenceSessionsTool {
    fn name(&self) -> &'static str {
        tool_names::CONFERENCE_SESSIONS
    }

    fn description(&self) -> &'static str {
        "Lists upcoming summit sessions in schedule order."
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let sessions = self.schedule.list_sessions(SESSION_LIMIT).await?;
        Ok(ToolOutput::text(render_sessions(&sessions)))
    }
}

pub struct AllSpeakersTool {
    schedule: Arc<dyn ScheduleRepository>,
}

impl AllSpeakersTool {
    pub fn new(schedule: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule }
    }
}

#[async_trait]
impl Tool for AllSpeakersTool {
    fn name(&self) -> &'static str {
        tool_names::ALL_SPEAKERS
    }

    fn description(&self) -> &'static str {
        "Lists the distinct summit speakers."
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let speakers = self.schedule.list_speakers().await?;
        Ok(ToolOutput::text(render_list("Speakers", &speakers, Some(SPEAKER_LIMIT))))
    }
}

pub struct AllTracksTool {
    schedule: Arc<dyn ScheduleRepository>,
}

impl AllTracksTool {
    pub fn new(schedule: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule }
    }
}

#[async_trait]
impl Tool for AllTracksTool {
    fn name(&self) -> &'static str {
        tool_names::ALL_TRACKS
    }

    fn description(&self) -> &'static str {
        "Lists the summit tracks."
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let tracks = self.schedule.list_tracks().await?;
        Ok(ToolOutput::text(render_list("Tracks", &tracks, None)))
    }
}

pub struct AllRoomsTool {
    schedule: Arc<dyn ScheduleRepository>,
}

impl AllRoomsTool {
    pub fn new(schedule: Arc<dyn ScheduleRepository>) -> Self {
        Self { schedule }
    }
}

#[async_trait]
impl Tool for AllRoomsTool {
    fn name(&self) -> &'static str {
        tool_names::ALL_ROOMS
    }

    fn description(&self) -> &'static str {
        "Lists the rooms hosting summit sessions."
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let rooms = self.schedule.list_rooms().await?;
        Ok(ToolOutput::text(render_list("Rooms", &rooms, None)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use concierge_core::domain::context::ConversationContext;
    use concierge_db::InMemoryRecordStore;

    use super::{render_list, AllRoomsTool, AllSpeakersTool, ConferenceSessionsTool};
    use crate::tools::test_support::{session, store};
    use crate::tools::Tool;

    #[tokio::test]
    async fn sessions_are_listed_in_schedule_order() {
        let tool = ConferenceSessionsTool::new(store());
        let mut context = ConversationContext::default();

        let output = tool.execute(&json!({}), &mut context).await.expect("sessions");

        assert!(output.text.starts_with("**Aviation Tech Summit 2025 Sessions** (3 found):"));
        let first = output.text.find("Topic 1").expect("topic 1");
        let third = output.text.find("Topic 3").expect("topic 3");
        assert!(first < third);
        assert!(output.text.contains("Room: Main Hall"));
    }

    #[tokio::test]
    async fn sessions_are_capped() {
        let mut store = InMemoryRecordStore::default();
        for id in 1..=7 {
            store = store.with_session(session(id, "Speaker", "Room A", "Track"));
        }
        let tool = ConferenceSessionsTool::new(Arc::new(store));

        let output =
            tool.execute(&json!({}), &mut ConversationContext::default()).await.expect("sessions");

        assert!(output.text.contains("(5 found)"));
        assert!(!output.text.contains("Topic 6"));
    }

    #[tokio::test]
    async fn speakers_and_rooms_are_distinct() {
        let mut context = ConversationContext::default();

        let speakers =
            AllSpeakersTool::new(store()).execute(&json!({}), &mut context).await.expect("speakers");
        assert!(speakers.text.contains("(2 total)"));
        assert!(speakers.text.contains("1. Dr. Amara Nwosu"));

        let rooms = AllRoomsTool::new(store()).execute(&json!({}), &mut context).await.expect("rooms");
        assert_eq!(rooms.text, "**Aviation Tech Summit 2025 Rooms** (2 total):\n\n1. Main Hall\n2. Room A");
    }

    #[test]
    fn long_lists_are_truncated_with_a_tail() {
        let speakers: Vec<String> = (1..=12).map(|n| format!("Speaker {n:02}")).collect();

        let rendered = render_list("Speakers", &speakers, Some(10));

        assert!(rendered.contains("10. Speaker 10"));
        assert!(!rendered.contains("Speaker 11"));
        assert!(rendered.ends_with("...and 2 more speakers."));
        assert_eq!(render_list("Tracks", &[], None), "No tracks found.");
    }
}
