use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceSession {
    pub id: i64,
    pub topic: Option<String>,
    pub speaker_name: Option<String>,
    pub conference_date: Option<String>,
    pub start_time: Option<String>,
    pub conference_room_name: Option<String>,
    pub track_name: Option<String>,
}

pub const CONFERENCE_NAME: &str = "Aviation Tech Summit 2025";
