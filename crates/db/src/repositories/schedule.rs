use sqlx::sqlite::SqliteRow;

use concierge_core::domain::conference::ConferenceSession;

use super::{column, RepositoryError, ScheduleRepository};
use crate::DbPool;

pub struct SqlScheduleRepository {
    pool: DbPool,
}

impl SqlScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn distinct_values(&self, column_name: &str) -> Result<Vec<String>, RepositoryError> {
        let values = sqlx::query_scalar::<_, String>(&format!(
            "SELECT DISTINCT {column_name} FROM conference_schedules
             WHERE {column_name} IS NOT NULL AND TRIM({column_name}) <> ''
             ORDER BY {column_name}"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(values)
    }
}

fn row_to_session(row: &SqliteRow) -> Result<ConferenceSession, RepositoryError> {
    Ok(ConferenceSession {
        id: column(row, "id")?,
        topic: column(row, "topic")?,
        speaker_name: column(row, "speaker_name")?,
        conference_date: column(row, "conference_date")?,
        start_time: column(row, "start_time")?,
        conference_room_name: column(row, "conference_room_name")?,
        track_name: column(row, "track_name")?,
    })
}

#[async_trait::async_trait]
impl ScheduleRepository for SqlScheduleRepository {
    async fn list_sessions(&self, limit: u32) -> Result<Vec<ConferenceSession>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, topic, speaker_name, conference_date, start_time, conference_room_name,
                    track_name
             FROM conference_schedules
             ORDER BY conference_date, start_time, id
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_session).collect()
    }

    async fn list_speakers(&self) -> Result<Vec<String>, RepositoryError> {
        self.distinct_values("speaker_name").await
    }

    async fn list_tracks(&self) -> Result<Vec<String>, RepositoryError> {
        self.distinct_values("track_name").await
    }

    async fn list_rooms(&self) -> Result<Vec<String>, RepositoryError> {
        self.distinct_values("conference_room_name").await
    }
}
