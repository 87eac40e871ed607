use async_trait::async_trait;
use quiz_core::model::{UserSettings, UserSettingsDraft};
use sqlx::Row;

use super::{
    SqliteRepository,
    mapping::{bool_from_i64, conn, ser},
};
use crate::repository::{StorageError, UserSettingsRepository};

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

#[async_trait]
impl UserSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<UserSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT sync_progress, initial_reoccurrences, wrong_answer_reoccurrences
            FROM user_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let draft = UserSettingsDraft {
            sync_progress: bool_from_i64(
                "sync_progress",
                row.try_get("sync_progress").map_err(ser)?,
            )?,
            initial_reoccurrences: u32_from_i64(
                "initial_reoccurrences",
                row.try_get("initial_reoccurrences").map_err(ser)?,
            )?,
            wrong_answer_reoccurrences: u32_from_i64(
                "wrong_answer_reoccurrences",
                row.try_get("wrong_answer_reoccurrences").map_err(ser)?,
            )?,
        };

        UserSettings::from_persisted(draft).map(Some).map_err(ser)
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_settings (
                id, sync_progress, initial_reoccurrences, wrong_answer_reoccurrences
            )
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                sync_progress = excluded.sync_progress,
                initial_reoccurrences = excluded.initial_reoccurrences,
                wrong_answer_reoccurrences = excluded.wrong_answer_reoccurrences
            ",
        )
        .bind(1_i64)
        .bind(i64::from(settings.sync_progress()))
        .bind(i64::from(settings.initial_reoccurrences()))
        .bind(i64::from(settings.wrong_answer_reoccurrences()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
