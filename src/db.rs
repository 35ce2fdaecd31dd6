use anyhow::Context;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    CounselingResource, DiaryEntry, LevelThresholds, RiskDetectionSettings, RiskLevel,
};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    let statements = [
        "CREATE SCHEMA IF NOT EXISTS emotion_diary",
        r#"
        CREATE TABLE IF NOT EXISTS emotion_diary.users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS emotion_diary.diary_entries (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL REFERENCES emotion_diary.users (id),
            entry_date DATE NOT NULL,
            emotion TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            UNIQUE (user_id, entry_date)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS emotion_diary.risk_settings (
            id INT PRIMARY KEY DEFAULT 1 CHECK (id = 1),
            monitoring_period INT NOT NULL,
            high_consecutive_score INT NOT NULL,
            high_score_in_period INT NOT NULL,
            medium_consecutive_score INT NOT NULL,
            medium_score_in_period INT NOT NULL,
            low_consecutive_score INT NOT NULL,
            low_score_in_period INT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS emotion_diary.counseling_resources (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            is_urgent BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS emotion_diary.risk_sessions (
            user_id UUID PRIMARY KEY REFERENCES emotion_diary.users (id),
            alert_shown_at TIMESTAMPTZ NOT NULL
        )
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    // Settings row exists from the start so the admin commands always have
    // something to read and update.
    let defaults = RiskDetectionSettings::default();
    sqlx::query(
        r#"
        INSERT INTO emotion_diary.risk_settings
        (id, monitoring_period,
         high_consecutive_score, high_score_in_period,
         medium_consecutive_score, medium_score_in_period,
         low_consecutive_score, low_score_in_period)
        VALUES (1, $1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(defaults.monitoring_period as i32)
    .bind(defaults.high.consecutive_score)
    .bind(defaults.high.score_in_period)
    .bind(defaults.medium.consecutive_score)
    .bind(defaults.medium.score_in_period)
    .bind(defaults.low.consecutive_score)
    .bind(defaults.low.score_in_period)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let users = vec![
        (
            Uuid::parse_str("7c1f4a8e-5b02-4d56-9b3a-1f2e6c8d0a41")?,
            "Mina Park",
            "mina.park@example.com",
        ),
        (
            Uuid::parse_str("2e9b6d1c-8f43-4a07-b5c2-94d07e3f6a88")?,
            "Juno Kim",
            "juno.kim@example.com",
        ),
    ];

    for (id, name, email) in users {
        sqlx::query(
            r#"
            INSERT INTO emotion_diary.users (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .execute(pool)
        .await?;
    }

    let today = Utc::now().date_naive();
    let entries = vec![
        ("mina.park@example.com", 0, "sadness", "Could not get out of bed"),
        ("mina.park@example.com", 1, "sadness", "Another heavy day"),
        ("mina.park@example.com", 2, "anxiety", "Worried about the interview"),
        ("mina.park@example.com", 3, "happy", "Lunch with an old friend"),
        ("mina.park@example.com", 4, "disgust", "Argument at work"),
        ("mina.park@example.com", 5, "neutral", "Quiet day"),
        ("juno.kim@example.com", 0, "happy", "Finished the book"),
        ("juno.kim@example.com", 2, "neutral", "Nothing special"),
    ];

    for (email, days_ago, emotion, note) in entries {
        let user_id = user_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO emotion_diary.diary_entries
            (id, user_id, entry_date, emotion, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, entry_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(today - Duration::days(days_ago))
        .bind(emotion)
        .bind(note)
        .execute(pool)
        .await?;
    }

    let resources = vec![
        ("Suicide Prevention Lifeline", "1393", true),
        ("Mental Health Crisis Line", "1577-0199", true),
        ("Community Counseling Center", "02-715-8600", false),
    ];

    for (name, phone, is_urgent) in resources {
        sqlx::query(
            r#"
            INSERT INTO emotion_diary.counseling_resources (id, name, phone, is_urgent)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE
            SET phone = EXCLUDED.phone, is_urgent = EXCLUDED.is_urgent
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(phone)
        .bind(is_urgent)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn user_id_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let row = sqlx::query("SELECT id FROM emotion_diary.users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no user registered with email {email}"))?;

    Ok(row.get("id"))
}

/// Diary entries for one user inside the monitoring window, newest first.
/// This ordering is what the streak calculation relies on.
pub async fn fetch_recent_entries(
    pool: &PgPool,
    user_id: Uuid,
    since_date: NaiveDate,
) -> anyhow::Result<Vec<DiaryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT entry_date, emotion, note
        FROM emotion_diary.diary_entries
        WHERE user_id = $1 AND entry_date >= $2
        ORDER BY entry_date DESC
        "#,
    )
    .bind(user_id)
    .bind(since_date)
    .fetch_all(pool)
    .await?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(DiaryEntry {
            entry_date: row.get("entry_date"),
            emotion: row.get("emotion"),
            note: row.get("note"),
        });
    }

    Ok(entries)
}

pub async fn load_settings(pool: &PgPool) -> anyhow::Result<RiskDetectionSettings> {
    let row = sqlx::query(
        r#"
        SELECT monitoring_period,
               high_consecutive_score, high_score_in_period,
               medium_consecutive_score, medium_score_in_period,
               low_consecutive_score, low_score_in_period
        FROM emotion_diary.risk_settings
        WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(RiskDetectionSettings::default());
    };

    Ok(RiskDetectionSettings {
        monitoring_period: row.get::<i32, _>("monitoring_period") as i64,
        high: LevelThresholds {
            consecutive_score: row.get("high_consecutive_score"),
            score_in_period: row.get("high_score_in_period"),
        },
        medium: LevelThresholds {
            consecutive_score: row.get("medium_consecutive_score"),
            score_in_period: row.get("medium_score_in_period"),
        },
        low: LevelThresholds {
            consecutive_score: row.get("low_consecutive_score"),
            score_in_period: row.get("low_score_in_period"),
        },
    })
}

pub async fn save_settings(
    pool: &PgPool,
    settings: &RiskDetectionSettings,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO emotion_diary.risk_settings
        (id, monitoring_period,
         high_consecutive_score, high_score_in_period,
         medium_consecutive_score, medium_score_in_period,
         low_consecutive_score, low_score_in_period, updated_at)
        VALUES (1, $1, $2, $3, $4, $5, $6, $7, now())
        ON CONFLICT (id) DO UPDATE
        SET monitoring_period = EXCLUDED.monitoring_period,
            high_consecutive_score = EXCLUDED.high_consecutive_score,
            high_score_in_period = EXCLUDED.high_score_in_period,
            medium_consecutive_score = EXCLUDED.medium_consecutive_score,
            medium_score_in_period = EXCLUDED.medium_score_in_period,
            low_consecutive_score = EXCLUDED.low_consecutive_score,
            low_score_in_period = EXCLUDED.low_score_in_period,
            updated_at = now()
        "#,
    )
    .bind(settings.monitoring_period as i32)
    .bind(settings.high.consecutive_score)
    .bind(settings.high.score_in_period)
    .bind(settings.medium.consecutive_score)
    .bind(settings.medium.score_in_period)
    .bind(settings.low.consecutive_score)
    .bind(settings.low.score_in_period)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn counseling_resources(pool: &PgPool) -> anyhow::Result<Vec<CounselingResource>> {
    let rows = sqlx::query(
        "SELECT name, phone, is_urgent FROM emotion_diary.counseling_resources ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    let mut resources = Vec::new();
    for row in rows {
        resources.push(CounselingResource {
            name: row.get("name"),
            phone: row.get("phone"),
            is_urgent: row.get("is_urgent"),
        });
    }

    Ok(resources)
}

/// Phone numbers surfaced in a high-risk alert. Levels below `high` never
/// attach them.
pub async fn urgent_counseling_phones(
    pool: &PgPool,
    risk_level: RiskLevel,
) -> anyhow::Result<Vec<String>> {
    if risk_level != RiskLevel::High {
        return Ok(Vec::new());
    }

    let resources = counseling_resources(pool).await?;
    Ok(resources
        .into_iter()
        .filter(|resource| resource.is_urgent)
        .map(|resource| resource.phone)
        .collect())
}

pub async fn alert_already_shown(pool: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let row = sqlx::query("SELECT 1 AS present FROM emotion_diary.risk_sessions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub async fn mark_alert_shown(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO emotion_diary.risk_sessions (user_id, alert_shown_at)
        VALUES ($1, now())
        ON CONFLICT (user_id) DO UPDATE
        SET alert_shown_at = now()
        "#,
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Session teardown on logout: the next login may show the alert again.
pub async fn reset_session(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM emotion_diary.risk_sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        email: String,
        display_name: String,
        entry_date: NaiveDate,
        emotion: String,
        note: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let user_id: Uuid = sqlx::query(
            r#"
            INSERT INTO emotion_diary.users (id, email, display_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET display_name = EXCLUDED.display_name
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&row.email)
        .bind(&row.display_name)
        .fetch_one(pool)
        .await?
        .get("id");

        let result = sqlx::query(
            r#"
            INSERT INTO emotion_diary.diary_entries
            (id, user_id, entry_date, emotion, note)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, entry_date) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(row.entry_date)
        .bind(&row.emotion)
        .bind(row.note.unwrap_or_default())
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
