use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{round_to, BurnoutAssessment, DailyTrend, HistoryEntry, TeamMember};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let employees = vec![
        (
            "Avery Lee",
            "engineering",
            vec![("content", 82.0), ("happy", 88.5), ("focused", 85.0), ("happy", 91.0)],
        ),
        (
            "Jules Moreno",
            "engineering",
            vec![("tired", 61.0), ("stressed", 52.5), ("stressed", 47.0), ("angry", 38.5)],
        ),
        (
            "Kiara Patel",
            "support",
            vec![("neutral", 70.0), ("calm", 72.5), ("tired", 66.0), ("neutral", 68.0)],
        ),
    ];

    let now = Utc::now();
    for (name, department, history) in employees {
        let employee_id = upsert_employee(pool, name, Some(department)).await?;

        let existing: i64 = sqlx::query(
            "SELECT COUNT(*) AS entries FROM mood_dashboard.mood_entries WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_one(pool)
        .await?
        .get("entries");
        if existing > 0 {
            continue;
        }

        let days = history.len() as i64;
        for (offset, (mood, score)) in history.into_iter().enumerate() {
            let recorded_at = now - Duration::days(days - offset as i64);
            insert_mood_entry(pool, employee_id, mood, Some(score), recorded_at).await?;
        }
    }

    Ok(())
}

pub async fn upsert_employee(
    pool: &PgPool,
    name: &str,
    department: Option<&str>,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO mood_dashboard.employees (id, full_name, department)
        VALUES ($1, $2, $3)
        ON CONFLICT (full_name) DO UPDATE
        SET department = COALESCE(EXCLUDED.department, mood_dashboard.employees.department)
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(department)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to upsert employee {name}"))?
    .get("id");

    Ok(id)
}

async fn insert_mood_entry(
    pool: &PgPool,
    employee_id: Uuid,
    mood: &str,
    burnout_score: Option<f64>,
    recorded_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO mood_dashboard.mood_entries
        (id, employee_id, mood, burnout_score, recorded_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(mood.trim().to_lowercase())
    .bind(burnout_score)
    .bind(recorded_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Appends one mood sample. Entries are never updated afterwards.
pub async fn record_mood(
    pool: &PgPool,
    employee: &str,
    department: Option<&str>,
    mood: &str,
    burnout_score: Option<f64>,
) -> anyhow::Result<Uuid> {
    let employee_id = upsert_employee(pool, employee, department).await?;
    insert_mood_entry(pool, employee_id, mood, burnout_score, Utc::now()).await?;
    Ok(employee_id)
}

/// The most recent `limit` entries for an employee, oldest first.
pub async fn fetch_history(
    pool: &PgPool,
    employee: &str,
    limit: i64,
) -> anyhow::Result<Vec<HistoryEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT m.mood, m.burnout_score, m.recorded_at
        FROM mood_dashboard.mood_entries m
        JOIN mood_dashboard.employees e ON e.id = m.employee_id
        WHERE e.full_name = $1
        ORDER BY m.recorded_at DESC
        LIMIT $2
        "#,
    )
    .bind(employee)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut history: Vec<HistoryEntry> = rows
        .into_iter()
        .map(|row| HistoryEntry {
            mood: row.get("mood"),
            burnout_score: row.get("burnout_score"),
            recorded_at: Some(row.get("recorded_at")),
        })
        .collect();
    history.reverse();

    Ok(history)
}

pub async fn save_assessment(
    pool: &PgPool,
    employee_id: Uuid,
    assessment: &BurnoutAssessment,
    degraded: bool,
) -> anyhow::Result<()> {
    let factors: Vec<String> = assessment.risk_factors.iter().cloned().collect();

    sqlx::query(
        r#"
        INSERT INTO mood_dashboard.assessments
        (id, employee_id, score, risk_tier, risk_factors, confidence, formula, degraded)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(assessment.score)
    .bind(assessment.risk_tier.as_str())
    .bind(factors)
    .bind(assessment.confidence)
    .bind(assessment.formula.as_str())
    .bind(degraded)
    .execute(pool)
    .await
    .context("failed to save assessment")?;

    Ok(())
}

/// Latest scored entry per employee.
pub async fn fetch_team_members(
    pool: &PgPool,
    department: Option<&str>,
) -> anyhow::Result<Vec<TeamMember>> {
    let mut query = String::from(
        "SELECT DISTINCT ON (e.id) e.full_name, m.burnout_score, m.mood \
         FROM mood_dashboard.mood_entries m \
         JOIN mood_dashboard.employees e ON e.id = m.employee_id \
         WHERE m.burnout_score IS NOT NULL",
    );

    if department.is_some() {
        query.push_str(" AND e.department = $1");
    }
    query.push_str(" ORDER BY e.id, m.recorded_at DESC");

    let mut rows = sqlx::query(&query);
    if let Some(value) = department {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut members = Vec::new();

    for row in records {
        members.push(TeamMember {
            name: Some(row.get("full_name")),
            score: row.get("burnout_score"),
            mood: Some(row.get("mood")),
        });
    }

    Ok(members)
}

pub async fn fetch_daily_trends(
    pool: &PgPool,
    since_date: NaiveDate,
    department: Option<&str>,
) -> anyhow::Result<Vec<DailyTrend>> {
    let mut query = String::from(
        "SELECT DATE(m.recorded_at) AS day, \
         AVG(m.burnout_score) AS avg_score, \
         COUNT(*) AS entry_count, \
         MODE() WITHIN GROUP (ORDER BY m.mood) AS most_common_mood \
         FROM mood_dashboard.mood_entries m \
         JOIN mood_dashboard.employees e ON e.id = m.employee_id \
         WHERE DATE(m.recorded_at) >= $1",
    );

    if department.is_some() {
        query.push_str(" AND e.department = $2");
    }
    query.push_str(" GROUP BY day ORDER BY day DESC");

    let mut rows = sqlx::query(&query).bind(since_date);
    if let Some(value) = department {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut trends = Vec::new();

    for row in records {
        let avg_score: Option<f64> = row.get("avg_score");
        trends.push(DailyTrend {
            day: row.get("day"),
            avg_score: round_to(avg_score.unwrap_or(0.0), 1),
            entry_count: row.get("entry_count"),
            most_common_mood: row.get("most_common_mood"),
        });
    }

    Ok(trends)
}
