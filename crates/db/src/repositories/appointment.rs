use crate::{models::DbAppointment, store::StoreChange};
use chrono::NaiveDate;
use eyre::Result;
use slotbook_core::models::appointment::{AppointmentDraft, AppointmentId, AppointmentStatus};
use sqlx::PgConnection;

/// Channel used with `pg_notify` for the store's change feed.
pub const CHANGE_CHANNEL: &str = "appointment_changes";

pub async fn insert_if_absent(
    conn: &mut PgConnection,
    draft: &AppointmentDraft,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Inserting appointment if absent: id={}", draft.id);

    let inserted = sqlx::query_as::<_, DbAppointment>(
        r#"
        INSERT INTO appointments (id, date, time, name, phone, reason, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW())
        ON CONFLICT (id) DO NOTHING
        RETURNING id, date, time, name, phone, reason, status, created_at
        "#,
    )
    .bind(draft.id.to_string())
    .bind(draft.date)
    .bind(draft.time.to_string())
    .bind(&draft.name)
    .bind(&draft.phone)
    .bind(&draft.reason)
    .fetch_optional(conn)
    .await?;

    Ok(inserted)
}

/// Reads a record and holds its row lock until the transaction ends.
pub async fn lock_appointment(
    conn: &mut PgConnection,
    id: AppointmentId,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, time, name, phone, reason, status, created_at
        FROM appointments
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(conn)
    .await?;

    Ok(appointment)
}

pub async fn archive_appointment(conn: &mut PgConnection, id: AppointmentId) -> Result<()> {
    tracing::debug!("Archiving appointment: id={}", id);

    sqlx::query(
        r#"
        INSERT INTO appointment_history
            (appointment_id, date, time, name, phone, reason, status, created_at, archived_at)
        SELECT id, date, time, name, phone, reason, status, created_at, NOW()
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id.to_string())
    .execute(conn)
    .await?;

    Ok(())
}

/// Overwrites the record at `draft.id` with a fresh pending reservation.
pub async fn replace_appointment(
    conn: &mut PgConnection,
    draft: &AppointmentDraft,
) -> Result<DbAppointment> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET name = $2, phone = $3, reason = $4, status = 'pending', created_at = NOW()
        WHERE id = $1
        RETURNING id, date, time, name, phone, reason, status, created_at
        "#,
    )
    .bind(draft.id.to_string())
    .bind(&draft.name)
    .bind(&draft.phone)
    .bind(&draft.reason)
    .fetch_one(conn)
    .await?;

    Ok(appointment)
}

pub async fn get_appointment(
    conn: &mut PgConnection,
    id: AppointmentId,
) -> Result<Option<DbAppointment>> {
    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, time, name, phone, reason, status, created_at
        FROM appointments
        WHERE id = $1
        "#,
    )
    .bind(id.to_string())
    .fetch_optional(conn)
    .await?;

    Ok(appointment)
}

pub async fn update_status(
    conn: &mut PgConnection,
    id: AppointmentId,
    from: AppointmentStatus,
    to: AppointmentStatus,
) -> Result<Option<DbAppointment>> {
    tracing::debug!("Updating appointment status: id={}, {} -> {}", id, from, to);

    let appointment = sqlx::query_as::<_, DbAppointment>(
        r#"
        UPDATE appointments
        SET status = $3
        WHERE id = $1 AND status = $2
        RETURNING id, date, time, name, phone, reason, status, created_at
        "#,
    )
    .bind(id.to_string())
    .bind(from.as_str())
    .bind(to.as_str())
    .fetch_optional(conn)
    .await?;

    Ok(appointment)
}

pub async fn delete_with_status(
    conn: &mut PgConnection,
    id: AppointmentId,
    status: AppointmentStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM appointments
        WHERE id = $1 AND status = $2
        "#,
    )
    .bind(id.to_string())
    .bind(status.as_str())
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_appointments(
    conn: &mut PgConnection,
    date: Option<NaiveDate>,
) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT id, date, time, name, phone, reason, status, created_at
        FROM appointments
        WHERE $1::date IS NULL OR date = $1
        ORDER BY date ASC, time ASC
        "#,
    )
    .bind(date)
    .fetch_all(conn)
    .await?;

    Ok(appointments)
}

pub async fn list_history(conn: &mut PgConnection, id: AppointmentId) -> Result<Vec<DbAppointment>> {
    let archived = sqlx::query_as::<_, DbAppointment>(
        r#"
        SELECT appointment_id AS id, date, time, name, phone, reason, status, created_at
        FROM appointment_history
        WHERE appointment_id = $1
        ORDER BY archived_at ASC, history_id ASC
        "#,
    )
    .bind(id.to_string())
    .fetch_all(conn)
    .await?;

    Ok(archived)
}

/// Queues a change notification; Postgres delivers it when the surrounding
/// transaction commits.
pub async fn notify_change(conn: &mut PgConnection, change: &StoreChange) -> Result<()> {
    let payload = serde_json::to_string(change)?;

    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(CHANGE_CHANNEL)
        .bind(payload)
        .execute(conn)
        .await?;

    Ok(())
}
