use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create appointments table; the key is derived from the slot
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id VARCHAR(16) PRIMARY KEY,
            date DATE NOT NULL,
            time VARCHAR(5) NOT NULL,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            reason TEXT NOT NULL DEFAULT '',
            status VARCHAR(16) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'accepted', 'rejected')),
            CONSTRAINT slot_key CHECK (id = to_char(date, 'YYYY-MM-DD') || '_' || time)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create appointment_history table for rejected records replaced by a rebooking
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointment_history (
            history_id BIGSERIAL PRIMARY KEY,
            appointment_id VARCHAR(16) NOT NULL,
            date DATE NOT NULL,
            time VARCHAR(5) NOT NULL,
            name TEXT NOT NULL,
            phone TEXT NOT NULL,
            reason TEXT NOT NULL,
            status VARCHAR(16) NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL,
            archived_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments(date);")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_appointment_history_appointment_id ON appointment_history(appointment_id);",
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
