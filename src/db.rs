use sqlx::{PgPool, Row};

use crate::palette::Palette;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed_palette(pool: &PgPool) -> anyhow::Result<usize> {
    let defaults = Palette::defaults();
    let mut written = 0usize;

    for (key, color) in defaults.entries() {
        let result = sqlx::query(
            r#"
            INSERT INTO erica.score_palette (key, color)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET color = EXCLUDED.color, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(color)
        .execute(pool)
        .await?;

        written += result.rows_affected() as usize;
    }

    Ok(written)
}

/// Stored colors layered over the built-in palette.
pub async fn fetch_palette(pool: &PgPool) -> anyhow::Result<Palette> {
    let rows = sqlx::query("SELECT key, color FROM erica.score_palette")
        .fetch_all(pool)
        .await?;

    let overrides: Vec<(String, String)> = rows
        .into_iter()
        .map(|row| (row.get("key"), row.get("color")))
        .collect();

    Ok(Palette::defaults().with_overrides(overrides))
}
