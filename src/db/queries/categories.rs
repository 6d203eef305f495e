use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::StoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn get_all_categories(pool: &SqlitePool) -> StoreResult<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
SELECT id, type
FROM categories
ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(categories)
}

pub async fn get_category(pool: &SqlitePool, id: i64) -> StoreResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(
        r#"
SELECT id, type FROM categories WHERE categories.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Upserts categories by id, keeping ids stable so question references stay valid.
pub async fn import_categories(pool: &SqlitePool, categories: Vec<Category>) -> StoreResult<()> {
    let mut conn = pool.acquire().await?;
    for category in categories {
        sqlx::query(
            r#"
INSERT INTO categories (id, type) VALUES (?1, ?2)
ON CONFLICT(id) DO UPDATE SET type = excluded.type
            "#,
        )
        .bind(category.id)
        .bind(&category.kind)
        .execute(&mut *conn)
        .await?;
    }
    tracing::debug!("Categories imported");
    Ok(())
}
