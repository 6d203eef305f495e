use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::db::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> StoreResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> StoreResult<Option<Question>> {
    let question = sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(question)
}

pub async fn get_questions_by_category(
    pool: &SqlitePool,
    category: i64,
) -> StoreResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
SELECT id, question, answer, category, difficulty FROM questions WHERE questions.category = ?1 ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

/// Case-insensitive substring match on the question text.
///
/// SQLite's `LIKE` only folds ASCII, so matching runs on Unicode-lowercased text here.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> StoreResult<Vec<Question>> {
    let term = term.to_lowercase();
    let questions = get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect();
    Ok(questions)
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: i64,
    difficulty: i64,
) -> StoreResult<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    if get_question(pool, id).await?.is_none() {
        return Err(StoreError::NotFound);
    }
    let mut conn = pool.acquire().await?;

    sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Upserts questions by id. Category references are taken as-is.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> StoreResult<()> {
    let mut conn = pool.acquire().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT(id) DO UPDATE SET
    question = excluded.question,
    answer = excluded.answer,
    category = excluded.category,
    difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(&question.question)
        .bind(&question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *conn)
        .await?;
    }
    tracing::debug!("Questions imported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_in_memory, run_migrations};

    async fn pool() -> SqlitePool {
        let pool = connect_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn created_question_is_readable() {
        let pool = pool().await;
        let id = create_question(&pool, "What is H2O?", "Water", 1, 1)
            .await
            .unwrap();

        let question = get_question(&pool, id).await.unwrap().unwrap();
        assert_eq!(
            question,
            Question {
                id,
                question: "What is H2O?".into(),
                answer: "Water".into(),
                category: 1,
                difficulty: 1,
            }
        );
    }

    #[tokio::test]
    async fn filters_by_category() {
        let pool = pool().await;
        create_question(&pool, "a", "a", 1, 1).await.unwrap();
        let second = create_question(&pool, "b", "b", 2, 3).await.unwrap();
        create_question(&pool, "c", "c", 1, 2).await.unwrap();

        let in_second: Vec<i64> = get_questions_by_category(&pool, 2)
            .await
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(in_second, [second]);
        assert_eq!(get_questions_by_category(&pool, 1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let pool = pool().await;
        let id = create_question(&pool, "Who painted the Mona Lisa?", "Da Vinci", 2, 3)
            .await
            .unwrap();
        create_question(&pool, "What is H2O?", "Water", 1, 1)
            .await
            .unwrap();

        let found = search_questions(&pool, "mona LISA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, id);
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = pool().await;
        let id = create_question(&pool, "Who wrote ÉMILE?", "Rousseau", 5, 4)
            .await
            .unwrap();
        create_question(&pool, "What is H2O?", "Water", 1, 1)
            .await
            .unwrap();

        for term in ["émile", "ÉMILE", "Émile"] {
            let found = search_questions(&pool, term).await.unwrap();
            assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), [id], "{term}");
        }
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let pool = pool().await;
        create_question(&pool, "What is 100% cotton?", "Fabric", 1, 1)
            .await
            .unwrap();
        create_question(&pool, "What is H2O?", "Water", 1, 1)
            .await
            .unwrap();

        assert_eq!(search_questions(&pool, "%").await.unwrap().len(), 1);
        assert!(search_questions(&pool, "_2O").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_question_is_not_found() {
        let pool = pool().await;
        let err = delete_question(&pool, 7).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_question() {
        let pool = pool().await;
        let id = create_question(&pool, "q", "a", 1, 1).await.unwrap();
        delete_question(&pool, id).await.unwrap();
        assert!(get_all_questions(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn import_keeps_ids() {
        let pool = pool().await;
        let questions = vec![
            Question {
                id: 10,
                question: "q10".into(),
                answer: "a10".into(),
                category: 1,
                difficulty: 2,
            },
            Question {
                id: 4,
                question: "q4".into(),
                answer: "a4".into(),
                category: 2,
                difficulty: 5,
            },
        ];
        import_questions(&pool, questions).await.unwrap();

        let ids: Vec<i64> = get_all_questions(&pool).await.unwrap().iter().map(|q| q.id).collect();
        assert_eq!(ids, [4, 10]);
    }
}
