use async_trait::async_trait;
use derive_new::new;
use kernel::model::tag::Tag;
use kernel::repository::tag::TagRepository;
use shared::error::{AppError, AppResult};

use crate::database::{model::tag::TagRow, ConnectionPool};

#[derive(new)]
pub struct TagRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl TagRepository for TagRepositoryImpl {
    async fn find_all(&self) -> AppResult<Vec<Tag>> {
        let rows: Vec<TagRow> = sqlx::query_as(
            r#"
                SELECT tag_id, name
                FROM tags
                ORDER BY name ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Tag::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "../migrations")]
    async fn seeded_tags_come_back_sorted(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = TagRepositoryImpl::new(ConnectionPool::new(pool));

        let tags = repo.find_all().await?;

        assert!(!tags.is_empty());
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        Ok(())
    }
}
