use std::collections::HashMap;

use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{OfficeId, TagId, UserId},
    image::Image,
    list::PaginatedList,
    office::{
        event::{CreateOffice, DeleteOffice, UpdateOffice},
        ApprovalStatus, Office, OfficeListOptions,
    },
    reservation::ReservationStatus,
    tag::Tag,
};
use kernel::repository::office::OfficeRepository;
use shared::error::{AppError, AppResult};
use sqlx::{PgConnection, QueryBuilder};

use crate::database::{
    model::{
        image::OfficeImageRow,
        office::{OfficeRow, OfficeUpdateRow, PaginatedOfficeRow},
        tag::OfficeTagRow,
    },
    ConnectionPool,
};

#[derive(new)]
pub struct OfficeRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl OfficeRepository for OfficeRepositoryImpl {
    async fn create(&self, event: CreateOffice, owned_by: UserId) -> AppResult<OfficeId> {
        let mut tx = self.db.begin().await?;

        ensure_tags_exist(&mut tx, &event.tags).await?;

        // A new listing always starts its life awaiting approval.
        let office_id = OfficeId::new();
        sqlx::query(
            r#"
                INSERT INTO offices
                (office_id, owned_by, title, description, lat, lng,
                 address_line1, address_line2, approval_status, hidden,
                 price_per_day, monthly_discount)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(office_id)
        .bind(owned_by)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.lat)
        .bind(event.lng)
        .bind(&event.address_line1)
        .bind(&event.address_line2)
        .bind(ApprovalStatus::Pending.as_ref())
        .bind(event.hidden)
        .bind(event.price_per_day)
        .bind(event.monthly_discount)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        attach_tags(&mut tx, office_id, &event.tags).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(office_id)
    }

    async fn find_all(&self, options: OfficeListOptions) -> AppResult<PaginatedList<Office>> {
        let OfficeListOptions {
            owner_id,
            visitor_id,
            tag_ids,
            point,
            include_unlisted,
            page,
            per_page,
        } = options;
        let offset = (page - 1) * per_page;

        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
                SELECT COUNT(*) OVER() AS total, o.office_id
                FROM offices AS o
                WHERE o.deleted_at IS NULL
            "#,
        );
        if !include_unlisted {
            qb.push(" AND o.approval_status = ")
                .push_bind(ApprovalStatus::Approved.as_ref())
                .push(" AND o.hidden = FALSE");
        }
        if let Some(owner_id) = owner_id {
            qb.push(" AND o.owned_by = ").push_bind(owner_id);
        }
        if let Some(visitor_id) = visitor_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM reservations AS r \
                 WHERE r.office_id = o.office_id AND r.user_id = ",
            )
            .push_bind(visitor_id)
            .push(")");
        }
        if !tag_ids.is_empty() {
            // Intersection: the office must carry every requested tag.
            let wanted = tag_ids.len() as i64;
            qb.push(
                " AND o.office_id IN (SELECT ot.office_id FROM office_tags AS ot \
                 WHERE ot.tag_id = ANY(",
            )
            .push_bind(tag_ids)
            .push(") GROUP BY ot.office_id HAVING COUNT(DISTINCT ot.tag_id) = ")
            .push_bind(wanted)
            .push(")");
        }
        match point {
            Some(p) => {
                qb.push(" ORDER BY POW(69.1 * (o.lat - ")
                    .push_bind(p.lat)
                    .push("), 2) + POW(69.1 * (")
                    .push_bind(p.lng)
                    .push(" - o.lng) * COS(o.lat / 57.3), 2) ASC");
            }
            None => {
                qb.push(" ORDER BY o.office_id ASC");
            }
        }
        qb.push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<PaginatedOfficeRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or(0);
        let office_ids: Vec<OfficeId> = rows.into_iter().map(|r| r.office_id).collect();
        let items = self.find_by_ids(&office_ids).await?;

        Ok(PaginatedList {
            total,
            page,
            per_page,
            items,
        })
    }

    async fn find_by_id(&self, office_id: OfficeId) -> AppResult<Option<Office>> {
        Ok(self.find_by_ids(&[office_id]).await?.into_iter().next())
    }

    async fn update(&self, event: UpdateOffice) -> AppResult<bool> {
        let mut tx = self.db.begin().await?;

        let current: Option<OfficeUpdateRow> = sqlx::query_as(
            r#"
                SELECT owned_by, title, description, lat, lng,
                       address_line1, address_line2, approval_status, hidden,
                       price_per_day, monthly_discount, featured_image_id
                FROM offices
                WHERE office_id = $1 AND deleted_at IS NULL
                FOR UPDATE
            "#,
        )
        .bind(event.office_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(current) = current else {
            return Err(AppError::EntityNotFound(format!(
                "office {} was not found",
                event.office_id
            )));
        };
        if current.owned_by != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        if let Some(image_id) = event.featured_image_id {
            let owned: Option<i32> = sqlx::query_scalar(
                "SELECT 1 FROM images WHERE image_id = $1 AND office_id = $2",
            )
            .bind(image_id)
            .bind(event.office_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            if owned.is_none() {
                return Err(AppError::FieldValidationError {
                    field: "featured_image_id",
                    message: "The selected featured image is invalid.".into(),
                });
            }
        }

        // Touching location or price sends an already-reviewed listing back
        // through approval.
        let requires_review = event.lat.is_some_and(|v| v != current.lat)
            || event.lng.is_some_and(|v| v != current.lng)
            || event
                .address_line1
                .as_deref()
                .is_some_and(|v| v != current.address_line1)
            || event
                .price_per_day
                .is_some_and(|v| v != current.price_per_day);
        let approval_status = if requires_review {
            ApprovalStatus::Pending.as_ref().to_string()
        } else {
            current.approval_status
        };

        sqlx::query(
            r#"
                UPDATE offices
                SET title = $2,
                    description = $3,
                    lat = $4,
                    lng = $5,
                    address_line1 = $6,
                    address_line2 = $7,
                    hidden = $8,
                    price_per_day = $9,
                    monthly_discount = $10,
                    approval_status = $11,
                    featured_image_id = $12
                WHERE office_id = $1
            "#,
        )
        .bind(event.office_id)
        .bind(event.title.unwrap_or(current.title))
        .bind(event.description.unwrap_or(current.description))
        .bind(event.lat.unwrap_or(current.lat))
        .bind(event.lng.unwrap_or(current.lng))
        .bind(event.address_line1.unwrap_or(current.address_line1))
        .bind(event.address_line2.or(current.address_line2))
        .bind(event.hidden.unwrap_or(current.hidden))
        .bind(event.price_per_day.unwrap_or(current.price_per_day))
        .bind(event.monthly_discount.unwrap_or(current.monthly_discount))
        .bind(approval_status)
        .bind(event.featured_image_id.or(current.featured_image_id))
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if let Some(tags) = &event.tags {
            ensure_tags_exist(&mut tx, tags).await?;
            sqlx::query("DELETE FROM office_tags WHERE office_id = $1")
                .bind(event.office_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
            attach_tags(&mut tx, event.office_id, tags).await?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(requires_review)
    }

    async fn delete(&self, event: DeleteOffice) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let owned_by: Option<UserId> = sqlx::query_scalar(
            r#"
                SELECT owned_by
                FROM offices
                WHERE office_id = $1 AND deleted_at IS NULL
                FOR UPDATE
            "#,
        )
        .bind(event.office_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let Some(owned_by) = owned_by else {
            return Err(AppError::EntityNotFound(format!(
                "office {} was not found",
                event.office_id
            )));
        };
        if owned_by != event.requested_user {
            return Err(AppError::ForbiddenOperation);
        }

        let has_active: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM reservations WHERE office_id = $1 AND status = $2 LIMIT 1",
        )
        .bind(event.office_id)
        .bind(ReservationStatus::Active.as_ref())
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if has_active.is_some() {
            return Err(AppError::FieldValidationError {
                field: "office",
                message: "Cannot delete this office!".into(),
            });
        }

        sqlx::query("DELETE FROM images WHERE office_id = $1")
            .bind(event.office_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        let res = sqlx::query(
            "UPDATE offices SET deleted_at = CURRENT_TIMESTAMP WHERE office_id = $1",
        )
        .bind(event.office_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no office record has been deleted".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }
}

impl OfficeRepositoryImpl {
    /// Loads full offices for the given ids, preserving the id order the
    /// caller established (the listing sorts by distance or id upstream).
    async fn find_by_ids(&self, office_ids: &[OfficeId]) -> AppResult<Vec<Office>> {
        if office_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows: Vec<OfficeRow> = sqlx::query_as(
            r#"
                SELECT o.office_id, o.title, o.description, o.lat, o.lng,
                       o.address_line1, o.address_line2, o.approval_status,
                       o.hidden, o.price_per_day, o.monthly_discount,
                       o.featured_image_id, o.owned_by, u.name AS owner_name,
                       (SELECT COUNT(*) FROM reservations AS r
                        WHERE r.office_id = o.office_id AND r.status = 'active')
                           AS reservations_count
                FROM offices AS o
                INNER JOIN users AS u ON u.user_id = o.owned_by
                WHERE o.office_id = ANY($1) AND o.deleted_at IS NULL
            "#,
        )
        .bind(office_ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut tags = self.tags_for(office_ids).await?;
        let mut images = self.images_for(office_ids).await?;

        let position: HashMap<OfficeId, usize> = office_ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut offices = rows
            .into_iter()
            .map(|row| {
                let id = row.office_id;
                row.into_office(
                    tags.remove(&id).unwrap_or_default(),
                    images.remove(&id).unwrap_or_default(),
                )
            })
            .collect::<AppResult<Vec<Office>>>()?;
        offices.sort_by_key(|o| position.get(&o.id).copied().unwrap_or(usize::MAX));

        Ok(offices)
    }

    async fn tags_for(&self, office_ids: &[OfficeId]) -> AppResult<HashMap<OfficeId, Vec<Tag>>> {
        let rows: Vec<OfficeTagRow> = sqlx::query_as(
            r#"
                SELECT ot.office_id, t.tag_id, t.name
                FROM office_tags AS ot
                INNER JOIN tags AS t ON t.tag_id = ot.tag_id
                WHERE ot.office_id = ANY($1)
                ORDER BY t.name ASC
            "#,
        )
        .bind(office_ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut grouped: HashMap<OfficeId, Vec<Tag>> = HashMap::new();
        for row in rows {
            grouped.entry(row.office_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn images_for(&self, office_ids: &[OfficeId]) -> AppResult<HashMap<OfficeId, Vec<Image>>> {
        let rows: Vec<OfficeImageRow> = sqlx::query_as(
            r#"
                SELECT image_id, office_id, path
                FROM images
                WHERE office_id = ANY($1)
                ORDER BY created_at ASC
            "#,
        )
        .bind(office_ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let mut grouped: HashMap<OfficeId, Vec<Image>> = HashMap::new();
        for row in rows {
            grouped.entry(row.office_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

async fn ensure_tags_exist(tx: &mut PgConnection, tags: &[TagId]) -> AppResult<()> {
    if tags.is_empty() {
        return Ok(());
    }
    let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tags WHERE tag_id = ANY($1)")
        .bind(tags)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
    if known != tags.len() as i64 {
        return Err(AppError::FieldValidationError {
            field: "tags",
            message: "The selected tags are invalid.".into(),
        });
    }
    Ok(())
}

async fn attach_tags(tx: &mut PgConnection, office_id: OfficeId, tags: &[TagId]) -> AppResult<()> {
    if tags.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
            INSERT INTO office_tags (office_id, tag_id)
            SELECT $1, t FROM UNNEST($2::uuid[]) AS t
        "#,
    )
    .bind(office_id)
    .bind(tags)
    .execute(&mut *tx)
    .await
    .map_err(AppError::SpecificOperationError)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use kernel::model::office::GeoPoint;
    use kernel::model::role::Role;

    use super::*;

    async fn seed_user(pool: &sqlx::PgPool, name: &str, role: Role) -> UserId {
        let user_id = UserId::new();
        sqlx::query("INSERT INTO users (user_id, name, email, role) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(name)
            .bind(format!("{name}@example.com"))
            .bind(role.as_ref())
            .execute(pool)
            .await
            .unwrap();
        user_id
    }

    async fn approve_all(pool: &sqlx::PgPool) {
        sqlx::query("UPDATE offices SET approval_status = 'approved'")
            .execute(pool)
            .await
            .unwrap();
    }

    fn sample_office(title: &str) -> CreateOffice {
        CreateOffice {
            title: title.into(),
            description: "A desk with a view".into(),
            lat: 52.520008,
            lng: 13.404954,
            address_line1: "1 Main Street".into(),
            address_line2: None,
            hidden: false,
            price_per_day: 10_000,
            monthly_discount: 0,
            tags: vec![],
        }
    }

    fn first_page() -> OfficeListOptions {
        OfficeListOptions {
            page: 1,
            per_page: 10,
            ..Default::default()
        }
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn a_new_office_starts_pending_with_its_tags_attached(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;

        let seeded_tags: Vec<TagId> =
            sqlx::query_scalar("SELECT tag_id FROM tags ORDER BY name LIMIT 2")
                .fetch_all(&pool)
                .await?;
        let mut event = sample_office("Mitte Loft");
        event.tags = seeded_tags.clone();

        let office_id = repo.create(event, owner).await?;
        let office = repo.find_by_id(office_id).await?.unwrap();

        assert_eq!(office.approval_status, ApprovalStatus::Pending);
        assert_eq!(office.owner.owner_name, "host");
        assert_eq!(office.tags.len(), 2);
        assert_eq!(office.reservations_count, 0);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn the_listing_hides_pending_and_hidden_offices(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;

        repo.create(sample_office("Listed"), owner).await?;
        approve_all(&pool).await;
        repo.create(sample_office("Pending"), owner).await?;
        let mut hidden = sample_office("Hidden");
        hidden.hidden = true;
        repo.create(hidden, owner).await?;
        sqlx::query("UPDATE offices SET approval_status = 'approved' WHERE title = 'Hidden'")
            .execute(&pool)
            .await?;

        let listed = repo.find_all(first_page()).await?;
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].title, "Listed");

        // The owner querying their own offices sees everything.
        let own = repo
            .find_all(OfficeListOptions {
                owner_id: Some(owner),
                include_unlisted: true,
                ..first_page()
            })
            .await?;
        assert_eq!(own.total, 3);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn the_tag_filter_requires_every_requested_tag(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;
        let seeded_tags: Vec<TagId> =
            sqlx::query_scalar("SELECT tag_id FROM tags ORDER BY name LIMIT 2")
                .fetch_all(&pool)
                .await?;

        let mut both = sample_office("Both tags");
        both.tags = seeded_tags.clone();
        let both_id = repo.create(both, owner).await?;
        let mut one = sample_office("One tag");
        one.tags = vec![seeded_tags[0]];
        repo.create(one, owner).await?;
        approve_all(&pool).await;

        let filtered = repo
            .find_all(OfficeListOptions {
                tag_ids: seeded_tags,
                ..first_page()
            })
            .await?;

        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.items[0].id, both_id);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn coordinates_order_the_listing_by_distance(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;

        for (title, lat, lng) in [
            ("Balikpapan", -1.246683793171039, 116.85410448618018),
            ("Banjarmasin", -3.3167067084798783, 114.58837533512606),
            ("Tenggarong", -0.43251811182673117, 116.98703320222951),
        ] {
            let mut event = sample_office(title);
            event.lat = lat;
            event.lng = lng;
            repo.create(event, owner).await?;
        }
        approve_all(&pool).await;

        let nearest = repo
            .find_all(OfficeListOptions {
                point: Some(GeoPoint {
                    lat: -0.4917968112716624,
                    lng: 117.14377147229592,
                }),
                ..first_page()
            })
            .await?;

        let titles: Vec<&str> = nearest.items.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, ["Tenggarong", "Balikpapan", "Banjarmasin"]);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn editing_the_location_sends_an_approved_office_back_to_review(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;
        let office_id = repo.create(sample_office("Reviewed"), owner).await?;
        approve_all(&pool).await;

        let requires_review = repo
            .update(UpdateOffice {
                office_id,
                requested_user: owner,
                title: None,
                description: None,
                lat: Some(-0.43251811182673117),
                lng: Some(116.98703320222951),
                address_line1: None,
                address_line2: None,
                hidden: None,
                price_per_day: None,
                monthly_discount: None,
                featured_image_id: None,
                tags: None,
            })
            .await?;

        assert!(requires_review);
        let office = repo.find_by_id(office_id).await?.unwrap();
        assert_eq!(office.approval_status, ApprovalStatus::Pending);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn only_the_owner_may_update_or_delete(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = OfficeRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = seed_user(&pool, "host", Role::User).await;
        let stranger = seed_user(&pool, "stranger", Role::User).await;
        let office_id = repo.create(sample_office("Guarded"), owner).await?;

        let err = repo
            .delete(DeleteOffice {
                office_id,
                requested_user: stranger,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ForbiddenOperation));

        repo.delete(DeleteOffice {
            office_id,
            requested_user: owner,
        })
        .await?;
        assert!(repo.find_by_id(office_id).await?.is_none());
        Ok(())
    }
}
