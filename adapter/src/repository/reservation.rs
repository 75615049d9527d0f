use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    id::{ReservationId, UserId},
    list::PaginatedList,
    reservation::{
        event::CreateReservation, reservation_days, reservation_price, Reservation,
        ReservationListOptions, ReservationStatus,
    },
};
use kernel::repository::reservation::ReservationRepository;
use shared::error::{AppError, AppResult};
use sqlx::QueryBuilder;

use crate::database::{
    model::reservation::{BookingOfficeRow, PaginatedReservationRow, ReservationRow},
    ConnectionPool,
};
use crate::redis::RedisClient;

#[derive(new)]
pub struct ReservationRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
}

#[async_trait]
impl ReservationRepository for ReservationRepositoryImpl {
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        // Serialize the overlap check and the insert per office. Without
        // the lock, two concurrent requests could both pass the check and
        // double-book the office.
        let lock = self
            .kv
            .lock_office(format!("reservations_office_{}", event.office_id))
            .await?;

        let result = self.create_in_lock(&event).await;

        if let Err(e) = self.kv.unlock_office(&lock).await {
            tracing::warn!(
                error = %e,
                office_id = %event.office_id,
                "failed to release the booking lock, waiting for its TTL"
            );
        }

        result
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>> {
        let row: Option<ReservationRow> = sqlx::query_as(
            r#"
                SELECT r.reservation_id, r.user_id, r.status, r.price,
                       r.start_date, r.end_date, r.created_at,
                       o.office_id, o.title AS office_title,
                       o.lat AS office_lat, o.lng AS office_lng,
                       o.address_line1 AS office_address_line1,
                       o.owned_by AS office_owned_by,
                       i.image_id AS featured_image_id,
                       i.path AS featured_image_path
                FROM reservations AS r
                INNER JOIN offices AS o ON o.office_id = r.office_id
                LEFT JOIN images AS i ON i.image_id = o.featured_image_id
                WHERE r.reservation_id = $1
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        row.map(Reservation::try_from).transpose()
    }

    async fn find_for_user(
        &self,
        user_id: UserId,
        options: ReservationListOptions,
    ) -> AppResult<PaginatedList<Reservation>> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
                SELECT COUNT(*) OVER() AS total, r.reservation_id
                FROM reservations AS r
                INNER JOIN offices AS o ON o.office_id = r.office_id
                WHERE r.user_id =
            "#,
        );
        qb.push_bind(user_id);
        self.load_page(qb, options).await
    }

    async fn find_for_host(
        &self,
        host_id: UserId,
        options: ReservationListOptions,
    ) -> AppResult<PaginatedList<Reservation>> {
        let mut qb: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
                SELECT COUNT(*) OVER() AS total, r.reservation_id
                FROM reservations AS r
                INNER JOIN offices AS o ON o.office_id = r.office_id
                WHERE o.owned_by =
            "#,
        );
        qb.push_bind(host_id);
        self.load_page(qb, options).await
    }

    async fn find_starting_on(&self, date: NaiveDate) -> AppResult<Vec<Reservation>> {
        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
                SELECT r.reservation_id, r.user_id, r.status, r.price,
                       r.start_date, r.end_date, r.created_at,
                       o.office_id, o.title AS office_title,
                       o.lat AS office_lat, o.lng AS office_lng,
                       o.address_line1 AS office_address_line1,
                       o.owned_by AS office_owned_by,
                       i.image_id AS featured_image_id,
                       i.path AS featured_image_path
                FROM reservations AS r
                INNER JOIN offices AS o ON o.office_id = r.office_id
                LEFT JOIN images AS i ON i.image_id = o.featured_image_id
                WHERE r.status = $1 AND r.start_date = $2
                ORDER BY r.created_at ASC
            "#,
        )
        .bind(ReservationStatus::Active.as_ref())
        .bind(date)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        rows.into_iter().map(Reservation::try_from).collect()
    }
}

impl ReservationRepositoryImpl {
    /// The booking critical section. Callers must hold the office lock.
    async fn create_in_lock(&self, event: &CreateReservation) -> AppResult<Reservation> {
        let mut tx = self.db.begin().await?;

        let office: Option<BookingOfficeRow> = sqlx::query_as(
            r#"
                SELECT price_per_day, monthly_discount
                FROM offices
                WHERE office_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(event.office_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(office) = office else {
            return Err(AppError::FieldValidationError {
                field: "office_id",
                message: "Invalid office ID".into(),
            });
        };

        // Inclusive ranges overlap when neither lies fully before the other.
        let overlap: Option<ReservationId> = sqlx::query_scalar(
            r#"
                SELECT reservation_id
                FROM reservations
                WHERE office_id = $1 AND status = $2
                  AND start_date <= $3 AND end_date >= $4
                LIMIT 1
            "#,
        )
        .bind(event.office_id)
        .bind(ReservationStatus::Active.as_ref())
        .bind(event.end_date)
        .bind(event.start_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if overlap.is_some() {
            return Err(AppError::FieldValidationError {
                field: "office_id",
                message: "You cannot make a reservation during this time!".into(),
            });
        }

        let days = reservation_days(event.start_date, event.end_date);
        let price = reservation_price(days, office.price_per_day, office.monthly_discount);

        let reservation_id = ReservationId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO reservations
                (reservation_id, office_id, user_id, status, price,
                 start_date, end_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(reservation_id)
        .bind(event.office_id)
        .bind(event.reserved_by)
        .bind(ReservationStatus::Active.as_ref())
        .bind(price)
        .bind(event.start_date)
        .bind(event.end_date)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "no reservation record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(reservation_id).await?.ok_or_else(|| {
            AppError::EntityNotFound("the created reservation could not be reloaded".into())
        })
    }

    async fn load_page(
        &self,
        mut qb: QueryBuilder<'_, sqlx::Postgres>,
        options: ReservationListOptions,
    ) -> AppResult<PaginatedList<Reservation>> {
        let ReservationListOptions {
            office_id,
            user_id,
            status,
            from_date,
            to_date,
            page,
            per_page,
        } = options;

        if let Some(office_id) = office_id {
            qb.push(" AND r.office_id = ").push_bind(office_id);
        }
        if let Some(user_id) = user_id {
            qb.push(" AND r.user_id = ").push_bind(user_id);
        }
        if let Some(status) = status {
            qb.push(" AND r.status = ").push_bind(status.as_ref());
        }
        if let (Some(from), Some(to)) = (from_date, to_date) {
            // Any reservation whose range overlaps [from, to].
            qb.push(" AND r.start_date <= ")
                .push_bind(to)
                .push(" AND r.end_date >= ")
                .push_bind(from);
        }
        qb.push(" ORDER BY r.created_at ASC");
        qb.push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind((page - 1) * per_page);

        let rows: Vec<PaginatedReservationRow> = qb
            .build_query_as()
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        let total = rows.first().map(|r| r.total).unwrap_or(0);
        let ids: Vec<ReservationId> = rows.into_iter().map(|r| r.reservation_id).collect();
        let items = self.find_by_ids(&ids).await?;

        Ok(PaginatedList {
            total,
            page,
            per_page,
            items,
        })
    }

    async fn find_by_ids(&self, ids: &[ReservationId]) -> AppResult<Vec<Reservation>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows: Vec<ReservationRow> = sqlx::query_as(
            r#"
                SELECT r.reservation_id, r.user_id, r.status, r.price,
                       r.start_date, r.end_date, r.created_at,
                       o.office_id, o.title AS office_title,
                       o.lat AS office_lat, o.lng AS office_lng,
                       o.address_line1 AS office_address_line1,
                       o.owned_by AS office_owned_by,
                       i.image_id AS featured_image_id,
                       i.path AS featured_image_path
                FROM reservations AS r
                INNER JOIN offices AS o ON o.office_id = r.office_id
                LEFT JOIN images AS i ON i.image_id = o.featured_image_id
                WHERE r.reservation_id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let position: HashMap<ReservationId, usize> = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (*id, idx))
            .collect();

        let mut reservations = rows
            .into_iter()
            .map(Reservation::try_from)
            .collect::<Result<Vec<Reservation>, _>>()?;
        reservations.sort_by_key(|r| position.get(&r.id).copied().unwrap_or(usize::MAX));

        Ok(reservations)
    }
}

#[cfg(test)]
mod tests {
    use kernel::model::id::OfficeId;
    use kernel::model::role::Role;
    use shared::config::RedisConfig;

    use super::*;

    fn repo_for(pool: sqlx::PgPool) -> ReservationRepositoryImpl {
        // The client is lazy; tests exercising the critical section
        // directly never touch redis.
        let kv = Arc::new(
            RedisClient::new(&RedisConfig {
                host: "localhost".into(),
                port: 6379,
            })
            .unwrap(),
        );
        ReservationRepositoryImpl::new(ConnectionPool::new(pool), kv)
    }

    async fn seed_user(pool: &sqlx::PgPool, name: &str) -> UserId {
        let user_id = UserId::new();
        sqlx::query("INSERT INTO users (user_id, name, email, role) VALUES ($1, $2, $3, $4)")
            .bind(user_id)
            .bind(name)
            .bind(format!("{name}@example.com"))
            .bind(Role::User.as_ref())
            .execute(pool)
            .await
            .unwrap();
        user_id
    }

    async fn seed_office(
        pool: &sqlx::PgPool,
        owned_by: UserId,
        price_per_day: i64,
        monthly_discount: i64,
    ) -> OfficeId {
        let office_id = OfficeId::new();
        sqlx::query(
            r#"
                INSERT INTO offices
                (office_id, owned_by, title, description, lat, lng,
                 address_line1, approval_status, hidden, price_per_day,
                 monthly_discount)
                VALUES ($1, $2, 'Office', 'desc', 0, 0, 'addr', 'approved',
                        FALSE, $3, $4)
            "#,
        )
        .bind(office_id)
        .bind(owned_by)
        .bind(price_per_day)
        .bind(monthly_discount)
        .execute(pool)
        .await
        .unwrap();
        office_id
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn a_long_stay_is_priced_with_the_monthly_discount(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = repo_for(pool.clone());
        let host = seed_user(&pool, "host").await;
        let visitor = seed_user(&pool, "visitor").await;
        let office = seed_office(&pool, host, 1_000, 10).await;

        let reservation = repo
            .create_in_lock(&CreateReservation::new(
                office,
                visitor,
                date("2030-01-01"),
                date("2030-02-09"),
            ))
            .await?;

        assert_eq!(reservation.price, 36_000);
        assert_eq!(reservation.status, ReservationStatus::Active);
        assert_eq!(reservation.office.office_id, office);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn overlapping_bookings_are_rejected(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = repo_for(pool.clone());
        let host = seed_user(&pool, "host").await;
        let visitor = seed_user(&pool, "visitor").await;
        let other = seed_user(&pool, "other").await;
        let office = seed_office(&pool, host, 1_000, 0).await;

        repo.create_in_lock(&CreateReservation::new(
            office,
            visitor,
            date("2030-01-10"),
            date("2030-01-20"),
        ))
        .await?;

        // Sharing the end date alone is a conflict, bounds are inclusive.
        let err = repo
            .create_in_lock(&CreateReservation::new(
                office,
                other,
                date("2030-01-20"),
                date("2030-01-25"),
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::FieldValidationError {
                field: "office_id",
                ..
            }
        ));

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE office_id = $1 AND status = 'active'",
        )
        .bind(office)
        .fetch_one(&pool)
        .await?;
        assert_eq!(active, 1);

        // The day right after the existing stay is free.
        repo.create_in_lock(&CreateReservation::new(
            office,
            other,
            date("2030-01-21"),
            date("2030-01-25"),
        ))
        .await?;
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn the_date_range_filter_selects_overlapping_reservations(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = repo_for(pool.clone());
        let host = seed_user(&pool, "host").await;
        let visitor = seed_user(&pool, "visitor").await;

        for (start, end) in [
            ("2030-03-01", "2030-03-15"),
            ("2030-03-25", "2030-04-15"),
            ("2030-02-20", "2030-02-25"),
        ] {
            let office = seed_office(&pool, host, 1_000, 0).await;
            repo.create_in_lock(&CreateReservation::new(
                office,
                visitor,
                date(start),
                date(end),
            ))
            .await?;
        }

        let page = repo
            .find_for_user(
                visitor,
                ReservationListOptions {
                    from_date: Some(date("2030-03-03")),
                    to_date: Some(date("2030-04-04")),
                    page: 1,
                    per_page: 15,
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(page.total, 2);
        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn hosts_see_reservations_on_their_offices_only(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = repo_for(pool.clone());
        let host = seed_user(&pool, "host").await;
        let other_host = seed_user(&pool, "other_host").await;
        let visitor = seed_user(&pool, "visitor").await;

        let office = seed_office(&pool, host, 1_000, 0).await;
        let other_office = seed_office(&pool, other_host, 1_000, 0).await;
        repo.create_in_lock(&CreateReservation::new(
            office,
            visitor,
            date("2030-05-01"),
            date("2030-05-05"),
        ))
        .await?;
        repo.create_in_lock(&CreateReservation::new(
            other_office,
            visitor,
            date("2030-05-01"),
            date("2030-05-05"),
        ))
        .await?;

        let page = repo
            .find_for_host(
                host,
                ReservationListOptions {
                    page: 1,
                    per_page: 15,
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].office.office_id, office);
        Ok(())
    }
}
