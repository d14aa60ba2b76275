use async_trait::async_trait;
use common::{Money, ProviderId, ServiceTypeId, UserId};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::store::OrderStore;
use crate::{
    INITIAL_STATUS_NOTE, NewOrder, Order, OrderId, OrderQuery, Result, Revision,
    StatusTransition, StatusUpdate, StatusUpdateId, StoreError,
};

const ORDER_COLUMNS: &str = "id, client_id, provider_id, service_type_id, status, quantity, \
     total_cents, tax_cents, delivery_fee_cents, scheduled_pickup_time, scheduled_delivery_time, \
     actual_pickup_time, actual_delivery_time, notes, order_number, created_at, updated_at, revision";

const UNIQUE_ORDER_NUMBER: &str = "unique_order_number";

/// Paging values beyond BIGINT range mean "no bound" and saturate.
fn clamp_to_bigint(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// PostgreSQL-backed order store implementation.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("running order store migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let money = |column: &str| -> Result<Option<Money>> {
            Ok(row
                .try_get::<Option<i64>, _>(column)?
                .map(Money::from_cents))
        };

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            client_id: UserId::new(row.try_get("client_id")?),
            provider_id: row
                .try_get::<Option<i64>, _>("provider_id")?
                .map(ProviderId::new),
            service_type_id: row
                .try_get::<Option<i64>, _>("service_type_id")?
                .map(ServiceTypeId::new),
            status: status.parse()?,
            quantity: row.try_get("quantity")?,
            total: money("total_cents")?,
            tax: money("tax_cents")?,
            delivery_fee: money("delivery_fee_cents")?,
            scheduled_pickup_time: row.try_get("scheduled_pickup_time")?,
            scheduled_delivery_time: row.try_get("scheduled_delivery_time")?,
            actual_pickup_time: row.try_get("actual_pickup_time")?,
            actual_delivery_time: row.try_get("actual_delivery_time")?,
            notes: row.try_get("notes")?,
            order_number: row.try_get("order_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            revision: Revision::new(row.try_get("revision")?),
        })
    }

    fn row_to_status_update(row: PgRow) -> Result<StatusUpdate> {
        let status: String = row.try_get("status")?;

        Ok(StatusUpdate {
            id: StatusUpdateId::new(row.try_get("id")?),
            order_id: OrderId::new(row.try_get("order_id")?),
            status: status.parse()?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn append_status_update(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
        notes: Option<&str>,
    ) -> Result<StatusUpdate> {
        let row = sqlx::query(
            r#"
            INSERT INTO order_status_updates (order_id, status, notes, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_id, status, notes, created_at
            "#,
        )
        .bind(order.id.as_i64())
        .bind(order.status.as_str())
        .bind(notes)
        .bind(order.updated_at)
        .fetch_one(&mut **tx)
        .await?;

        Self::row_to_status_update(row)
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, StatusUpdate)> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            INSERT INTO orders (
                client_id, provider_id, service_type_id, status, quantity,
                total_cents, tax_cents, delivery_fee_cents,
                scheduled_pickup_time, scheduled_delivery_time,
                notes, order_number, created_at, updated_at, revision
            )
            VALUES ($1, $2, $3, 'pending', $4, $5, $6, $7, $8, $9, $10, $11, $12, $12, 1)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(order.client_id.as_i64())
            .bind(order.provider_id.map(|id| id.as_i64()))
            .bind(order.service_type_id.map(|id| id.as_i64()))
            .bind(order.quantity)
            .bind(order.total.map(|m| m.cents()))
            .bind(order.tax.map(|m| m.cents()))
            .bind(order.delivery_fee.map(|m| m.cents()))
            .bind(order.scheduled_pickup_time)
            .bind(order.scheduled_delivery_time)
            .bind(&order.notes)
            .bind(&order.order_number)
            .bind(order.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.constraint() == Some(UNIQUE_ORDER_NUMBER)
                {
                    return StoreError::DuplicateOrderNumber(order.order_number.clone());
                }
                StoreError::Database(e)
            })?;

        let inserted = Self::row_to_order(row)?;
        let update =
            Self::append_status_update(&mut tx, &inserted, Some(INITIAL_STATUS_NOTE)).await?;

        tx.commit().await?;
        Ok((inserted, update))
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>> {
        // LIMIT NULL means no limit in PostgreSQL.
        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE ($1::BIGINT IS NULL OR client_id = $1)
              AND ($2::BIGINT IS NULL OR provider_id = $2)
              AND ($3::TEXT IS NULL OR status = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(query.client_id.map(|id| id.as_i64()))
            .bind(query.provider_id.map(|id| id.as_i64()))
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.limit.map(clamp_to_bigint))
            .bind(clamp_to_bigint(query.offset.unwrap_or(0)))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn commit_transition(
        &self,
        transition: StatusTransition,
    ) -> Result<(StatusUpdate, Order)> {
        let expected = transition.expected_revision();
        let next = &transition.order;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            r#"
            UPDATE orders
            SET status = $3,
                updated_at = $4,
                actual_pickup_time = $5,
                actual_delivery_time = $6,
                revision = revision + 1
            WHERE id = $1 AND revision = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(next.id.as_i64())
            .bind(expected.as_i64())
            .bind(next.status.as_str())
            .bind(next.updated_at)
            .bind(next.actual_pickup_time)
            .bind(next.actual_delivery_time)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT revision FROM orders WHERE id = $1")
                    .bind(next.id.as_i64())
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match actual {
                None => StoreError::OrderNotFound(next.id),
                Some(actual) => {
                    tracing::debug!(order_id = %next.id, %expected, actual, "stale order revision");
                    StoreError::ConcurrencyConflict {
                        order_id: next.id,
                        expected,
                        actual: Revision::new(actual),
                    }
                }
            });
        };

        let order = Self::row_to_order(row)?;
        let update =
            Self::append_status_update(&mut tx, &order, transition.notes.as_deref()).await?;

        tx.commit().await?;
        Ok((update, order))
    }

    async fn status_updates(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, status, notes, created_at
            FROM order_status_updates
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_status_update).collect()
    }

    async fn status_history(&self, order_id: OrderId) -> Result<Vec<StatusUpdate>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, status, notes, created_at
            FROM order_status_updates
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_status_update).collect()
    }
}
