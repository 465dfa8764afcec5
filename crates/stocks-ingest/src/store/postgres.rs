//! PostgreSQL record store
//!
//! Expects the `stock_records` table from `migrations/0001_stock_records.sql`.

use super::{RecordStore, StoreError};
use crate::model::StockRecord;
use crate::schema::{check_record, insert_columns, select_list, TABLE_NAME};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;

/// Rows per `INSERT` statement. Sixteen binds per row keeps this well under
/// the protocol limit of 65535 parameters.
const MAX_ROWS_PER_STATEMENT: usize = 1000;

/// [`RecordStore`] backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn save_all(&self, records: Vec<StockRecord>) -> Result<Vec<StockRecord>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in &records {
            check_record(record)?;
        }

        let columns = insert_columns().map(|c| c.name).collect::<Vec<_>>().join(", ");
        let returning = select_list();
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(records.len());

        for chunk in records.chunks(MAX_ROWS_PER_STATEMENT) {
            let mut query_builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO {TABLE_NAME} ({columns}) "));

            query_builder.push_values(chunk, |mut b, record| {
                b.push_bind(record.quarter)
                    .push_bind(&record.ticker)
                    .push_bind(record.date)
                    .push_bind(&record.open)
                    .push_bind(&record.high)
                    .push_bind(&record.low)
                    .push_bind(&record.close)
                    .push_bind(record.volume)
                    .push_bind(&record.percent_change_price)
                    .push_bind(&record.percent_change_volume_over_last_wk)
                    .push_bind(record.previous_weeks_volume)
                    .push_bind(&record.next_weeks_open)
                    .push_bind(&record.next_weeks_close)
                    .push_bind(&record.percent_change_next_weeks_price)
                    .push_bind(record.days_to_next_dividend)
                    .push_bind(&record.percent_return_next_dividend);
            });
            query_builder.push(format!(" RETURNING {returning}"));

            let mut rows = query_builder
                .build_query_as::<StockRecord>()
                .fetch_all(&mut *tx)
                .await?;
            rows.sort_by_key(|r| r.id);
            saved.append(&mut rows);
        }

        tx.commit().await?;
        debug!(count = saved.len(), "Inserted stock records");
        Ok(saved)
    }

    async fn find_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        let sql = format!("SELECT {} FROM {TABLE_NAME} WHERE stock = $1 ORDER BY id", select_list());
        let records = sqlx::query_as::<_, StockRecord>(&sql)
            .bind(ticker)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn find_by_ticker_and_quarter(
        &self,
        ticker: &str,
        quarter: i32,
    ) -> Result<Vec<StockRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {TABLE_NAME} WHERE stock = $1 AND quarter = $2 \
             ORDER BY date DESC NULLS LAST, id",
            select_list()
        );
        let records = sqlx::query_as::<_, StockRecord>(&sql)
            .bind(ticker)
            .bind(quarter)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {TABLE_NAME}");
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let sql = format!("DELETE FROM {TABLE_NAME}");
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_ticker(&self, ticker: &str) -> Result<Vec<StockRecord>, StoreError> {
        let sql = format!("DELETE FROM {TABLE_NAME} WHERE stock = $1 RETURNING {}", select_list());
        let mut records = sqlx::query_as::<_, StockRecord>(&sql)
            .bind(ticker)
            .fetch_all(&self.pool)
            .await?;
        records.sort_by_key(|r| r.id);
        Ok(records)
    }
}
