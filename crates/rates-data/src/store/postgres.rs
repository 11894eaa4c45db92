//! PostgreSQL 저장소 구현.
//!
//! # 테이블
//!
//! - `currencies`: 추적 심볼 레지스트리 (`symbol` UNIQUE)
//! - `currency_rates_all`: FullLog
//! - `currency_rates`: TrackedLog
//!
//! 로그 테이블은 `currencies`를 참조하지 않으므로 심볼 삭제가 전파되지 않습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use sqlx::{Postgres, Transaction};
use tracing::{debug, info, instrument};

use crate::error::{RateError, Result};
use crate::model::{Quote, TimeWindow, TrackedSet, TrackedSymbol};
use crate::store::{check_page, QuoteLog, RateStore, SymbolRegistry};
use crate::writer::{CommitSummary, CycleBatch};

/// 한 INSERT 문에 담을 최대 행 수.
const INSERT_CHUNK_ROWS: usize = 500;

const FULL_LOG_TABLE: &str = "currency_rates_all";
const TRACKED_LOG_TABLE: &str = "currency_rates";

/// PostgreSQL 기반 시세 저장소.
#[derive(Clone)]
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 데이터베이스 마이그레이션을 실행합니다.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RateError::Query(format!("migration failed: {}", e)))?;

        info!("Migrations completed successfully");
        Ok(())
    }

    /// 트랜잭션 안에서 테이블에 행 삽입.
    ///
    /// UNNEST 패턴으로 청크당 INSERT 한 번만 실행합니다.
    async fn insert_rows(
        tx: &mut Transaction<'_, Postgres>,
        table: &str,
        rows: &[Quote],
    ) -> std::result::Result<u64, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO {} (symbol, price, timestamp)
            SELECT * FROM UNNEST($1::text[], $2::float8[], $3::timestamptz[])
            "#,
            table
        );

        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
            let symbols: Vec<&str> = chunk.iter().map(|q| q.symbol.as_str()).collect();
            let prices: Vec<f64> = chunk.iter().map(|q| q.price).collect();
            let timestamps: Vec<DateTime<Utc>> = chunk.iter().map(|q| q.timestamp).collect();

            let result = sqlx::query(&sql)
                .bind(&symbols)
                .bind(&prices)
                .bind(&timestamps)
                .execute(&mut **tx)
                .await?;

            inserted += result.rows_affected();
        }
        Ok(inserted)
    }
}

#[async_trait]
impl SymbolRegistry for PgRateStore {
    #[instrument(skip(self))]
    async fn register(&self, symbol: &str) -> Result<TrackedSymbol> {
        let record = sqlx::query_as::<_, TrackedSymbol>(
            "INSERT INTO currencies (symbol) VALUES ($1) RETURNING symbol",
        )
        .bind(symbol)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match RateError::from(e) {
            RateError::Conflict(_) => RateError::Conflict(symbol.to_string()),
            other => other,
        })?;

        debug!(symbol = %record.symbol, "심볼 등록");
        Ok(record)
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<TrackedSymbol>> {
        check_page(skip, limit)?;

        let records = sqlx::query_as::<_, TrackedSymbol>(
            r#"
            SELECT symbol FROM currencies
            ORDER BY id
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[instrument(skip(self))]
    async fn deregister(&self, symbol: &str) -> Result<TrackedSymbol> {
        let record = sqlx::query_as::<_, TrackedSymbol>(
            "DELETE FROM currencies WHERE symbol = $1 RETURNING symbol",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| RateError::NotFound(symbol.to_string()))?;

        debug!(symbol = %record.symbol, "심볼 삭제");
        Ok(record)
    }

    async fn snapshot(&self) -> Result<TrackedSet> {
        let symbols: Vec<(String,)> = sqlx::query_as("SELECT symbol FROM currencies")
            .fetch_all(&self.pool)
            .await?;

        Ok(symbols.into_iter().map(|(s,)| s).collect())
    }
}

#[async_trait]
impl QuoteLog for PgRateStore {
    #[instrument(skip(self, batch), fields(timestamp = %batch.timestamp()))]
    async fn commit(&self, batch: &CycleBatch) -> Result<CommitSummary> {
        let write_err = |e: sqlx::Error| RateError::Write(e.to_string());

        let mut tx = self.pool.begin().await.map_err(write_err)?;

        let full = Self::insert_rows(&mut tx, FULL_LOG_TABLE, batch.full_rows())
            .await
            .map_err(write_err)?;
        let tracked = Self::insert_rows(&mut tx, TRACKED_LOG_TABLE, batch.tracked_rows())
            .await
            .map_err(write_err)?;

        // 커밋 전 오류 시 tx drop으로 롤백
        tx.commit().await.map_err(write_err)?;

        debug!(full_rows = full, tracked_rows = tracked, "사이클 커밋");
        Ok(batch.summary())
    }

    async fn window(&self, window: TimeWindow) -> Result<Vec<Quote>> {
        let records = sqlx::query_as::<_, Quote>(
            r#"
            SELECT symbol, price, timestamp
            FROM currency_rates
            WHERE timestamp BETWEEN $1 AND $2
            ORDER BY id
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn latest(&self, symbol: &str, limit: i64) -> Result<Vec<Quote>> {
        let records = sqlx::query_as::<_, Quote>(
            r#"
            SELECT symbol, price, timestamp
            FROM currency_rates_all
            WHERE symbol = $1
            ORDER BY timestamp DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn full_log_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM currency_rates_all")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
