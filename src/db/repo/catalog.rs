//! Reference catalog operations: users, instruments, market data.

use super::Repository;
use crate::domain::{Decimal, Instrument, InstrumentId, Quote, User, UserId};
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::warn;

impl Repository {
    // =========================================================================
    // Users
    // =========================================================================

    pub async fn insert_user(
        &self,
        email: &str,
        account_number: &str,
    ) -> Result<User, sqlx::Error> {
        let result = sqlx::query("INSERT INTO users (email, account_number) VALUES (?, ?)")
            .bind(email)
            .bind(account_number)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            email: email.to_string(),
            account_number: account_number.to_string(),
        })
    }

    pub async fn find_user(&self, user_id: UserId) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query("SELECT id, email, account_number FROM users WHERE id = ?")
            .bind(user_id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| User {
            id: UserId::new(r.get("id")),
            email: r.get("email"),
            account_number: r.get("account_number"),
        }))
    }

    // =========================================================================
    // Instruments
    // =========================================================================

    pub async fn insert_instrument(
        &self,
        ticker: &str,
        name: &str,
        category: &str,
    ) -> Result<Instrument, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO instruments (ticker, name, category) VALUES (?, ?, ?)")
                .bind(ticker)
                .bind(name)
                .bind(category)
                .execute(&self.pool)
                .await?;

        Ok(Instrument {
            id: InstrumentId::new(result.last_insert_rowid()),
            ticker: ticker.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        })
    }

    pub async fn find_instrument(
        &self,
        instrument_id: InstrumentId,
    ) -> Result<Option<Instrument>, sqlx::Error> {
        let row =
            sqlx::query("SELECT id, ticker, name, category FROM instruments WHERE id = ?")
                .bind(instrument_id.as_i64())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| instrument_from_row(&r)))
    }

    pub async fn list_instruments(&self) -> Result<Vec<Instrument>, sqlx::Error> {
        let rows = sqlx::query("SELECT id, ticker, name, category FROM instruments ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(instrument_from_row).collect())
    }

    /// Substring search on ticker or name, case-insensitive. An empty query
    /// returns the full catalog.
    pub async fn search_instruments(&self, query: &str) -> Result<Vec<Instrument>, sqlx::Error> {
        if query.is_empty() {
            return self.list_instruments().await;
        }

        let pattern = format!("%{}%", query);
        let rows = sqlx::query(
            r#"
            SELECT id, ticker, name, category
            FROM instruments
            WHERE ticker LIKE ? OR name LIKE ?
            ORDER BY id
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(instrument_from_row).collect())
    }

    // =========================================================================
    // Market data
    // =========================================================================

    pub async fn insert_quote(&self, quote: &Quote) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO marketdata (instrument_id, close, previous_close, as_of)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(quote.instrument_id.as_i64())
        .bind(quote.close.to_canonical_string())
        .bind(quote.previous_close.to_canonical_string())
        .bind(quote.as_of.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent quote for an instrument, or None when the instrument has
    /// no market data at all.
    pub async fn latest_quote(
        &self,
        instrument_id: InstrumentId,
    ) -> Result<Option<Quote>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT instrument_id, close, previous_close, as_of
            FROM marketdata
            WHERE instrument_id = ?
            ORDER BY as_of DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(instrument_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| quote_from_row(&r)).transpose()
    }

    /// Latest quote for each requested instrument that has data. Instruments
    /// without a quote are simply absent from the result; an empty request
    /// yields an empty result.
    pub async fn latest_quotes_batch(
        &self,
        instrument_ids: &[InstrumentId],
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let mut quotes = Vec::with_capacity(instrument_ids.len());
        for &instrument_id in instrument_ids {
            if let Some(quote) = self.latest_quote(instrument_id).await? {
                quotes.push(quote);
            }
        }
        Ok(quotes)
    }
}

fn instrument_from_row(row: &SqliteRow) -> Instrument {
    Instrument {
        id: InstrumentId::new(row.get("id")),
        ticker: row.get("ticker"),
        name: row.get("name"),
        category: row.get("category"),
    }
}

fn quote_from_row(row: &SqliteRow) -> Result<Quote, sqlx::Error> {
    let instrument_id: i64 = row.get("instrument_id");
    let close_str: String = row.get("close");
    let previous_close_str: String = row.get("previous_close");
    let as_of_str: String = row.get("as_of");

    let as_of = NaiveDate::from_str(&as_of_str).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    let close = Decimal::from_str(&close_str).unwrap_or_else(|e| {
        warn!(instrument_id, close = %close_str, error = %e, "Failed to parse quote close decimal, using default");
        Decimal::default()
    });
    let previous_close = Decimal::from_str(&previous_close_str).unwrap_or_else(|e| {
        warn!(instrument_id, previous_close = %previous_close_str, error = %e, "Failed to parse quote previous close decimal, using default");
        Decimal::default()
    });

    Ok(Quote {
        instrument_id: InstrumentId::new(instrument_id),
        close,
        previous_close,
        as_of,
    })
}
