//! Usage reporting queries: role-scoped listings, windowed summary
//! statistics, and per-customer consumption rankings.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::customer::CustomerType;
use crate::models::usage::{UsageRecord, UsageRecordWithCustomer};
use crate::models::user::UserRole;
use crate::services::{billing, customer};

/// Hard cap on rows returned by the listing endpoint.
const MAX_USAGE_ROWS: i64 = 1000;

/// Default number of rows returned by the top-customers ranking.
const DEFAULT_TOP_LIMIT: i64 = 15;

/// Length in days of the default summary window ending today.
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Filters for the usage listing. `customer_id` is honored for staff
/// callers only; customers are always scoped to their own profile.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UsageFilters {
    pub customer_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parameters for the summary endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SummaryParams {
    pub customer_id: Option<i32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parameters for the top-customers ranking.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TopCustomersParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<i64>,
}

/// Listing payload variants. Staff get customer display fields on every
/// row; customers get the bare records.
#[derive(Debug)]
pub enum UsageListing {
    Bare(Vec<UsageRecord>),
    WithCustomer(Vec<UsageRecordWithCustomer>),
}

/// Period bounds echoed back by the summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Summary statistics block. `rate_per_ccf` and `estimated_cost` are null
/// when no billing rate resolves for the customer.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryStats {
    pub total_usage_ccf: f64,
    pub average_daily_ccf: f64,
    pub max_daily_ccf: f64,
    pub days_count: i64,
    pub rate_per_ccf: Option<f64>,
    pub estimated_cost: Option<f64>,
}

/// Full summary response body.
#[derive(Debug, Clone, Serialize)]
pub struct UsageSummary {
    pub period: Period,
    pub summary: SummaryStats,
}

/// One row of the consumption ranking. All keys are always present;
/// display fields fall back to placeholders or null for broken links.
#[derive(Debug, Clone, Serialize)]
pub struct TopCustomer {
    pub customer_id: i32,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub total_usage_ccf: f64,
    pub record_count: i64,
}

/// Ranking response body.
#[derive(Debug, Clone, Serialize)]
pub struct TopCustomersReport {
    pub top_customers: Vec<TopCustomer>,
}

/// Inclusive reporting window for the summary endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SummaryWindow {
    /// Resolve the window from optional ISO bounds. Both bounds default
    /// relative to `today` (last 30 days) and may be overridden
    /// independently.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let end = match end {
            Some(raw) => parse_iso_date(raw)?,
            None => today,
        };
        let start = match start {
            Some(raw) => parse_iso_date(raw)?,
            None => today - Duration::days(DEFAULT_WINDOW_DAYS),
        };
        Ok(Self { start, end })
    }

    /// Number of days covered, counting both bounds.
    pub fn days_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Parse an ISO `YYYY-MM-DD` date. Malformed input surfaces through the
/// generic internal-error path rather than as a validation failure.
fn parse_iso_date(value: &str) -> Result<NaiveDate, AppError> {
    value
        .parse::<NaiveDate>()
        .map_err(|e| AppError::Internal(format!("Invalid date '{value}': {e}")))
}

/// List usage records visible to the caller, newest first, capped at
/// `MAX_USAGE_ROWS`.
pub async fn list(
    pool: &PgPool,
    user: &CurrentUser,
    filters: &UsageFilters,
) -> Result<UsageListing, AppError> {
    let scope = match user.role {
        UserRole::Customer => {
            let profile = customer::find_by_user_id(pool, user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))?;
            Some(profile.id)
        }
        _ => filters.customer_id,
    };

    let start = filters.start_date.as_deref().map(parse_iso_date).transpose()?;
    let end = filters.end_date.as_deref().map(parse_iso_date).transpose()?;

    if user.role.is_staff() {
        let rows = fetch_records_with_customer(pool, scope, start, end).await?;
        Ok(UsageListing::WithCustomer(rows))
    } else {
        let rows = fetch_records(pool, scope, start, end).await?;
        Ok(UsageListing::Bare(rows))
    }
}

/// Compute summary statistics over the caller's effective scope.
/// Customers are scoped to their own profile; staff must name a customer.
pub async fn summary(
    pool: &PgPool,
    user: &CurrentUser,
    params: &SummaryParams,
) -> Result<UsageSummary, AppError> {
    let customer_id = match user.role {
        UserRole::Customer => {
            customer::find_by_user_id(pool, user.id)
                .await?
                .ok_or_else(|| AppError::NotFound("Customer profile not found".to_string()))?
                .id
        }
        _ => params
            .customer_id
            .ok_or_else(|| AppError::Validation("customer_id required".to_string()))?,
    };

    let window = SummaryWindow::resolve(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        Utc::now().date_naive(),
    )?;

    let aggregates = fetch_window_aggregates(pool, customer_id, &window).await?;

    // An unknown customer_id still reports zeros; it just cannot carry a rate.
    let (rate_per_ccf, estimated_cost) = match customer::find_by_id(pool, customer_id).await? {
        Some(profile) => {
            let rate = billing::resolve_rate(pool, &profile.customer_type).await?;
            (rate, rate.map(|r| aggregates.total_usage * r))
        }
        None => (None, None),
    };

    Ok(UsageSummary {
        period: Period {
            start_date: window.start,
            end_date: window.end,
        },
        summary: SummaryStats {
            total_usage_ccf: aggregates.total_usage,
            average_daily_ccf: aggregates.average_daily,
            max_daily_ccf: aggregates.max_daily,
            days_count: window.days_count(),
            rate_per_ccf,
            estimated_cost,
        },
    })
}

/// Rank customers by total consumption over an optional inclusive window.
/// Ties are broken by customer id so repeated queries return a stable order.
pub async fn top_customers(
    pool: &PgPool,
    params: &TopCustomersParams,
) -> Result<TopCustomersReport, AppError> {
    let start = params.start_date.as_deref().map(parse_iso_date).transpose()?;
    let end = params.end_date.as_deref().map(parse_iso_date).transpose()?;
    let limit = params.limit.unwrap_or(DEFAULT_TOP_LIMIT);

    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if start.is_some() {
        param_index += 1;
        conditions.push(format!("wu.usage_date >= ${param_index}"));
    }
    if end.is_some() {
        param_index += 1;
        conditions.push(format!("wu.usage_date <= ${param_index}"));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let limit_index = param_index + 1;
    let sql = format!(
        "SELECT wu.customer_id, c.customer_name, u.email AS customer_email, c.customer_type, \
         SUM(wu.daily_usage_ccf) AS total_usage_ccf, COUNT(wu.id) AS record_count \
         FROM water_usage wu \
         LEFT JOIN customers c ON c.id = wu.customer_id \
         LEFT JOIN users u ON u.id = c.user_id \
         {where_clause} \
         GROUP BY wu.customer_id, c.customer_name, u.email, c.customer_type \
         ORDER BY total_usage_ccf DESC, wu.customer_id ASC \
         LIMIT ${limit_index}"
    );

    let mut query = sqlx::query_as::<_, TopCustomerRow>(&sql);
    if let Some(date) = start {
        query = query.bind(date);
    }
    if let Some(date) = end {
        query = query.bind(date);
    }
    query = query.bind(limit);

    let rows = query.fetch_all(pool).await?;

    let top_customers = rows
        .into_iter()
        .map(|row| TopCustomer {
            customer_name: row
                .customer_name
                .unwrap_or_else(|| format!("Customer {}", row.customer_id)),
            customer_id: row.customer_id,
            customer_email: row.customer_email,
            customer_type: row.customer_type,
            total_usage_ccf: row.total_usage_ccf,
            record_count: row.record_count,
        })
        .collect();

    Ok(TopCustomersReport { top_customers })
}

/// Intermediate ranking row before display fallbacks are applied.
#[derive(Debug, sqlx::FromRow)]
struct TopCustomerRow {
    customer_id: i32,
    customer_name: Option<String>,
    customer_email: Option<String>,
    customer_type: Option<CustomerType>,
    total_usage_ccf: f64,
    record_count: i64,
}

/// Intermediate row for the single-query window aggregates.
#[derive(Debug, sqlx::FromRow)]
struct UsageAggregates {
    total_usage: f64,
    average_daily: f64,
    max_daily: f64,
}

async fn fetch_records(
    pool: &PgPool,
    customer_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<UsageRecord>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if customer_id.is_some() {
        param_index += 1;
        conditions.push(format!("customer_id = ${param_index}"));
    }
    if start.is_some() {
        param_index += 1;
        conditions.push(format!("usage_date >= ${param_index}"));
    }
    if end.is_some() {
        param_index += 1;
        conditions.push(format!("usage_date <= ${param_index}"));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT id, customer_id, usage_date, daily_usage_ccf, is_estimated \
         FROM water_usage {where_clause} \
         ORDER BY usage_date DESC \
         LIMIT {MAX_USAGE_ROWS}"
    );

    let mut query = sqlx::query_as::<_, UsageRecord>(&sql);
    if let Some(id) = customer_id {
        query = query.bind(id);
    }
    if let Some(date) = start {
        query = query.bind(date);
    }
    if let Some(date) = end {
        query = query.bind(date);
    }

    Ok(query.fetch_all(pool).await?)
}

async fn fetch_records_with_customer(
    pool: &PgPool,
    customer_id: Option<i32>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<UsageRecordWithCustomer>, AppError> {
    let mut conditions: Vec<String> = Vec::new();
    let mut param_index = 0u32;

    if customer_id.is_some() {
        param_index += 1;
        conditions.push(format!("wu.customer_id = ${param_index}"));
    }
    if start.is_some() {
        param_index += 1;
        conditions.push(format!("wu.usage_date >= ${param_index}"));
    }
    if end.is_some() {
        param_index += 1;
        conditions.push(format!("wu.usage_date <= ${param_index}"));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT wu.id, wu.customer_id, wu.usage_date, wu.daily_usage_ccf, wu.is_estimated, \
         c.customer_name, u.email AS customer_email \
         FROM water_usage wu \
         LEFT JOIN customers c ON c.id = wu.customer_id \
         LEFT JOIN users u ON u.id = c.user_id \
         {where_clause} \
         ORDER BY wu.usage_date DESC \
         LIMIT {MAX_USAGE_ROWS}"
    );

    let mut query = sqlx::query_as::<_, UsageRecordWithCustomer>(&sql);
    if let Some(id) = customer_id {
        query = query.bind(id);
    }
    if let Some(date) = start {
        query = query.bind(date);
    }
    if let Some(date) = end {
        query = query.bind(date);
    }

    Ok(query.fetch_all(pool).await?)
}

/// Sum, average, and max of daily usage over an inclusive window in one
/// aggregate query. Empty windows report zeros.
async fn fetch_window_aggregates(
    pool: &PgPool,
    customer_id: i32,
    window: &SummaryWindow,
) -> Result<UsageAggregates, AppError> {
    let row = sqlx::query_as::<_, UsageAggregates>(
        r#"
        SELECT
            COALESCE(SUM(daily_usage_ccf), 0) AS total_usage,
            COALESCE(AVG(daily_usage_ccf), 0) AS average_daily,
            COALESCE(MAX(daily_usage_ccf), 0) AS max_daily
        FROM water_usage
        WHERE customer_id = $1 AND usage_date >= $2 AND usage_date <= $3
        "#,
    )
    .bind(customer_id)
    .bind(window.start)
    .bind(window.end)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_iso_date_accepts_plain_dates() {
        assert_eq!(parse_iso_date("2024-01-15").unwrap(), date(2024, 1, 15));
    }

    #[test]
    fn parse_iso_date_rejects_garbage() {
        let err = parse_iso_date("not-a-date").unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[test]
    fn window_defaults_to_last_thirty_days() {
        let today = date(2024, 3, 31);
        let window = SummaryWindow::resolve(None, None, today).unwrap();
        assert_eq!(window.end, today);
        assert_eq!(window.start, date(2024, 3, 1));
        assert_eq!(window.days_count(), 31);
    }

    #[test]
    fn window_bounds_override_independently() {
        let today = date(2024, 3, 31);

        let window = SummaryWindow::resolve(Some("2024-01-01"), None, today).unwrap();
        assert_eq!(window.start, date(2024, 1, 1));
        assert_eq!(window.end, today);

        let window = SummaryWindow::resolve(None, Some("2024-02-15"), today).unwrap();
        // Overriding only the end keeps the start anchored to today.
        assert_eq!(window.start, date(2024, 3, 1));
        assert_eq!(window.end, date(2024, 2, 15));
    }

    #[test]
    fn window_counts_both_bounds() {
        let window =
            SummaryWindow::resolve(Some("2024-01-01"), Some("2024-01-10"), date(2024, 6, 1))
                .unwrap();
        assert_eq!(window.days_count(), 10);
    }

    #[test]
    fn window_rejects_malformed_bounds() {
        let result = SummaryWindow::resolve(Some("01/02/2024"), None, date(2024, 6, 1));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn summary_serialization_shape() {
        let summary = UsageSummary {
            period: Period {
                start_date: date(2024, 1, 1),
                end_date: date(2024, 1, 10),
            },
            summary: SummaryStats {
                total_usage_ccf: 55.0,
                average_daily_ccf: 5.5,
                max_daily_ccf: 10.0,
                days_count: 10,
                rate_per_ccf: None,
                estimated_cost: None,
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["period"]["start_date"], "2024-01-01");
        assert_eq!(json["summary"]["total_usage_ccf"], 55.0);
        assert!(json["summary"]["rate_per_ccf"].is_null());
    }
}
