//! Billing-rate resolution.
//!
//! Rate schedules are maintained by the billing team; each row takes effect
//! on its `effective_date` and stays current until a later row supersedes it.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::customer::CustomerType;

/// Resolve the rate per CCF currently in effect for a customer type.
/// Returns `None` when no schedule covers the type yet.
pub async fn resolve_rate(
    pool: &PgPool,
    customer_type: &CustomerType,
) -> Result<Option<f64>, AppError> {
    let rate = sqlx::query_scalar::<_, f64>(
        r#"
        SELECT rate_per_ccf
        FROM billing_rates
        WHERE customer_type = $1 AND effective_date <= CURRENT_DATE
        ORDER BY effective_date DESC
        LIMIT 1
        "#,
    )
    .bind(customer_type)
    .fetch_optional(pool)
    .await?;
    Ok(rate)
}
