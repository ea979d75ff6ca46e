//! Customer profile lookups.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::customer::Customer;

/// Find the customer profile linked to a user account, if any.
pub async fn find_by_user_id(pool: &PgPool, user_id: i32) -> Result<Option<Customer>, AppError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// Find a customer by id.
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Customer>, AppError> {
    let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}
