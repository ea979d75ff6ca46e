//! Seed script for development — populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` environment variables (reads .env).
//! Set `JWT_ACCESS_TOKEN_EXPIRY_SECS` to control how long the printed dev
//! tokens stay valid.

use chrono::{Datelike, Duration, Utc, Weekday};
use hydrobill::config::AppConfig;
use hydrobill::models::user::UserRole;
use sqlx::PgPool;

/// Days of usage history generated per customer.
const HISTORY_DAYS: i64 = 120;

struct SampleCustomer {
    name: &'static str,
    customer_type: &'static str,
    account_number: &'static str,
    email: Option<&'static str>,
    address: &'static str,
    base_ccf: f64,
}

const SAMPLE_CUSTOMERS: &[SampleCustomer] = &[
    SampleCustomer {
        name: "Maple Street Residence",
        customer_type: "residential",
        account_number: "WTR-10018",
        email: Some("walter.reed@example.com"),
        address: "742 Maple St",
        base_ccf: 0.9,
    },
    SampleCustomer {
        name: "Juniper Lane Residence",
        customer_type: "residential",
        account_number: "WTR-10024",
        email: Some("dana.okafor@example.com"),
        address: "18 Juniper Ln",
        base_ccf: 1.1,
    },
    SampleCustomer {
        name: "Harborview Apartments",
        customer_type: "commercial",
        account_number: "WTR-20041",
        email: Some("manager@harborview.example.com"),
        address: "500 Harbor Ave",
        base_ccf: 6.4,
    },
    SampleCustomer {
        name: "Cascade Brewing Co",
        customer_type: "industrial",
        account_number: "WTR-30007",
        email: Some("ops@cascadebrew.example.com"),
        address: "1200 Industrial Pkwy",
        base_ccf: 18.2,
    },
    // No linked login — shows up with a null email in staff views.
    SampleCustomer {
        name: "Pinecrest HOA",
        customer_type: "commercial",
        account_number: "WTR-20096",
        email: None,
        address: "77 Pinecrest Dr",
        base_ccf: 4.8,
    },
];

struct SeededCustomer {
    customer_id: i32,
    user_id: Option<i32>,
    base_ccf: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    // Run migrations first
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== Hydrobill Seed Script ===");

    let admin_id = seed_user(&pool, "ops@hydrobill.local", "admin").await?;
    let billing_id = seed_user(&pool, "billing@hydrobill.local", "billing").await?;
    println!("[done] Staff users (admin, billing)");

    let customers = seed_customers(&pool).await?;
    seed_billing_rates(&pool).await?;
    seed_usage_history(&pool, &customers).await?;

    // A customer-role login without a profile, for the 404 path.
    let pending_id = seed_user(&pool, "pending.signup@example.com", "customer").await?;
    println!("[done] Profile-less customer login (user id {pending_id})");

    println!("\n=== Seed complete! ===");
    println!(
        "Dev tokens (expire in {}s):",
        config.jwt_access_token_expiry_secs
    );

    let expiry = config.jwt_access_token_expiry_secs;
    let admin_token =
        hydrobill::services::auth::issue_token(admin_id, UserRole::Admin, &config.jwt_secret, expiry)?;
    println!("  admin:    {admin_token}");

    let billing_token = hydrobill::services::auth::issue_token(
        billing_id,
        UserRole::Billing,
        &config.jwt_secret,
        expiry,
    )?;
    println!("  billing:  {billing_token}");

    if let Some(user_id) = customers.iter().find_map(|c| c.user_id) {
        let customer_token = hydrobill::services::auth::issue_token(
            user_id,
            UserRole::Customer,
            &config.jwt_secret,
            expiry,
        )?;
        println!("  customer: {customer_token}");
    }

    Ok(())
}

/// Insert or update a user, returning its id.
async fn seed_user(pool: &PgPool, email: &str, role: &str) -> anyhow::Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO users (email, role) VALUES ($1, $2::user_role)
         ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
         RETURNING id",
    )
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_customers(pool: &PgPool) -> anyhow::Result<Vec<SeededCustomer>> {
    let mut seeded = Vec::new();

    for sample in SAMPLE_CUSTOMERS {
        let user_id = match sample.email {
            Some(email) => Some(seed_user(pool, email, "customer").await?),
            None => None,
        };

        let customer_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO customers (user_id, customer_name, customer_type, account_number, service_address)
             VALUES ($1, $2, $3::customer_type, $4, $5)
             ON CONFLICT (account_number) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                customer_name = EXCLUDED.customer_name,
                customer_type = EXCLUDED.customer_type
             RETURNING id",
        )
        .bind(user_id)
        .bind(sample.name)
        .bind(sample.customer_type)
        .bind(sample.account_number)
        .bind(sample.address)
        .fetch_one(pool)
        .await?;

        seeded.push(SeededCustomer {
            customer_id,
            user_id,
            base_ccf: sample.base_ccf,
        });
    }

    println!("[done] Created {} customers", seeded.len());
    Ok(seeded)
}

async fn seed_billing_rates(pool: &PgPool) -> anyhow::Result<()> {
    let rates = [
        ("residential", 2.31, "2023-01-01"),
        ("residential", 2.50, "2024-01-01"),
        ("commercial", 3.12, "2024-01-01"),
        ("industrial", 2.87, "2024-01-01"),
    ];

    for (customer_type, rate, effective_date) in rates {
        sqlx::query(
            "INSERT INTO billing_rates (customer_type, rate_per_ccf, effective_date)
             VALUES ($1::customer_type, $2, $3::date)
             ON CONFLICT (customer_type, effective_date) DO UPDATE SET
                rate_per_ccf = EXCLUDED.rate_per_ccf",
        )
        .bind(customer_type)
        .bind(rate)
        .bind(effective_date)
        .execute(pool)
        .await?;
    }

    println!("[done] Billing rates (residential 2.50, commercial 3.12, industrial 2.87)");
    Ok(())
}

async fn seed_usage_history(pool: &PgPool, customers: &[SeededCustomer]) -> anyhow::Result<()> {
    let ids: Vec<i32> = customers.iter().map(|c| c.customer_id).collect();

    // Regenerate from scratch so reruns stay deterministic.
    sqlx::query("DELETE FROM water_usage WHERE customer_id = ANY($1)")
        .bind(&ids)
        .execute(pool)
        .await?;

    let today = Utc::now().date_naive();
    let mut inserted = 0u32;

    for customer in customers {
        for day_offset in 0..HISTORY_DAYS {
            let usage_date = today - Duration::days(day_offset);
            // Deterministic series: weekend bump plus an 11-day drift cycle.
            let weekend = matches!(usage_date.weekday(), Weekday::Sat | Weekday::Sun);
            let bump = if weekend { 1.3 } else { 1.0 };
            let drift = (day_offset % 11) as f64 * 0.04;
            let daily_ccf = customer.base_ccf * bump + drift;
            let is_estimated = day_offset % 9 == 0;

            sqlx::query(
                "INSERT INTO water_usage (customer_id, usage_date, daily_usage_ccf, is_estimated)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(customer.customer_id)
            .bind(usage_date)
            .bind(daily_ccf)
            .bind(is_estimated)
            .execute(pool)
            .await?;
            inserted += 1;
        }
    }

    println!(
        "[done] Generated {inserted} usage records ({HISTORY_DAYS} days x {} customers)",
        customers.len()
    );
    Ok(())
}
