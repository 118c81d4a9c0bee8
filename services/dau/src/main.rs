//! Records the daily-active-user statistic for one day
//!
//! Meant to be started by an external scheduler shortly after midnight UTC.
//! Takes an optional `YYYYMMDD` argument and defaults to yesterday.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use tracing::info;

use common::{
    database::{DatabaseConfig, health_check, init_pool},
    telemetry::init_tracing,
};
use store::{
    models::date_key,
    repositories::{DailyActiveUserDao, UserDao},
    schema,
    validation::validate_date_key,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info")?;

    let day = match std::env::args().nth(1) {
        Some(arg) => parse_day(&arg)?,
        None => Utc::now().date_naive() - Duration::days(1),
    };

    info!("Recording daily active users for {}", day);

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    if !health_check(&pool).await? {
        anyhow::bail!("Failed to connect to database");
    }

    schema::migrate(&pool).await?;

    let from = day
        .and_hms_opt(0, 0, 0)
        .context("Invalid start of day")?
        .and_utc();
    let to = from + Duration::days(1);

    let mut tx = pool.begin().await?;
    let active = UserDao::new(&mut tx).count_active_between(from, to).await?;
    let count = i32::try_from(active).context("Active user count does not fit the statistic")?;
    let stat = DailyActiveUserDao::new(&mut tx)
        .record(date_key(day), count)
        .await?;
    tx.commit().await?;

    info!("Recorded {} daily active users for {}", stat.count, stat.date);
    Ok(())
}

/// Parse a `YYYYMMDD` command line argument
fn parse_day(arg: &str) -> Result<NaiveDate> {
    let key: i32 = arg
        .parse()
        .with_context(|| format!("'{}' is not a YYYYMMDD date", arg))?;
    validate_date_key(key).map_err(anyhow::Error::msg)
}
