//! Generation per production type.

use super::{run, validate_eic, FetchOptions, TimeWindow};
use crate::client::Client;
use crate::errors::AppResult;
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};

fn area_query(document_type: &str, process_type: &str, area: &str) -> AppResult<QueryBuilder> {
    let area = validate_eic(DomainParam::In.as_param(), area)?;
    Ok(QueryBuilder::new(document_type)
        .process_type(process_type)
        .domain(DomainParam::In, area))
}

/// Actual generation per production type (`A75`/`A16`).
///
/// `psr_type` restricts the answer to one production type, e.g. `B16` for solar.
pub async fn actual_per_type(
    client: &Client,
    area: &str,
    psr_type: Option<&str>,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let mut builder = area_query("A75", "A16", area)?;
    if let Some(psr) = psr_type.map(str::trim).filter(|p| !p.is_empty()) {
        builder = builder.param("psrType", psr);
    }
    run(client, builder, window, options).await
}

/// Installed generation capacity per production type (`A68`/`A33`), one value per year.
pub async fn installed_capacity(
    client: &Client,
    area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, area_query("A68", "A33", area)?, window, options).await
}

/// Day-ahead aggregated generation forecast (`A71`/`A01`).
pub async fn day_ahead_aggregated(
    client: &Client,
    area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, area_query("A71", "A01", area)?, window, options).await
}

/// Day-ahead wind and solar generation forecast (`A69`/`A01`).
pub async fn wind_solar_forecast(
    client: &Client,
    area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, area_query("A69", "A01", area)?, window, options).await
}
