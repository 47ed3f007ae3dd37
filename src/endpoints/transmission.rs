//! Cross-border products between an `in` and an `out` area.

use super::{run, run_groups, validate_eic, FetchOptions, TimeWindow};
use crate::client::Client;
use crate::errors::{AppError, AppResult};
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};
use tracing::{info, warn};

fn directional_query(document_type: &str, in_area: &str, out_area: &str) -> AppResult<QueryBuilder> {
    let in_area = validate_eic(DomainParam::In.as_param(), in_area)?;
    let out_area = validate_eic(DomainParam::Out.as_param(), out_area)?;
    Ok(QueryBuilder::new(document_type)
        .domain(DomainParam::In, in_area)
        .domain(DomainParam::Out, out_area))
}

/// Physical flows from `out_area` into `in_area` (`A11`).
pub async fn physical_flows(
    client: &Client,
    in_area: &str,
    out_area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, directional_query("A11", in_area, out_area)?, window, options).await
}

/// Scheduled commercial exchanges (`A09`).
pub async fn scheduled_exchanges(
    client: &Client,
    in_area: &str,
    out_area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, directional_query("A09", in_area, out_area)?, window, options).await
}

/// Day-ahead forecasted net transfer capacity (`A61`, daily contract `A01`).
pub async fn net_transfer_capacity_day_ahead(
    client: &Client,
    in_area: &str,
    out_area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let builder =
        directional_query("A61", in_area, out_area)?.param("contract_MarketAgreement.Type", "A01");
    run(client, builder, window, options).await
}

/// Physical flows in both directions between two areas.
///
/// Each direction is queried in turn. A failed direction is logged and skipped; the
/// call fails only when both directions fail, with the first failure.
pub async fn net_physical_flows(
    client: &Client,
    area_a: &str,
    area_b: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let directions = [(area_a, area_b), (area_b, area_a)];
    // Both sub-queries are validated before anything is sent
    let builders = directions
        .iter()
        .map(|(in_area, out_area)| directional_query("A11", in_area, out_area))
        .collect::<AppResult<Vec<_>>>()?;

    let mut groups = Vec::new();
    let mut first_error: Option<AppError> = None;
    let mut succeeded = 0usize;

    for ((in_area, out_area), builder) in directions.iter().zip(builders) {
        match run_groups(client, builder, window, options).await {
            Ok(direction_groups) => {
                info!(
                    in_domain = in_area.trim(),
                    out_domain = out_area.trim(),
                    series = direction_groups.len(),
                    "Direction fetched"
                );
                succeeded += 1;
                groups.extend(direction_groups);
            }
            Err(e) => {
                warn!(
                    in_domain = in_area.trim(),
                    out_domain = out_area.trim(),
                    error = %e,
                    "Skipping failed direction"
                );
                first_error.get_or_insert(e);
            }
        }
    }

    if succeeded == 0 {
        if let Some(e) = first_error {
            return Err(e);
        }
    }
    Table::from_groups(groups, options.flatten)
}
