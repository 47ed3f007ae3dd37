use super::{run, validate_eic, FetchOptions, TimeWindow};
use crate::client::Client;
use crate::errors::AppResult;
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};

fn control_area_query(document_type: &str, control_area: &str) -> AppResult<QueryBuilder> {
    let area = validate_eic(DomainParam::ControlArea.as_param(), control_area)?;
    Ok(QueryBuilder::new(document_type).domain(DomainParam::ControlArea, area))
}

/// Imbalance prices of a control area (`A85`).
pub async fn imbalance_prices(
    client: &Client,
    control_area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, control_area_query("A85", control_area)?, window, options).await
}

/// Total imbalance volumes of a control area (`A86`).
pub async fn imbalance_volumes(
    client: &Client,
    control_area: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, control_area_query("A86", control_area)?, window, options).await
}
