use super::{run, validate_eic, FetchOptions, TimeWindow};
use crate::client::Client;
use crate::errors::AppResult;
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};

/// Day-ahead market prices of a bidding zone (`A44`).
///
/// The provider expects the zone as both `in_Domain` and `out_Domain`.
pub async fn day_ahead_prices(
    client: &Client,
    bidding_zone: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let zone = validate_eic(DomainParam::In.as_param(), bidding_zone)?;
    let builder = QueryBuilder::new("A44")
        .domain(DomainParam::In, zone)
        .domain(DomainParam::Out, zone);
    run(client, builder, window, options).await
}
