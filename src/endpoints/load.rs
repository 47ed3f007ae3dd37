//! Total load (document type `A65`).

use super::{run, validate_eic, FetchOptions, TimeWindow};
use crate::client::Client;
use crate::errors::AppResult;
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};

const LOAD_DOCUMENT: &str = "A65";

async fn total_load(
    client: &Client,
    process_type: &str,
    bidding_zone: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let zone = validate_eic(DomainParam::OutBiddingZone.as_param(), bidding_zone)?;
    let builder = QueryBuilder::new(LOAD_DOCUMENT)
        .process_type(process_type)
        .domain(DomainParam::OutBiddingZone, zone);
    run(client, builder, window, options).await
}

/// Actual total load of a bidding zone (`A65`/`A16`).
pub async fn actual_total(
    client: &Client,
    bidding_zone: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    total_load(client, "A16", bidding_zone, window, options).await
}

/// Day-ahead total load forecast (`A65`/`A01`).
pub async fn day_ahead_forecast(
    client: &Client,
    bidding_zone: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    total_load(client, "A01", bidding_zone, window, options).await
}

/// Week-ahead total load forecast (`A65`/`A31`), daily minimum and maximum per zone.
pub async fn week_ahead_forecast(
    client: &Client,
    bidding_zone: &str,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    total_load(client, "A31", bidding_zone, window, options).await
}
