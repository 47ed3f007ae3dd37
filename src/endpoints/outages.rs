//! Unavailability (outage) products.
//!
//! The provider answers these with a ZIP archive holding one document per outage;
//! normalization unpacks it transparently.

use super::{run, validate_eic, FetchOptions, OutageFilter, TimeWindow};
use crate::client::Client;
use crate::errors::AppResult;
use crate::parser::Table;
use crate::query::{DomainParam, QueryBuilder};

fn filtered(builder: QueryBuilder, filter: &OutageFilter) -> QueryBuilder {
    builder
        .business_type(filter.business_type.as_deref())
        .doc_status(filter.doc_status.as_deref())
}

fn zone_query(document_type: &str, bidding_zone: &str, filter: &OutageFilter) -> AppResult<QueryBuilder> {
    let zone = validate_eic(DomainParam::BiddingZone.as_param(), bidding_zone)?;
    Ok(filtered(
        QueryBuilder::new(document_type).domain(DomainParam::BiddingZone, zone),
        filter,
    ))
}

/// Unavailability of generation units (`A80`).
pub async fn generation_units(
    client: &Client,
    bidding_zone: &str,
    filter: &OutageFilter,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, zone_query("A80", bidding_zone, filter)?, window, options).await
}

/// Unavailability of production units (`A77`).
pub async fn production_units(
    client: &Client,
    bidding_zone: &str,
    filter: &OutageFilter,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    run(client, zone_query("A77", bidding_zone, filter)?, window, options).await
}

/// Unavailability of transmission infrastructure between two areas (`A78`).
pub async fn transmission_infrastructure(
    client: &Client,
    in_area: &str,
    out_area: &str,
    filter: &OutageFilter,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let in_area = validate_eic(DomainParam::In.as_param(), in_area)?;
    let out_area = validate_eic(DomainParam::Out.as_param(), out_area)?;
    let builder = QueryBuilder::new("A78")
        .domain(DomainParam::In, in_area)
        .domain(DomainParam::Out, out_area);
    run(client, filtered(builder, filter), window, options).await
}
