//! Endpoint functions, one per provider data product.
//!
//! Every function validates its inputs, assembles a [`Query`](crate::query::Query), sends
//! it through the shared [`Client`] and normalizes the answer. Nothing touches the network
//! before validation passes.

pub mod balancing;
pub mod generation;
pub mod load;
pub mod market;
pub mod outages;
pub mod transmission;

use crate::client::Client;
use crate::errors::{AppError, AppResult};
use crate::models::Endpoint;
use crate::parser::{self, SeriesGroup, Table};
use crate::query::{QueryBuilder, SecurityToken};
use crate::timestamp::TimeInput;
use tracing::info;

/// Length of an Energy Identification Code.
pub const EIC_LENGTH: usize = 16;

/// Per-call options shared by all endpoint functions.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Explicit token; `ENTSOE_PAT` is read when absent
    pub security_token: Option<String>,
    /// Flat one-row-per-point table (`true`) or series/period grouping (`false`)
    pub flatten: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            security_token: None,
            flatten: true,
        }
    }
}

impl FetchOptions {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            security_token: Some(token.into()),
            ..Self::default()
        }
    }
}

/// Requested period; naive values are read in the client's source timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: Option<TimeInput>,
    pub end: Option<TimeInput>,
}

impl TimeWindow {
    pub fn new(start: impl Into<TimeInput>, end: impl Into<TimeInput>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }
}

/// Optional filters of the outage products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutageFilter {
    /// `A53` planned maintenance or `A54` unplanned outage
    pub business_type: Option<String>,
    /// `A05` active, `A09` cancelled, `A13` withdrawn
    pub doc_status: Option<String>,
}

/// Checks an EIC area code and returns it trimmed.
///
/// # Errors
///
/// `MissingInputError` naming `field` when empty, `InvalidInput` when not 16 characters.
pub fn validate_eic<'a>(field: &str, eic: &'a str) -> AppResult<&'a str> {
    let eic = eic.trim();
    if eic.is_empty() {
        return Err(AppError::MissingInputError(field.to_string()));
    }
    if eic.chars().count() != EIC_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "{field} must be a {EIC_LENGTH}-character EIC code, got '{eic}'"
        )));
    }
    Ok(eic)
}

fn prepare(
    client: &Client,
    builder: QueryBuilder,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<crate::query::Query> {
    let token = SecurityToken::resolve(options.security_token.as_deref())?;
    builder
        .period(window.start.clone(), window.end.clone())
        .security_token(token)
        .source_timezone(client.timezone())
        .max_span_days(client.max_span_days())
        .build()
}

/// Builds the query, sends it and normalizes the answer.
pub(crate) async fn run(
    client: &Client,
    builder: QueryBuilder,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Table> {
    let query = prepare(client, builder, window, options)?;
    info!(
        document_type = query.document_type(),
        process_type = query.process_type().unwrap_or("-"),
        period_start = %query.period_start(),
        period_end = %query.period_end(),
        "Querying transparency platform"
    );
    let table = client.fetch(&query, options.flatten).await?;
    info!(rows = table.height(), "Query completed");
    Ok(table)
}

/// Like [`run`] but stops at the walked series, for composite products.
pub(crate) async fn run_groups(
    client: &Client,
    builder: QueryBuilder,
    window: &TimeWindow,
    options: &FetchOptions,
) -> AppResult<Vec<SeriesGroup>> {
    let query = prepare(client, builder, window, options)?;
    let url = query.to_url(client.base_url())?;
    let response = client.send(&url).await?;
    parser::parse_groups(&response.body)
}

/// Everything needed to call any endpoint by name.
#[derive(Debug, Clone, Default)]
pub struct EndpointRequest {
    /// Area, bidding zone or control area EIC (the `in` side for directional products)
    pub area: String,
    /// `out` side EIC for directional products
    pub area_to: Option<String>,
    pub window: Option<TimeWindow>,
    /// Production type filter for actual generation
    pub psr_type: Option<String>,
    pub outage_filter: OutageFilter,
    pub options: FetchOptions,
}

/// Dispatches `endpoint` to its endpoint function.
pub async fn fetch_endpoint(
    client: &Client,
    endpoint: Endpoint,
    request: &EndpointRequest,
) -> AppResult<Table> {
    let window = request.window.clone().unwrap_or(TimeWindow {
        start: None,
        end: None,
    });
    let area = request.area.as_str();
    // Unused by single-area products
    let area_to = if endpoint.requires_second_area() {
        request.area_to.as_deref().ok_or_else(|| {
            AppError::MissingInputError(format!("second area for {}", endpoint.name()))
        })?
    } else {
        ""
    };
    let options = &request.options;

    match endpoint {
        Endpoint::ActualLoad => load::actual_total(client, area, &window, options).await,
        Endpoint::DayAheadLoad => load::day_ahead_forecast(client, area, &window, options).await,
        Endpoint::WeekAheadLoad => load::week_ahead_forecast(client, area, &window, options).await,
        Endpoint::ActualGeneration => {
            generation::actual_per_type(
                client,
                area,
                request.psr_type.as_deref(),
                &window,
                options,
            )
            .await
        }
        Endpoint::InstalledCapacity => {
            generation::installed_capacity(client, area, &window, options).await
        }
        Endpoint::DayAheadGeneration => {
            generation::day_ahead_aggregated(client, area, &window, options).await
        }
        Endpoint::WindSolarForecast => {
            generation::wind_solar_forecast(client, area, &window, options).await
        }
        Endpoint::PhysicalFlows => {
            transmission::physical_flows(client, area, area_to, &window, options).await
        }
        Endpoint::NetPhysicalFlows => {
            transmission::net_physical_flows(client, area, area_to, &window, options).await
        }
        Endpoint::ScheduledExchanges => {
            transmission::scheduled_exchanges(client, area, area_to, &window, options).await
        }
        Endpoint::NetTransferCapacity => {
            transmission::net_transfer_capacity_day_ahead(
                client,
                area,
                area_to,
                &window,
                options,
            )
            .await
        }
        Endpoint::DayAheadPrices => market::day_ahead_prices(client, area, &window, options).await,
        Endpoint::ImbalancePrices => {
            balancing::imbalance_prices(client, area, &window, options).await
        }
        Endpoint::ImbalanceVolumes => {
            balancing::imbalance_volumes(client, area, &window, options).await
        }
        Endpoint::GenerationOutages => {
            outages::generation_units(client, area, &request.outage_filter, &window, options).await
        }
        Endpoint::ProductionOutages => {
            outages::production_units(client, area, &request.outage_filter, &window, options).await
        }
        Endpoint::TransmissionOutages => {
            outages::transmission_infrastructure(
                client,
                area,
                area_to,
                &request.outage_filter,
                &window,
                options,
            )
            .await
        }
    }
}
