// Provider endpoint
pub const BASE_URL: &str = "https://web-api.tp.entsoe.eu/api";

// Environment variable holding the provider security token
pub const SECURITY_TOKEN_ENV: &str = "ENTSOE_PAT";

// Default timezone for naive timestamp inputs
pub const DEFAULT_SOURCE_TIMEZONE: &str = "CET";

// Longest period a single query may span
pub const MAX_PERIOD_SPAN_DAYS: i64 = 366;

// Provider compact timestamp format (UTC)
pub const COMPACT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

// Root element suffix shared by every market document
pub const MARKET_DOCUMENT_SUFFIX: &str = "_MarketDocument";
pub const ACKNOWLEDGEMENT_ROOT: &str = "Acknowledgement_MarketDocument";

// Reason text the provider uses when a valid query has no results
pub const NO_DATA_REASON: &str = "no matching data found";

// Structural tag names of the series hierarchy
pub const TIME_SERIES_TAG: &str = "TimeSeries";
pub const PERIOD_TAGS: &[&str] = &["Period", "Available_Period"];
pub const POINT_TAG: &str = "Point";

// Resolution pattern (ISO-8601 durations used by the provider)
pub const RESOLUTION_REGEX_PATTERN: &str = r"^P(?:([0-9]+)([DMY])|T([0-9]+)([MH]))$";

// Endpoint aliases accepted on the command line
pub const ACTUAL_LOAD_ALIASES: &[&str] = &["actual-load", "load", "al"];
pub const DAY_AHEAD_LOAD_ALIASES: &[&str] = &["day-ahead-load", "load-forecast", "dal"];
pub const WEEK_AHEAD_LOAD_ALIASES: &[&str] = &["week-ahead-load", "wal"];
pub const ACTUAL_GENERATION_ALIASES: &[&str] = &["actual-generation", "generation", "ag"];
pub const INSTALLED_CAPACITY_ALIASES: &[&str] = &["installed-capacity", "capacity", "ic"];
pub const DAY_AHEAD_GENERATION_ALIASES: &[&str] = &["day-ahead-generation", "dag"];
pub const WIND_SOLAR_FORECAST_ALIASES: &[&str] = &["wind-solar-forecast", "res-forecast", "wsf"];
pub const PHYSICAL_FLOWS_ALIASES: &[&str] = &["physical-flows", "flows", "pf"];
pub const NET_PHYSICAL_FLOWS_ALIASES: &[&str] = &["net-physical-flows", "net-flows", "npf"];
pub const SCHEDULED_EXCHANGES_ALIASES: &[&str] = &["scheduled-exchanges", "exchanges", "se"];
pub const NET_TRANSFER_CAPACITY_ALIASES: &[&str] = &["net-transfer-capacity", "ntc"];
pub const DAY_AHEAD_PRICES_ALIASES: &[&str] = &["day-ahead-prices", "prices", "dap"];
pub const IMBALANCE_PRICES_ALIASES: &[&str] = &["imbalance-prices", "ip"];
pub const IMBALANCE_VOLUMES_ALIASES: &[&str] = &["imbalance-volumes", "iv"];
pub const GENERATION_OUTAGES_ALIASES: &[&str] = &["generation-outages", "unit-outages", "go"];
pub const PRODUCTION_OUTAGES_ALIASES: &[&str] = &["production-outages", "po"];
pub const TRANSMISSION_OUTAGES_ALIASES: &[&str] = &["transmission-outages", "to"];
