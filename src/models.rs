use crate::constants::*;
use crate::errors::AppError;
use std::str::FromStr;

/// Data products reachable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ActualLoad,
    DayAheadLoad,
    WeekAheadLoad,
    ActualGeneration,
    InstalledCapacity,
    DayAheadGeneration,
    WindSolarForecast,
    PhysicalFlows,
    NetPhysicalFlows,
    ScheduledExchanges,
    NetTransferCapacity,
    DayAheadPrices,
    ImbalancePrices,
    ImbalanceVolumes,
    GenerationOutages,
    ProductionOutages,
    TransmissionOutages,
}

impl Endpoint {
    pub const ALL: [Endpoint; 17] = [
        Self::ActualLoad,
        Self::DayAheadLoad,
        Self::WeekAheadLoad,
        Self::ActualGeneration,
        Self::InstalledCapacity,
        Self::DayAheadGeneration,
        Self::WindSolarForecast,
        Self::PhysicalFlows,
        Self::NetPhysicalFlows,
        Self::ScheduledExchanges,
        Self::NetTransferCapacity,
        Self::DayAheadPrices,
        Self::ImbalancePrices,
        Self::ImbalanceVolumes,
        Self::GenerationOutages,
        Self::ProductionOutages,
        Self::TransmissionOutages,
    ];

    /// Returns a human-readable name for the endpoint.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ActualLoad => "Actual Total Load",
            Self::DayAheadLoad => "Day-ahead Total Load Forecast",
            Self::WeekAheadLoad => "Week-ahead Total Load Forecast",
            Self::ActualGeneration => "Actual Generation per Production Type",
            Self::InstalledCapacity => "Installed Generation Capacity per Production Type",
            Self::DayAheadGeneration => "Day-ahead Aggregated Generation",
            Self::WindSolarForecast => "Day-ahead Wind and Solar Forecast",
            Self::PhysicalFlows => "Cross-Border Physical Flows",
            Self::NetPhysicalFlows => "Net Cross-Border Physical Flows",
            Self::ScheduledExchanges => "Scheduled Commercial Exchanges",
            Self::NetTransferCapacity => "Day-ahead Net Transfer Capacity",
            Self::DayAheadPrices => "Day-ahead Prices",
            Self::ImbalancePrices => "Imbalance Prices",
            Self::ImbalanceVolumes => "Total Imbalance Volumes",
            Self::GenerationOutages => "Unavailability of Generation Units",
            Self::ProductionOutages => "Unavailability of Production Units",
            Self::TransmissionOutages => "Unavailability of Transmission Infrastructure",
        }
    }

    /// Primary alias, used in messages and help text.
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::ActualLoad => ACTUAL_LOAD_ALIASES,
            Self::DayAheadLoad => DAY_AHEAD_LOAD_ALIASES,
            Self::WeekAheadLoad => WEEK_AHEAD_LOAD_ALIASES,
            Self::ActualGeneration => ACTUAL_GENERATION_ALIASES,
            Self::InstalledCapacity => INSTALLED_CAPACITY_ALIASES,
            Self::DayAheadGeneration => DAY_AHEAD_GENERATION_ALIASES,
            Self::WindSolarForecast => WIND_SOLAR_FORECAST_ALIASES,
            Self::PhysicalFlows => PHYSICAL_FLOWS_ALIASES,
            Self::NetPhysicalFlows => NET_PHYSICAL_FLOWS_ALIASES,
            Self::ScheduledExchanges => SCHEDULED_EXCHANGES_ALIASES,
            Self::NetTransferCapacity => NET_TRANSFER_CAPACITY_ALIASES,
            Self::DayAheadPrices => DAY_AHEAD_PRICES_ALIASES,
            Self::ImbalancePrices => IMBALANCE_PRICES_ALIASES,
            Self::ImbalanceVolumes => IMBALANCE_VOLUMES_ALIASES,
            Self::GenerationOutages => GENERATION_OUTAGES_ALIASES,
            Self::ProductionOutages => PRODUCTION_OUTAGES_ALIASES,
            Self::TransmissionOutages => TRANSMISSION_OUTAGES_ALIASES,
        }
    }

    /// Directional products need a second area (`in` → `out`).
    pub fn requires_second_area(&self) -> bool {
        matches!(
            self,
            Self::PhysicalFlows
                | Self::NetPhysicalFlows
                | Self::ScheduledExchanges
                | Self::NetTransferCapacity
                | Self::TransmissionOutages
        )
    }
}

impl FromStr for Endpoint {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        // Trim whitespace and compare case-insensitively
        let lower = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|endpoint| endpoint.aliases().contains(&lower.as_str()))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown endpoint: '{}'", value.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::Endpoint;
    use crate::errors::AppError;

    #[test]
    fn test_endpoint_primary_alias() {
        assert_eq!("actual-load".parse::<Endpoint>().unwrap(), Endpoint::ActualLoad);
        assert_eq!("day-ahead-prices".parse::<Endpoint>().unwrap(), Endpoint::DayAheadPrices);
    }

    #[test]
    fn test_endpoint_short_alias() {
        assert_eq!("al".parse::<Endpoint>().unwrap(), Endpoint::ActualLoad);
        assert_eq!("npf".parse::<Endpoint>().unwrap(), Endpoint::NetPhysicalFlows);
    }

    #[test]
    fn test_endpoint_case_insensitive() {
        assert_eq!(" Load ".parse::<Endpoint>().unwrap(), Endpoint::ActualLoad);
        assert_eq!("PRICES".parse::<Endpoint>().unwrap(), Endpoint::DayAheadPrices);
    }

    #[test]
    fn test_endpoint_unknown_is_rejected() {
        let err = "unknown".parse::<Endpoint>().unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!("".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_aliases_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for endpoint in Endpoint::ALL {
            for alias in endpoint.aliases() {
                assert!(seen.insert(*alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn test_directional_endpoints() {
        assert!(Endpoint::PhysicalFlows.requires_second_area());
        assert!(!Endpoint::DayAheadPrices.requires_second_area());
        assert_eq!(Endpoint::TransmissionOutages.name(), "transmission-outages");
    }
}
