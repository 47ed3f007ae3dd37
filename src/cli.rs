use crate::client::Client;
use crate::config::{ResolvedConfig, ResolvedConfigFile};
use crate::endpoints::{fetch_endpoint, EndpointRequest, FetchOptions, OutageFilter, TimeWindow};
use crate::errors::{AppError, AppResult};
use crate::models::Endpoint;
use crate::output::write_parquet;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

fn command() -> Command<'static> {
    Command::new("entsoe-cli")
        .version(APP_VERSION)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("fetch")
                .about("Query one data product and print it or write it as Parquet")
                .after_help("The security token is read from ENTSOE_PAT unless --token is given.\nExample:\n  entsoe-cli fetch -q actual-load -a 10YCZ-CEPS-----N -s 2024-01-01 -e 2024-01-02 -o load.parquet")
                .arg(
                    Arg::new("query")
                        .short('q')
                        .long("query")
                        .help("Data product, e.g. 'actual-load' (al), 'day-ahead-prices' (dap), 'physical-flows' (pf)")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("area")
                        .short('a')
                        .long("area")
                        .help("EIC code of the area, zone or control area (the 'in' side for flows)")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("area_to")
                        .short('b')
                        .long("area-to")
                        .help("EIC code of the 'out' side for cross-border products")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("start")
                        .short('s')
                        .long("start")
                        .help("Period start: YYYY-MM-DD, YYYY-MM-DD HH:MM, RFC 3339 or YYYYMMDDHHmm (UTC)")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("end")
                        .short('e')
                        .long("end")
                        .help("Period end, same formats as --start")
                        .required(true)
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Parquet file to write; the table is printed when omitted")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Security token (defaults to the ENTSOE_PAT environment variable)")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("tz")
                        .long("tz")
                        .help("Timezone of naive start/end values (default CET)")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("psr_type")
                        .long("psr-type")
                        .help("Production type filter for actual generation, e.g. B16")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("business_type")
                        .long("business-type")
                        .help("Outage business type: A53 planned, A54 unplanned")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("doc_status")
                        .long("doc-status")
                        .help("Outage document status: A05 active, A09 cancelled, A13 withdrawn")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run a query described in a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Everything a single CLI run needs.
#[derive(Debug)]
struct RunPlan {
    endpoint: Endpoint,
    request: EndpointRequest,
    output: Option<PathBuf>,
    config: ResolvedConfig,
}

fn optional(sub: &ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).cloned()
}

fn required(sub: &ArgMatches, name: &str) -> AppResult<String> {
    optional(sub, name).ok_or_else(|| AppError::MissingInputError(name.to_string()))
}

fn plan_from_args(sub: &ArgMatches) -> AppResult<RunPlan> {
    let endpoint: Endpoint = required(sub, "query")?.parse()?;
    if endpoint.requires_second_area() && optional(sub, "area_to").is_none() {
        return Err(AppError::MissingInputError(format!(
            "area_to (--area-to is required for {})",
            endpoint.name()
        )));
    }
    let mut config = ResolvedConfig::default();
    if let Some(tz) = optional(sub, "tz") {
        config.source_timezone = tz;
    }
    config.validate()?;

    let request = EndpointRequest {
        area: required(sub, "area")?,
        area_to: optional(sub, "area_to"),
        window: Some(TimeWindow::new(
            required(sub, "start")?.as_str(),
            required(sub, "end")?.as_str(),
        )),
        psr_type: optional(sub, "psr_type"),
        outage_filter: OutageFilter {
            business_type: optional(sub, "business_type"),
            doc_status: optional(sub, "doc_status"),
        },
        options: FetchOptions {
            security_token: optional(sub, "token"),
            flatten: true,
        },
    };

    Ok(RunPlan {
        endpoint,
        request,
        output: sub.get_one::<PathBuf>("output").cloned(),
        config,
    })
}

fn plan_from_file(file: ResolvedConfigFile) -> AppResult<RunPlan> {
    let endpoint: Endpoint = file.endpoint.parse()?;
    let request = EndpointRequest {
        area: file.eic,
        area_to: file.eic_to,
        window: Some(TimeWindow::new(file.start.as_str(), file.end.as_str())),
        psr_type: file.psr_type,
        outage_filter: OutageFilter {
            business_type: file.business_type,
            doc_status: file.doc_status,
        },
        options: FetchOptions {
            security_token: file.security_token,
            flatten: true,
        },
    };
    Ok(RunPlan {
        endpoint,
        request,
        output: file.output,
        config: file.resolved,
    })
}

/// Parses command-line arguments and executes the requested query.
///
/// This function handles two subcommands:
/// - `fetch`: query described by flags, default client configuration
/// - `toml`: query and client configuration read from a TOML file
///
/// Both run the same workflow: build the client, call the endpoint function, then write
/// the flat table to Parquet or print it. A query the provider has no data for is
/// reported and is not a failure.
pub async fn cli() -> AppResult<()> {
    let cmd = command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    let plan = match matches.subcommand() {
        Some(("fetch", sub)) => plan_from_args(sub)?,
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::MissingInputError("config".to_string()))?;
            plan_from_file(ResolvedConfigFile::from_toml_file(config_path)?)?
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
            return Ok(());
        }
    };

    run_plan(plan).await
}

async fn run_plan(plan: RunPlan) -> AppResult<()> {
    let started = Instant::now();
    let client = Client::new(&plan.config)?;
    info!(
        endpoint = plan.endpoint.display_name(),
        area = %plan.request.area,
        area_to = plan.request.area_to.as_deref().unwrap_or("-"),
        "Starting query"
    );

    let table = match fetch_endpoint(&client, plan.endpoint, &plan.request).await {
        Ok(table) => table,
        Err(e) if e.is_no_data() => {
            info!(reason = %e, "Provider holds no data for this query");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut df = table.into_dataframe()?;
    match &plan.output {
        Some(path) => {
            write_parquet(&mut df, path, started)?;
        }
        None => println!("{df}"),
    }

    info!(
        endpoint = plan.endpoint.display_name(),
        rows = df.height(),
        "All operations completed successfully"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetch_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["entsoe-cli", "fetch"];
        argv.extend_from_slice(args);
        let matches = command().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("fetch").unwrap().clone()
    }

    #[test]
    fn fetch_command_builds_plan() {
        let sub = fetch_matches(&[
            "-q", "pf", "-a", "10YCZ-CEPS-----N", "-b", "10YSK-SEPS-----K", "-s", "2024-01-01",
            "-e", "2024-01-02", "-o", "flows.parquet", "--tz", "Europe/Prague",
        ]);
        let plan = plan_from_args(&sub).unwrap();
        assert_eq!(plan.endpoint, Endpoint::PhysicalFlows);
        assert_eq!(plan.request.area_to.as_deref(), Some("10YSK-SEPS-----K"));
        assert_eq!(plan.output, Some(PathBuf::from("flows.parquet")));
        assert_eq!(plan.config.source_timezone, "Europe/Prague");
        assert!(plan.request.options.flatten);
    }

    #[test]
    fn unknown_endpoint_is_invalid_input() {
        let sub = fetch_matches(&["-q", "nope", "-a", "x", "-s", "2024-01-01", "-e", "2024-01-02"]);
        assert!(matches!(plan_from_args(&sub), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn directional_query_requires_area_to() {
        let sub = fetch_matches(&["-q", "npf", "-a", "10YCZ-CEPS-----N", "-s", "2024-01-01", "-e", "2024-01-02"]);
        assert!(matches!(
            plan_from_args(&sub),
            Err(AppError::MissingInputError(ref f)) if f.starts_with("area_to")
        ));
    }

    #[test]
    fn unknown_timezone_is_invalid_input() {
        let sub = fetch_matches(&[
            "-q", "al", "-a", "x", "-s", "2024-01-01", "-e", "2024-01-02", "--tz", "Mars/Base",
        ]);
        assert!(matches!(plan_from_args(&sub), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn fetch_requires_area_and_period() {
        let result = command().try_get_matches_from(vec!["entsoe-cli", "fetch", "-q", "al"]);
        assert!(result.is_err());
    }

    #[test]
    fn toml_file_carries_outage_filters() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("outages.toml");
        std::fs::write(
            &path,
            r#"
endpoint = "generation-outages"
eic = "10YCZ-CEPS-----N"
start = "2024-01-01"
end = "2024-01-08"
business_type = "A53"
doc_status = "A05"
"#,
        )
        .unwrap();

        let plan = plan_from_file(ResolvedConfigFile::from_toml_file(&path).unwrap()).unwrap();
        assert_eq!(plan.endpoint, Endpoint::GenerationOutages);
        assert_eq!(plan.request.outage_filter.business_type.as_deref(), Some("A53"));
        assert_eq!(plan.request.outage_filter.doc_status.as_deref(), Some("A05"));
        assert!(plan.output.is_none());
    }

    #[test]
    fn toml_command_requires_path() {
        let err = command().try_get_matches_from(vec!["entsoe-cli", "toml"]);
        assert!(err.is_err());
    }
}
