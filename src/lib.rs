//! entsoe-cli library
//!
//! This crate provides the core functionality for the `entsoe-cli` binary: typed access to
//! the ENTSO-E Transparency Platform REST API with responses normalized into Polars tables.
//!
//! ## Overview
//!
//! - [`timestamp`] - Converts flexible time inputs into the provider's compact UTC form
//! - [`query`] - Query descriptors, validation and request URL assembly
//! - [`client`] - Safe request wrapper: HTTP GET, error classification, retry with backoff
//! - [`parser`] - Response normalization: XML documents (or ZIP archives of them) to tables
//! - [`endpoints`] - One function per data product (load, generation, transmission, ...)
//! - [`cli`] - Command-line interface, [`output`] - Parquet writer
//! - [`config`], [`models`], [`errors`] - Configuration, endpoint catalogue, error types
//!
//! ## Example Usage
//!
//! ```no_run
//! use entsoe_cli::client::Client;
//! use entsoe_cli::config::ResolvedConfig;
//! use entsoe_cli::endpoints::{load, FetchOptions, TimeWindow};
//! use entsoe_cli::errors::AppResult;
//!
//! # async fn example() -> AppResult<()> {
//! let client = Client::new(&ResolvedConfig::default())?;
//! let window = TimeWindow::new("2024-01-01", "2024-01-02");
//! let table = load::actual_total(&client, "10YCZ-CEPS-----N", &window, &FetchOptions::default())
//!     .await?;
//! println!("{}", table.into_dataframe()?);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod endpoints;
pub mod errors;
pub mod models;
pub mod output;
pub mod parser;
pub mod query;
pub mod timestamp;
