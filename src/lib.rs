// Copyright 2022 Nathan (Blaise) Bruer.  All rights reserved.

use std::env;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::Local;
use clap::Parser;
use csv_async::{
    AsyncReaderBuilder as CsvAsyncReaderBuilder, AsyncWriterBuilder as CsvAsyncWriterBuilder,
};
use futures::StreamExt;
use log::{info, warn};
use num_cpus::get as get_num_cpus;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::fs;
use tokio::io::AsyncWrite;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

mod error;
#[cfg(test)]
mod tests; // Failing to do this results in zero unit tests being run.
pub use error::{Error, ErrorKind};
pub mod common;
use common::{Category, MonthKey, PurchaseRecord};
pub mod config;
use config::ImpactConfig;
pub mod impact;
use impact::pick_tip;
mod report;
use report::{HistoryRow, ReportRow};
pub mod session;
pub mod session_manager;
use session_manager::{SessionManager, MAX_WORKERS};

/// Environment variable overriding the number of session workers.
const WORKER_SPAWNS_ENV: &str = "SHOP_IMPACT_WORKER_SPAWNS";

fn parse_adoption_percentage(s: &str) -> Result<u8, String> {
    let percentage = s
        .parse::<u8>()
        .map_err(|e| format!("'{}' is not a percentage : {}", s, e))?;
    if percentage > 100 {
        return Err(format!(
            "Adoption must be between 0 and 100, got {}",
            percentage
        ));
    }
    Ok(percentage)
}

fn parse_multiplier(s: &str) -> Result<(Category, BigDecimal), String> {
    let (category, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected CATEGORY=VALUE, got '{}'", s))?;
    let value = BigDecimal::from_str(value.trim())
        .map_err(|e| format!("Invalid multiplier in '{}' : {}", s, e))?;
    Ok((Category::from(category.to_string()), value))
}

/// Command line arguments holder.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file of all purchases (session,category,brand,price,timestamp).
    purchases_file: String,

    /// Month to report on, as YYYY-MM. Defaults to the current month.
    #[clap(long)]
    month: Option<MonthKey>,

    /// Percentage of purchases shifted to green alternatives (0-100).
    #[clap(long, default_value_t = 40, parse(try_from_str = parse_adoption_percentage))]
    adoption: u8,

    /// Also write every purchase, newest first per session, to this csv file.
    #[clap(long)]
    history_file: Option<String>,

    /// Seed for picking eco tips. Tips are random when omitted.
    #[clap(long)]
    tip_seed: Option<u64>,

    /// Overrides the multiplier of a category, as CATEGORY=VALUE. May be repeated.
    #[clap(long = "multiplier", parse(try_from_str = parse_multiplier))]
    multipliers: Vec<(Category, BigDecimal)>,

    /// Multiplier for categories without their own entry.
    #[clap(long)]
    default_multiplier: Option<BigDecimal>,

    /// Monthly impact below which a month is low impact.
    #[clap(long)]
    low_threshold: Option<BigDecimal>,

    /// Monthly impact below which a month is medium impact.
    #[clap(long)]
    high_threshold: Option<BigDecimal>,

    /// Fraction of impact removed by fully adopting green alternatives.
    #[clap(long)]
    reduction_factor: Option<BigDecimal>,
}

impl Args {
    /// Canonical `ImpactConfig` with every override from the command line applied.
    fn impact_config(&self) -> Result<ImpactConfig, Error> {
        let mut config = ImpactConfig::default();
        for (category, multiplier) in &self.multipliers {
            config
                .multipliers
                .insert(category.clone(), multiplier.clone());
        }
        if let Some(default_multiplier) = &self.default_multiplier {
            config.default_multiplier = default_multiplier.clone();
        }
        if let Some(low) = &self.low_threshold {
            config.tier_thresholds.low = low.clone();
        }
        if let Some(high) = &self.high_threshold {
            config.tier_thresholds.high = high.clone();
        }
        if let Some(reduction_factor) = &self.reduction_factor {
            config.reduction_factor = reduction_factor.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Worker count from the value of `SHOP_IMPACT_WORKER_SPAWNS`, or the cpu count when unset.
fn parse_worker_spawns(value: Option<String>) -> Result<usize, Error> {
    let worker_spawns = match value {
        Some(v) => v.trim().parse::<usize>().map_err(|e| {
            make_input_err!("Could not convert {} env to usize : {}", WORKER_SPAWNS_ENV, e)
        })?,
        None => get_num_cpus(),
    };
    if worker_spawns == 0 || worker_spawns >= MAX_WORKERS {
        return Err(make_input_err!(
            "{} must be between 1 and {}, got {}",
            WORKER_SPAWNS_ENV,
            MAX_WORKERS - 1,
            worker_spawns
        ));
    }
    Ok(worker_spawns)
}

fn worker_spawns() -> Result<usize, Error> {
    parse_worker_spawns(env::var(WORKER_SPAWNS_ENV).ok())
}

/// For the given args will parse the csv file, stream the purchases to the SessionManager and
/// finally write one csv dashboard row per session to the provided `writer`.
/// Note: This is effectively a main() function, but in order to make unit testing easier
/// it is separated.
pub async fn run_with_args(args: Args, writer: impl AsyncWrite + Unpin) -> Result<(), Error> {
    let now = Local::now().naive_local();
    let month = args.month.unwrap_or_else(|| MonthKey::of(&now));
    let config = args.impact_config()?;

    let (session_manager, mut reader) = {
        // Setup and configure our classes and utilities.
        let file = match fs::File::open(&args.purchases_file).await {
            Ok(file) => file,
            Err(e) => {
                return Err(Error::new(
                    ErrorKind::NotFound,
                    format!(
                        "Error, could not open file: '{}', error '{}'",
                        args.purchases_file, e
                    ),
                ));
            }
        };

        let reader = CsvAsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            // Sadly, tokio's AsyncRead and Future's AsyncRead are not compatible, so we use
            // tokio_util::compat library to build our compatibility layer.
            .create_deserializer(file.compat());
        (SessionManager::new(worker_spawns()?, config.clone()), reader)
    };

    let mut session_states = {
        // Process our csv data.
        let mut record_stream = reader.deserialize::<PurchaseRecord>();
        let mut row_number = 1; // Start at 1 because header was in input, but not in record_stream.
        let mut skipped_rows = 0;
        while let Some(record_result) = record_stream.next().await {
            let event = match record_result
                .map_err(Error::from)
                .and_then(|record| record.into_event(now))
            {
                Ok(v) => v,
                Err(err) => {
                    warn!("Could not use line {} due to error {}", row_number, err);
                    row_number += 1;
                    skipped_rows += 1;
                    continue;
                }
            };
            session_manager.process_purchase(event).await?;
            row_number += 1;
        }
        info!(
            "Processed {} purchase rows, skipped {}",
            row_number - 1 - skipped_rows,
            skipped_rows
        );
        session_manager.collect_session_states().await?
    };
    session_states
        .make_contiguous()
        .sort_unstable_by(|a, b| a.session.cmp(&b.session));

    {
        // Print out final output.
        let mut rng = match args.tip_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut history_serializer = match &args.history_file {
            Some(history_file) => {
                let file = fs::File::create(history_file).await.map_err(|e| {
                    Error::new(
                        e.kind(),
                        format!(
                            "Error, could not create file: '{}', error '{}'",
                            history_file, e
                        ),
                    )
                })?;
                Some(CsvAsyncWriterBuilder::new().create_serializer(file.compat_write()))
            }
            None => None,
        };
        let mut serializer = CsvAsyncWriterBuilder::new().create_serializer(writer.compat_write());
        for session_state in &session_states {
            let dashboard = session_state.dashboard(&config, month, args.adoption);
            serializer
                .serialize(ReportRow::new(&dashboard, pick_tip(&mut rng)))
                .await?;
            if let Some(history_serializer) = history_serializer.as_mut() {
                for purchase in &dashboard.history {
                    history_serializer
                        .serialize(HistoryRow::new(dashboard.session, purchase))
                        .await?;
                }
            }
        }
        serializer.flush().await?;
        if let Some(history_serializer) = history_serializer.as_mut() {
            history_serializer.flush().await?;
        }
    }
    Ok(())
}
