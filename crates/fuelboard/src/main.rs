//! fuelboard - Fuel expense tracker

mod cli;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};
use fuelboard_core::analytics::{
    aggregate_by_month, generate_report, validate, AnalyticsData, PeriodSelection, Predictions,
    RemotePredictor, TimeFrame,
};
use fuelboard_core::{
    export_entries_to_csv, export_entries_to_json, export_monthly_to_csv, export_monthly_to_json,
    CoreError, EntryStore, FuelType, FuelboardPreferences, HistoryFilter, LocaleId, NewEntry,
    PriceFeed, Region, ReportLocale,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fuelboard",
    version,
    about = "Fuel expense tracker",
    long_about = "Record refueling entries and analyze spend and consumption.\n\
                  \n\
                  Examples:\n\
                    fuelboard add --liters 40 --price 42.5 --odometer 52300\n\
                    fuelboard history --search shell\n\
                    fuelboard report --frame year --year 2024\n\
                    fuelboard monthly --json\n\
                    fuelboard predict --remote\n\
                    fuelboard export entries.csv\n\
                    fuelboard prices --region ankara\n\
                  \n\
                  Environment Variables:\n\
                    FUELBOARD_HOME                   # Override data directory\n\
                    FUELBOARD_LOCALE                 # Report language: tr|en\n\
                    FUELBOARD_NO_COLOR               # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (e.g. fuelboard_core=debug)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Data directory (default: platform data dir + /fuelboard)
    #[arg(long, env = "FUELBOARD_HOME")]
    data_dir: Option<PathBuf>,

    /// Report language (tr|en), overrides preferences
    #[arg(long, env = "FUELBOARD_LOCALE")]
    locale: Option<LocaleId>,

    /// Currency symbol, overrides preferences
    #[arg(long)]
    currency: Option<String>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "FUELBOARD_NO_COLOR")]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Record a refueling
    Add {
        /// Liters filled
        #[arg(long, short = 'l')]
        liters: f64,
        /// Price per liter
        #[arg(long, short = 'p')]
        price: f64,
        /// Odometer reading (default: last recorded reading)
        #[arg(long, short = 'o')]
        odometer: Option<f64>,
        /// Total paid (default: liters x price)
        #[arg(long)]
        total: Option<f64>,
        /// Date: YYYY-MM-DD or "YYYY-MM-DD HH:MM" (default: now)
        #[arg(long, short = 'd')]
        date: Option<String>,
        /// Fuel type: benzin-95, benzin-97, dizel, euro-dizel, lpg or free text
        #[arg(long, short = 'f', default_value = "benzin-95")]
        fuel_type: String,
        /// Station name
        #[arg(long, short = 's', default_value = "")]
        station: String,
        /// Free-text notes
        #[arg(long, short = 'n')]
        notes: Option<String>,
    },
    /// Delete an entry
    Delete {
        /// Entry ID or prefix (min 4 chars)
        id: String,
    },
    /// List entries, most recent first
    History {
        /// Only entries of this fuel type
        #[arg(long, short = 'f')]
        fuel_type: Option<String>,
        /// Search station, notes and date
        #[arg(long, short = 's')]
        search: Option<String>,
        /// Max results
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Spend and consumption summary for a period
    Report {
        /// Time frame: month, year, all (default: from preferences)
        #[arg(long)]
        frame: Option<TimeFrame>,
        /// Month 1-12 (default: current)
        #[arg(long, value_parser = cli::parse_month)]
        month: Option<u32>,
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Output full analytics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check entries for invalid values and unusual consumption
    Validate,
    /// Per-month totals, latest first
    Monthly {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Predict the next refuel
    Predict {
        /// Use the simulated remote estimator (noisy 5-entry average)
        #[arg(long)]
        remote: bool,
        /// Remote estimator delay in milliseconds
        #[arg(long, default_value = "1000", requires = "remote")]
        delay_ms: u64,
    },
    /// Export entries or monthly totals to a file
    Export {
        /// Output file
        path: PathBuf,
        /// Export monthly aggregates instead of entries
        #[arg(long)]
        monthly: bool,
        /// Output format
        #[arg(long, default_value = "csv", value_parser = ["csv", "json"])]
        format: String,
    },
    /// Show current pump prices per grade
    Prices {
        /// Region: Istanbul, Ankara, Izmir, Antalya, Bursa
        #[arg(long, short = 'r', default_value = "Istanbul")]
        region: Region,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Price feed delay in milliseconds
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },
    /// Show or update saved preferences
    Config {
        /// Default report language (tr|en)
        #[arg(long)]
        set_locale: Option<LocaleId>,
        /// Default report time frame
        #[arg(long)]
        set_frame: Option<TimeFrame>,
        /// Default currency symbol
        #[arg(long)]
        set_currency: Option<String>,
    },
}

/// Initialize tracing subscriber (stderr, filtered by RUST_LOG)
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {:#}", err);
        if let Some(hint) = err
            .chain()
            .find_map(|e| e.downcast_ref::<CoreError>())
            .and_then(CoreError::suggestion)
        {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let data_dir = cli
        .data_dir
        .or_else(|| dirs::data_dir().map(|d: PathBuf| d.join("fuelboard")))
        .context("Could not determine data directory")?;

    let prefs = FuelboardPreferences::load(&data_dir);
    let mut locale = match cli.locale {
        Some(id) => ReportLocale::for_id(id),
        None => prefs.report_locale(),
    };
    if let Some(symbol) = cli.currency.or_else(|| prefs.currency_symbol.clone()) {
        locale = locale.with_currency(symbol);
    }

    // Extract flags for command handlers
    let no_color = cli.no_color;

    let store = EntryStore::in_data_dir(&data_dir)?;

    match cli.command {
        Command::Add {
            liters,
            price,
            odometer,
            total,
            date,
            fuel_type,
            station,
            notes,
        } => {
            let date = match date {
                Some(s) => cli::parse_date(&s)?,
                None => Local::now().naive_local(),
            };
            let odometer = odometer
                .or_else(|| store.last_odometer())
                .context("--odometer is required for the first entry")?;

            let entry = store.add_entry(NewEntry {
                date,
                fuel_type: FuelType::parse(&fuel_type),
                liters,
                price_per_liter: price,
                total_amount: total,
                odometer,
                station,
                notes,
            })?;

            println!("Added {} ({})", entry.id, locale.format_date(&entry.date));
            if let Some(consumption) = entry.consumption() {
                println!(
                    "Consumption since last fill: {}",
                    locale.format_consumption(consumption)
                );
            }
        }
        Command::Delete { id } => {
            let entry = store.find_by_id_or_prefix(&id)?;
            store.delete_entry(entry.id.as_str())?;
            println!("Deleted {} ({})", entry.id, locale.format_date(&entry.date));
        }
        Command::History {
            fuel_type,
            search,
            limit,
            json,
        } => run_history(&store, &locale, fuel_type, search, limit, json, no_color),
        Command::Report {
            frame,
            month,
            year,
            json,
        } => {
            let today = Local::now().date_naive();
            let selection = PeriodSelection::new(
                frame.unwrap_or(prefs.default_time_frame),
                month.unwrap_or(today.month()),
                year.unwrap_or(today.year()),
            );
            run_report(&store, &locale, selection, json)?;
        }
        Command::Validate => {
            let issues = validate(&store.snapshot(), &locale);
            if issues.is_empty() {
                println!("No issues found in {} entries", store.len());
            } else {
                for issue in &issues {
                    println!("{}", issue);
                }
                eprintln!("\n{} issues in {} entries", issues.len(), store.len());
            }
        }
        Command::Monthly { json } => {
            let months = aggregate_by_month(&store.snapshot());
            println!(
                "{}",
                cli::format_monthly_table(&months, &locale, json, no_color)
            );
        }
        Command::Predict { remote, delay_ms } => {
            run_predict(&store, &locale, remote, Duration::from_millis(delay_ms)).await;
        }
        Command::Export {
            path,
            monthly,
            format,
        } => run_export(&store, &path, monthly, &format)?,
        Command::Prices {
            region,
            json,
            delay_ms,
        } => {
            run_prices(
                &locale,
                region,
                json,
                no_color,
                Duration::from_millis(delay_ms),
            )
            .await;
        }
        Command::Config {
            set_locale,
            set_frame,
            set_currency,
        } => run_config(&data_dir, prefs, set_locale, set_frame, set_currency)?,
    }

    Ok(())
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

fn run_history(
    store: &EntryStore,
    locale: &ReportLocale,
    fuel_type: Option<String>,
    search: Option<String>,
    limit: usize,
    json: bool,
    no_color: bool,
) {
    let filter = HistoryFilter {
        fuel_type: fuel_type.as_deref().map(FuelType::parse),
        search,
        date_format: locale.date_format.clone(),
    };

    let all = store.history(&filter);
    let results: Vec<_> = all.iter().take(limit).cloned().collect();

    println!("{}", cli::format_entry_table(&results, locale, json, no_color));

    if !json && !results.is_empty() {
        eprintln!("\nShowing {} of {} entries", results.len(), all.len());
    }
}

fn run_report(
    store: &EntryStore,
    locale: &ReportLocale,
    selection: PeriodSelection,
    json: bool,
) -> Result<()> {
    let entries = store.snapshot();

    if json {
        let data = AnalyticsData::compute(&entries, selection, locale);
        println!(
            "{}",
            serde_json::to_string_pretty(&data).context("Failed to serialize analytics")?
        );
        return Ok(());
    }

    let period = selection.apply(&entries);
    println!("{}", selection.display(locale));
    println!("{}", "=".repeat(32));
    println!("{}", generate_report(&period, locale));

    let issues = validate(&period, locale);
    if !issues.is_empty() {
        println!();
        for issue in &issues {
            println!("  - {}", issue);
        }
    }

    Ok(())
}

async fn run_predict(store: &EntryStore, locale: &ReportLocale, remote: bool, delay: Duration) {
    let entries = store.snapshot();

    if !remote {
        let predictions = Predictions::compute(&entries);
        println!("{}", cli::format_sync_predictions(&predictions, locale));
        return;
    }

    let predictor = RemotePredictor::new(delay);
    eprint!("Asking remote estimator... ");
    let (consumption, total_amount) = tokio::join!(
        predictor.predict_consumption(&entries),
        predictor.predict_total_amount(&entries)
    );
    eprintln!("done");

    println!(
        "{}",
        cli::format_predictions(consumption, total_amount, locale)
    );
}

async fn run_prices(
    locale: &ReportLocale,
    region: Region,
    json: bool,
    no_color: bool,
    delay: Duration,
) {
    let feed = PriceFeed::new(delay);

    if !json {
        eprint!("Fetching prices for {}... ", region);
    }
    let prices = feed.fetch_current_prices(region).await;
    if !json {
        eprintln!("done");
    }

    println!("{}", cli::format_price_table(&prices, locale, json, no_color));

    if let (false, Some(first)) = (json, prices.first()) {
        eprintln!("\nLast updated: {}", locale.format_date(&first.date));
    }
}

fn run_export(store: &EntryStore, path: &Path, monthly: bool, format: &str) -> Result<()> {
    let entries = store.snapshot();

    match (monthly, format) {
        (false, "json") => export_entries_to_json(&entries, path)?,
        (false, _) => export_entries_to_csv(&entries, path)?,
        (true, "json") => export_monthly_to_json(&aggregate_by_month(&entries), path)?,
        (true, _) => export_monthly_to_csv(&aggregate_by_month(&entries), path)?,
    }

    println!("Exported to {}", path.display());
    Ok(())
}

fn run_config(
    data_dir: &Path,
    mut prefs: FuelboardPreferences,
    set_locale: Option<LocaleId>,
    set_frame: Option<TimeFrame>,
    set_currency: Option<String>,
) -> Result<()> {
    let changed = set_locale.is_some() || set_frame.is_some() || set_currency.is_some();

    if let Some(locale) = set_locale {
        prefs.locale = locale;
    }
    if let Some(frame) = set_frame {
        prefs.default_time_frame = frame;
    }
    if let Some(symbol) = set_currency {
        prefs.currency_symbol = Some(symbol);
    }

    if changed {
        prefs.save(data_dir)?;
    }

    println!("Data directory: {}", data_dir.display());
    println!("Locale:         {}", prefs.locale.code());
    let locale = prefs.report_locale();
    println!("Time frame:     {}", prefs.default_time_frame.label(&locale));
    println!("Currency:       {}", locale.currency_symbol);

    Ok(())
}
