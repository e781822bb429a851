use orderflow::logging::{get_current_log_files, init_dual_logging, init_simple_logging, log_system_info};
use orderflow::{OrderflowConfig, OrderflowError, OrderflowPipeline, OrderflowReport, PriceQuantizer, RawTick};
use serde::Serialize;
use std::io;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// One output CSV row: the input columns plus the derived analytics
#[derive(Debug, Serialize)]
struct AnnotatedRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "TradeType")]
    trade_type: u8,
    #[serde(rename = "AskVolume_VP")]
    ask_volume_vp: u64,
    #[serde(rename = "BidVolume_VP")]
    bid_volume_vp: u64,
    #[serde(rename = "POC")]
    poc: Option<f64>,
}

fn usage() -> ! {
    eprintln!("usage: orderflow <ticks.csv> [--summary]");
    eprintln!("  config is read from $ORDERFLOW_CONFIG or ./{}", DEFAULT_CONFIG_PATH);
    std::process::exit(2);
}

fn load_config() -> OrderflowConfig {
    let path = std::env::var("ORDERFLOW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match OrderflowConfig::from_toml(&path) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            eprintln!("Failed to load {}: {}. Using default configuration", path, e);
            OrderflowConfig::default()
        }
    }
}

fn read_ticks(path: &str) -> Result<Vec<RawTick>, Box<dyn std::error::Error + Send + Sync>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut ticks = Vec::new();
    for record in reader.deserialize() {
        ticks.push(record?);
    }
    Ok(ticks)
}

fn write_annotated(report: &OrderflowReport, quantizer: &PriceQuantizer) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    let poc = report.poc.as_ref().filter(|poc| poc.len() == report.profile.len());

    for (i, annotated) in report.profile.iter().enumerate() {
        let tick = &annotated.tick;
        writer.serialize(AnnotatedRow {
            date: tick.date.format("%Y-%m-%d").to_string(),
            time: tick.time.format("%H:%M:%S%.f").to_string(),
            price: quantizer.to_decimal(tick.price),
            volume: tick.volume,
            trade_type: tick.side.discriminator(),
            ask_volume_vp: annotated.ask_volume_so_far,
            bid_volume_vp: annotated.bid_volume_so_far,
            poc: poc.map(|poc| quantizer.to_decimal(poc[i])),
        })?;
    }

    writer.flush()?;
    Ok(())
}

fn report_failure(e: &OrderflowError) {
    if e.is_data_error() {
        error!("Rejected input data: {}", e);
        if matches!(e, OrderflowError::UnsortedInput { .. }) {
            error!("Sort the input by date and time or set processing.ordering = \"repair\"");
        }
    } else {
        error!("Orderflow run failed: {}", e);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = match args.first() {
        Some(path) if !path.starts_with("--") => path.clone(),
        _ => usage(),
    };
    let summary_only = args.iter().skip(1).any(|arg| arg == "--summary");

    let config = load_config();

    let _logging_guard = match config.logging_config() {
        Ok(logging_config) => match init_dual_logging(&logging_config) {
            Ok(guard) => {
                let log_files = get_current_log_files(&logging_config.log_dir);
                info!("Logging to {} ({} files present)", logging_config.log_dir, log_files.len());
                Some(guard)
            }
            Err(e) => {
                eprintln!("Failed to initialize file logging: {}", e);
                init_simple_logging()?;
                None
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            init_simple_logging()?;
            None
        }
    };
    log_system_info();

    let pipeline = OrderflowPipeline::new(config)?;
    info!(
        input = %input,
        increment = pipeline.quantizer().increment(),
        strict_prices = pipeline.quantizer().is_strict(),
        ordering = ?pipeline.config().processing.ordering,
        min_print_volume = pipeline.config().processing.min_print_volume,
        "Starting orderflow run"
    );

    let raw = read_ticks(&input)?;
    let report = match pipeline.normalize(raw).and_then(|ticks| pipeline.run(ticks)) {
        Ok(report) => report,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    if summary_only {
        if report.summaries.is_empty() {
            warn!("No daily summaries available for this configuration");
        }
        serde_json::to_writer_pretty(io::stdout().lock(), &report.summaries)?;
        println!();
    } else {
        write_annotated(&report, pipeline.quantizer())?;
    }

    Ok(())
}
