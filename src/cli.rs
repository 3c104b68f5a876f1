//! CLI definition and dispatch.

use chrono::Utc;
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_journal_adapter::JsonJournalAdapter;
#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_journal_adapter::SqliteJournalAdapter;
use crate::domain::config_validation::{
    account_balance, default_indicators, generator_config, generator_seed, journal_settings,
    JournalBackend, JournalSettings,
};
use crate::domain::error::AlphamindError;
use crate::domain::heikin_ashi::convert_to_heikin_ashi;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::instrument::{Symbol, Timeframe};
use crate::domain::journal::{export_json, import_into, JournalStats, JournalUpdate};
use crate::domain::market_data::MarketContext;
use crate::domain::ohlcv::Candle;
use crate::domain::trade::{
    execute_trade, position_size, required_margin, risk_reward, Side, TradeParams,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::journal_port::JournalPort;

#[derive(Parser, Debug)]
#[command(
    name = "alphamind",
    about = "FX indicators, Heikin-Ashi and simulated market data"
)]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a synthetic candle history as CSV
    Generate {
        #[arg(short, long)]
        symbol: Symbol,
        #[arg(short, long, default_value = "1h")]
        timeframe: Timeframe,
        /// Number of bars; defaults to [generator] history_count
        #[arg(short = 'n', long)]
        count: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute indicators over a candle CSV
    Indicators {
        #[arg(short, long)]
        input: PathBuf,
        /// Indicator spec such as SMA(20) or MACD(12,26,9); repeatable.
        /// Defaults to [indicators] default
        #[arg(long = "indicator")]
        indicators: Vec<String>,
    },
    /// Convert a candle CSV to Heikin-Ashi candles
    HeikinAshi {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Generate a history, then stream live feed ticks over it
    Simulate {
        #[arg(short, long)]
        symbol: Symbol,
        #[arg(short, long, default_value = "1m")]
        timeframe: Timeframe,
        #[arg(long)]
        history: Option<usize>,
        #[arg(long, default_value_t = 20)]
        ticks: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Risk-based position size for a stop distance
    Size {
        #[arg(short, long)]
        symbol: Symbol,
        /// Percent of balance to risk
        #[arg(long)]
        risk: f64,
        #[arg(long)]
        stop_pips: f64,
        /// Defaults to [account] balance
        #[arg(long)]
        balance: Option<f64>,
    },
    /// Trade journal operations
    Journal {
        /// Journal location, overriding [journal] path
        #[arg(short, long)]
        journal: Option<PathBuf>,
        #[command(subcommand)]
        action: JournalAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum JournalAction {
    /// Summary statistics over closed trades
    Stats,
    /// List all entries
    List,
    /// Write the journal as a JSON array
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the journal with a JSON array export
    Import {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Open a mock trade at the simulated price and record it
    Trade {
        #[arg(short, long)]
        symbol: Symbol,
        #[arg(long)]
        side: Side,
        #[arg(long)]
        lots: f64,
        #[arg(long)]
        stop_loss: Option<f64>,
        #[arg(long)]
        take_profit: Option<f64>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Close an open entry at an exit price
    Close {
        id: String,
        #[arg(long)]
        exit_price: f64,
    },
    /// Remove an entry
    Delete { id: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Command::Generate {
            symbol,
            timeframe,
            count,
            seed,
            output,
        } => run_generate(&config, symbol, timeframe, count, seed, output.as_deref()),
        Command::Indicators { input, indicators } => run_indicators(&config, &input, &indicators),
        Command::HeikinAshi { input } => run_heikin_ashi(&input),
        Command::Simulate {
            symbol,
            timeframe,
            history,
            ticks,
            seed,
        } => run_simulate(&config, symbol, timeframe, history, ticks, seed),
        Command::Size {
            symbol,
            risk,
            stop_pips,
            balance,
        } => run_size(&config, symbol, risk, stop_pips, balance),
        Command::Journal { journal, action } => run_journal(&config, journal.as_deref(), action),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, AlphamindError> {
    match path {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn market_context(
    config: &dyn ConfigPort,
    seed_override: Option<u64>,
) -> Result<MarketContext, AlphamindError> {
    let generator = generator_config(config)?;
    let seed = match seed_override {
        Some(seed) => Some(seed),
        None => generator_seed(config)?,
    };
    Ok(match seed {
        Some(seed) => MarketContext::with_seed(generator, seed),
        None => MarketContext::new(generator),
    })
}

/// Loads a candle CSV from exactly the path given.
fn load_candles(input: &Path) -> Result<Vec<Candle>, AlphamindError> {
    let file = fs::File::open(input).map_err(|e| AlphamindError::Data {
        reason: format!("failed to read {}: {}", input.display(), e),
    })?;
    let candles = csv_adapter::read_candles(file)?;
    if candles.is_empty() {
        log::warn!("{} contains no candles", input.display());
    }
    Ok(candles)
}

fn csv_err(e: csv::Error) -> AlphamindError {
    AlphamindError::Data {
        reason: format!("CSV write error: {}", e),
    }
}

fn run_generate(
    config: &dyn ConfigPort,
    symbol: Symbol,
    timeframe: Timeframe,
    count: Option<usize>,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<(), AlphamindError> {
    let mut ctx = market_context(config, seed)?;
    let count = count.unwrap_or(ctx.config().history_count);
    let candles = ctx.generate_historical(symbol, timeframe, count, Utc::now());
    log::info!("generated {} {} {} candles", candles.len(), symbol, timeframe);

    match output {
        Some(path) => csv_adapter::write_candles(fs::File::create(path)?, &candles),
        None => csv_adapter::write_candles(io::stdout().lock(), &candles),
    }
}

fn parse_indicator(spec: &str) -> Result<IndicatorType, AlphamindError> {
    spec.parse::<IndicatorType>().map_err(|e| {
        eprintln!("{}", e.display_with_context(spec));
        AlphamindError::IndicatorParse(e)
    })
}

fn run_indicators(
    config: &dyn ConfigPort,
    input: &Path,
    specs: &[String],
) -> Result<(), AlphamindError> {
    let requested = if specs.is_empty() {
        default_indicators(config)?
    } else {
        specs
            .iter()
            .map(|s| parse_indicator(s))
            .collect::<Result<Vec<_>, _>>()?
    };

    let candles = load_candles(input)?;
    let outputs = compute_indicators(&candles, &requested);

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["time", "indicator", "component", "value", "color"])
        .map_err(csv_err)?;

    let mut seen = Vec::new();
    for indicator in &requested {
        if seen.contains(indicator) {
            continue;
        }
        seen.push(indicator.clone());

        let Some(output) = outputs.get(indicator) else {
            continue;
        };
        if output.is_empty() {
            log::warn!("{} needs more than {} candles", indicator, candles.len());
        }
        let name = indicator.to_string();
        for row in output.rows() {
            wtr.write_record([
                row.time.to_string(),
                name.clone(),
                row.component.to_string(),
                row.value.to_string(),
                row.color.map(|c| c.hex().to_string()).unwrap_or_default(),
            ])
            .map_err(csv_err)?;
        }
    }
    wtr.flush()?;
    Ok(())
}

fn run_heikin_ashi(input: &Path) -> Result<(), AlphamindError> {
    let candles = load_candles(input)?;
    let ha = convert_to_heikin_ashi(&candles);

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record([
        "time",
        "open",
        "high",
        "low",
        "close",
        "bullish",
        "strong_trend",
    ])
    .map_err(csv_err)?;
    for c in &ha {
        wtr.write_record([
            c.time.to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.is_bullish().to_string(),
            c.has_strong_trend().to_string(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_simulate(
    config: &dyn ConfigPort,
    symbol: Symbol,
    timeframe: Timeframe,
    history: Option<usize>,
    ticks: usize,
    seed: Option<u64>,
) -> Result<(), AlphamindError> {
    let mut ctx = market_context(config, seed)?;
    let history = history.unwrap_or(ctx.config().history_count);
    let mut series = ctx.generate_historical(symbol, timeframe, history, Utc::now());
    log::info!("simulating {} ticks on {} {}", ticks, symbol, timeframe);

    let mut wtr = csv::Writer::from_writer(io::stdout().lock());
    wtr.write_record(["event", "time", "open", "high", "low", "close", "volume"])
        .map_err(csv_err)?;

    for _ in 0..ticks {
        let Some(last) = series.last().copied() else {
            log::warn!("no history to tick from");
            break;
        };
        let update = ctx.tick(symbol, &last, timeframe);
        update.apply_to(&mut series);

        let c = update.candle();
        let event = if update.is_new_candle() { "new" } else { "update" };
        wtr.write_record([
            event.to_string(),
            c.time.to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    drop(wtr);

    let quote = ctx.bid_ask(symbol);
    println!(
        "{} bid {} ask {} spread {}",
        symbol, quote.bid, quote.ask, quote.spread
    );
    Ok(())
}

fn run_size(
    config: &dyn ConfigPort,
    symbol: Symbol,
    risk: f64,
    stop_pips: f64,
    balance: Option<f64>,
) -> Result<(), AlphamindError> {
    let balance = match balance {
        Some(b) => b,
        None => account_balance(config)?,
    };
    let lots = position_size(symbol, risk, balance, stop_pips);
    let margin = required_margin(lots, symbol.base_rate());
    println!("lots: {:.2}", lots);
    println!("margin at {}: {:.2}", symbol.base_rate(), margin);
    Ok(())
}

fn open_journal(
    settings: &JournalSettings,
    path_override: Option<&Path>,
) -> Result<Box<dyn JournalPort>, AlphamindError> {
    let path = match path_override {
        Some(p) => p.to_string_lossy().into_owned(),
        None => settings.path.clone(),
    };
    log::debug!("opening {:?} journal at {}", settings.backend, path);

    match settings.backend {
        JournalBackend::Json => Ok(Box::new(JsonJournalAdapter::new(path))),
        #[cfg(feature = "sqlite")]
        JournalBackend::Sqlite => Ok(Box::new(SqliteJournalAdapter::open(
            &path,
            settings.pool_size,
        )?)),
        #[cfg(not(feature = "sqlite"))]
        JournalBackend::Sqlite => Err(AlphamindError::ConfigInvalid {
            section: "journal".into(),
            key: "backend".into(),
            reason: "sqlite support was not compiled in".into(),
        }),
    }
}

fn run_journal(
    config: &dyn ConfigPort,
    path_override: Option<&Path>,
    action: JournalAction,
) -> Result<(), AlphamindError> {
    let settings = journal_settings(config)?;
    let journal = open_journal(&settings, path_override)?;

    match action {
        JournalAction::Stats => print_stats(&JournalStats::compute(&journal.entries()?)),
        JournalAction::List => list_entries(journal.as_ref())?,
        JournalAction::Export { output } => {
            let body = export_json(&journal.entries()?)?;
            match output {
                Some(path) => fs::write(path, body)?,
                None => println!("{}", body),
            }
        }
        JournalAction::Import { input } => {
            let data = fs::read_to_string(&input)?;
            let count = import_into(journal.as_ref(), &data)?;
            println!("imported {} entries", count);
        }
        JournalAction::Trade {
            symbol,
            side,
            lots,
            stop_loss,
            take_profit,
            seed,
        } => {
            let balance = account_balance(config)?;
            let mut ctx = market_context(config, seed)?;
            let now = Utc::now();
            // warm the price up to where a loaded chart would leave it
            let history = ctx.config().history_count;
            ctx.generate_historical(symbol, Timeframe::H1, history, now);

            let params = TradeParams {
                symbol,
                side,
                lot_size: lots,
                stop_loss,
                take_profit,
            };
            let trade = execute_trade(&mut ctx, &params, balance, journal.as_ref(), now)?;
            println!("{}", trade.id);
            println!(
                "{} {} {} lots at {}",
                trade.side,
                trade.symbol,
                trade.lot_size,
                trade.symbol.round_price(trade.entry_price)
            );
            if let (Some(sl), Some(tp)) = (trade.stop_loss, trade.take_profit) {
                println!(
                    "risk/reward: {:.2}",
                    risk_reward(trade.entry_price, sl, tp)
                );
            }
        }
        JournalAction::Close { id, exit_price } => {
            let entry = journal.find(&id)?.ok_or_else(|| AlphamindError::Journal {
                reason: format!("no journal entry with id {}", id),
            })?;
            let update = JournalUpdate::close(&entry, exit_price, Utc::now());
            journal.update(&id, &update)?;
            println!(
                "closed {} profit {:.2} pips {}",
                id,
                update.profit.unwrap_or_default(),
                update.pips.unwrap_or_default()
            );
        }
        JournalAction::Delete { id } => {
            if journal.delete(&id)? {
                println!("deleted {}", id);
            } else {
                log::warn!("no journal entry with id {}", id);
            }
        }
    }
    Ok(())
}

fn print_stats(stats: &JournalStats) {
    println!("total_trades: {}", stats.total_trades);
    println!("winning_trades: {}", stats.winning_trades);
    println!("losing_trades: {}", stats.losing_trades);
    println!("win_rate: {:.2}", stats.win_rate);
    println!("total_profit: {:.2}", stats.total_profit);
    println!("avg_win: {:.2}", stats.avg_win);
    println!("avg_loss: {:.2}", stats.avg_loss);
    println!("profit_factor: {:.2}", stats.profit_factor);
    println!("largest_win: {:.2}", stats.largest_win);
    println!("largest_loss: {:.2}", stats.largest_loss);
}

fn list_entries(journal: &dyn JournalPort) -> Result<(), AlphamindError> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "id,date,symbol,type,lot_size,entry_price,exit_price,profit,status"
    )?;
    for e in journal.entries()? {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{}",
            e.id,
            e.date,
            e.symbol,
            e.side,
            e.lot_size,
            e.entry_price,
            e.exit_price.map(|v| v.to_string()).unwrap_or_default(),
            e.profit.map(|v| v.to_string()).unwrap_or_default(),
            e.status
        )?;
    }
    Ok(())
}
