//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use crate::adapters::csv_feed::{CsvMarketFeed, DEFAULT_BAR_LIMIT};
use crate::adapters::csv_predictor::CsvPredictor;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::paper_gateway::{PaperConfig, PaperGateway};
use crate::domain::config_validation::{
    parse_pair_map, parse_pairs, parse_triple, validate_config,
};
use crate::domain::controller::{
    CycleReport, CycleStatus, PerformanceSummary, TradingCycleController,
};
use crate::domain::error::TraderError;
use crate::domain::ladder::{OrderInstruction, OrderLadderBuilder};
use crate::domain::risk::RiskParameters;
use crate::domain::signal::Signal;
use crate::domain::sizing::PositionSizer;
use crate::domain::snapshot::IndicatorWindows;
use crate::ports::config_port::ConfigPort;
use crate::ports::predictor_port::{NoPredictor, Predictor};

#[derive(Parser, Debug)]
#[command(name = "ladderbot", about = "Risk-managed crypto trading bot")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run trading cycles on a fixed interval until halted
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Stop after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,
    },
    /// Run a single trading cycle
    Cycle {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Preview the exit ladder for a hypothetical entry
    Ladder {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        pair: String,
        #[arg(long)]
        entry: f64,
        #[arg(long, value_enum)]
        side: SideArg,
        #[arg(long)]
        quantity: f64,
        /// Defaults to entry * default_atr_fraction
        #[arg(long)]
        atr: Option<f64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SideArg {
    Buy,
    Sell,
}

impl From<SideArg> for Signal {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Buy => Signal::Buy,
            SideArg::Sell => Signal::Sell,
        }
    }
}

/// `[trading]` section, typed.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingSettings {
    pub pairs: Vec<String>,
    pub data_dir: PathBuf,
    pub predictions: Option<PathBuf>,
    pub bar_limit: usize,
    pub cycle_interval_secs: u64,
}

pub type PaperController = TradingCycleController<CsvMarketFeed, Box<dyn Predictor>, PaperGateway>;

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config, max_cycles } => run_loop(&config, max_cycles),
        Command::Cycle { config } => run_loop(&config, Some(1)),
        Command::Validate { config } => run_validate(&config),
        Command::Ladder {
            config,
            pair,
            entry,
            side,
            quantity,
            atr,
        } => run_ladder(&config, &pair, entry, side, quantity, atr),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_trading_settings(config: &dyn ConfigPort) -> Result<TradingSettings, TraderError> {
    let pairs = parse_pairs(config)?;
    let data_dir = config
        .get_string("trading", "data_dir")
        .ok_or_else(|| TraderError::ConfigMissing {
            section: "trading".into(),
            key: "data_dir".into(),
        })?;

    let bar_limit = usize::try_from(config.get_int(
        "trading",
        "bar_limit",
        DEFAULT_BAR_LIMIT as i64,
    )?)
    .ok()
    .filter(|n| *n > 0)
    .ok_or_else(|| TraderError::ConfigInvalid {
        section: "trading".into(),
        key: "bar_limit".into(),
        reason: "bar_limit must be at least 1".into(),
    })?;

    let cycle_interval_secs = u64::try_from(config.get_int("trading", "cycle_interval_secs", 3600)?)
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| TraderError::ConfigInvalid {
            section: "trading".into(),
            key: "cycle_interval_secs".into(),
            reason: "cycle_interval_secs must be at least 1".into(),
        })?;

    Ok(TradingSettings {
        pairs,
        data_dir: PathBuf::from(data_dir),
        predictions: config.get_string("trading", "predictions").map(PathBuf::from),
        bar_limit,
        cycle_interval_secs,
    })
}

pub fn build_risk_parameters(config: &dyn ConfigPort) -> Result<RiskParameters, TraderError> {
    let defaults = RiskParameters::default();
    Ok(RiskParameters {
        max_daily_loss: config.get_double("risk", "max_daily_loss", defaults.max_daily_loss)?,
        take_profit_tiers: parse_triple(
            config,
            "risk",
            "take_profit_tiers",
            defaults.take_profit_tiers,
        )?,
        take_profit_split: parse_triple(
            config,
            "risk",
            "take_profit_split",
            defaults.take_profit_split,
        )?,
        stop_limit_offset: config.get_double(
            "risk",
            "stop_limit_offset",
            defaults.stop_limit_offset,
        )?,
        default_atr_fraction: config.get_double(
            "risk",
            "default_atr_fraction",
            defaults.default_atr_fraction,
        )?,
        allocations: parse_pair_map(config, "allocations")?,
        volatility_multipliers: parse_pair_map(config, "volatility_multipliers")?,
    })
}

pub fn build_indicator_windows(config: &dyn ConfigPort) -> Result<IndicatorWindows, TraderError> {
    let defaults = IndicatorWindows::default();
    let window = |key: &str, default: usize| -> Result<usize, TraderError> {
        usize::try_from(config.get_int("indicators", key, default as i64)?)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| TraderError::ConfigInvalid {
                section: "indicators".into(),
                key: key.into(),
                reason: "window must be at least 1".into(),
            })
    };

    Ok(IndicatorWindows {
        fast_ema: window("fast_ema", defaults.fast_ema)?,
        slow_ema: window("slow_ema", defaults.slow_ema)?,
        adx_period: window("adx_period", defaults.adx_period)?,
        atr_period: window("atr_period", defaults.atr_period)?,
        trend_threshold: config.get_double(
            "indicators",
            "trend_threshold",
            defaults.trend_threshold,
        )?,
    })
}

pub fn build_paper_config(config: &dyn ConfigPort) -> Result<PaperConfig, TraderError> {
    let defaults = PaperConfig::default();
    Ok(PaperConfig {
        balance: config.get_double("paper", "balance", defaults.balance)?,
        fee_pct: config.get_double("paper", "fee_pct", defaults.fee_pct)?,
        min_quantity: config.get_double("paper", "min_quantity", defaults.min_quantity)?,
    })
}

/// Wire the CSV feed, the optional predictions file and the paper gateway
/// into a controller.
pub fn build_controller(config: &dyn ConfigPort) -> Result<PaperController, TraderError> {
    validate_config(config)?;
    let settings = build_trading_settings(config)?;
    let params = build_risk_parameters(config)?;
    let windows = build_indicator_windows(config)?;

    let feed = CsvMarketFeed::new(settings.data_dir.clone(), settings.bar_limit, windows.clone());
    let predictor: Box<dyn Predictor> = match &settings.predictions {
        Some(path) => Box::new(CsvPredictor::from_file(path)?),
        None => Box::new(NoPredictor),
    };
    let mut gateway = PaperGateway::new(build_paper_config(config)?);
    if let Some(journal) = config.get_string("paper", "journal") {
        gateway = gateway.with_journal(journal)?;
    }

    TradingCycleController::new(&settings.pairs, params, windows, feed, predictor, gateway)
}

fn run_loop(config_path: &PathBuf, max_cycles: Option<u64>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let settings = match build_trading_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let mut controller = match build_controller(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Trading {} pairs, starting balance {:.2}",
        controller.pairs().len(),
        controller.account().balance
    );
    let interval = Duration::from_secs(settings.cycle_interval_secs);

    loop {
        let report = match controller.run_cycle() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        print_report(&report);
        print_performance(&controller.performance());

        if report.status == CycleStatus::Halted {
            eprintln!("Trading halted: daily loss limit reached");
            return ExitCode::SUCCESS;
        }
        if max_cycles.is_some_and(|max| controller.cycles_run() >= max) {
            return ExitCode::SUCCESS;
        }
        thread::sleep(interval);
    }
}

pub fn print_report(report: &CycleReport) {
    println!("Cycle {}", report.cycle);
    for (pair, outcome) in &report.outcomes {
        println!("  {:<12} {}", pair, outcome);
    }
}

pub fn print_performance(summary: &PerformanceSummary) {
    println!(
        "Balance: {:.2} (start {:.2}), daily return: {:.2}%",
        summary.balance,
        summary.initial_balance,
        summary.daily_return * 100.0
    );
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = validate_config(&adapter)
        .and_then(|_| build_trading_settings(&adapter))
        .and_then(|settings| {
            let params = build_risk_parameters(&adapter)?;
            let pairs = params.validate_pairs(&settings.pairs)?;
            let windows = build_indicator_windows(&adapter)?;
            Ok((params, pairs, windows))
        });

    let (params, pairs, windows) = match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nPairs:");
    for pair in &pairs {
        eprintln!(
            "  {:<12} allocation {:>5.1}%  volatility x{}",
            pair.symbol,
            pair.allocation * 100.0,
            pair.volatility_multiplier
        );
    }
    eprintln!("\nRisk:");
    eprintln!("  max_daily_loss:    {:.2}%", params.max_daily_loss * 100.0);
    eprintln!("  take_profit_tiers: {:?}", params.take_profit_tiers);
    eprintln!("  take_profit_split: {:?}", params.take_profit_split);
    eprintln!("\nIndicators:");
    eprintln!(
        "  EMA({}) / EMA({}), ADX({}) > {}, ATR({})",
        windows.fast_ema,
        windows.slow_ema,
        windows.adx_period,
        windows.trend_threshold,
        windows.atr_period
    );
    eprintln!("  minimum bars: {}", windows.required_bars());

    eprintln!("\nConfiguration is valid");
    ExitCode::SUCCESS
}

fn run_ladder(
    config_path: &PathBuf,
    pair: &str,
    entry: f64,
    side: SideArg,
    quantity: f64,
    atr: Option<f64>,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let params = match build_risk_parameters(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let pair = pair.to_uppercase();
    let atr = atr.unwrap_or_else(|| params.fallback_atr(entry));
    let ladder = PositionSizer::new(&params)
        .stop_loss(entry, atr, &pair)
        .and_then(|stop| {
            OrderLadderBuilder::from_params(&params).build(
                &pair,
                entry,
                side.into(),
                quantity,
                stop,
            )
        });

    let ladder = match ladder {
        Ok(l) => l,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!(
        "{} {} {} @ {}",
        ladder.pair, ladder.entry_side, ladder.quantity, ladder.entry_price
    );
    for instruction in ladder.instructions() {
        match instruction {
            OrderInstruction::Oco {
                side,
                quantity,
                take_profit_price,
                stop_price,
                stop_limit_price,
            } => println!(
                "  OCO   {side} {quantity} tp {take_profit_price:.8} stop {stop_price:.8} limit {stop_limit_price:.8}"
            ),
            OrderInstruction::Limit {
                side,
                quantity,
                price,
            } => println!("  LIMIT {side} {quantity} @ {price:.8}"),
        }
    }
    ExitCode::SUCCESS
}
