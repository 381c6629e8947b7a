//! Configuration validation.
//!
//! Validates every config section before any component is constructed.

use std::collections::{HashMap, HashSet};

use crate::domain::error::TraderError;
use crate::domain::risk::FRACTION_EPSILON;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_trading_config(config)?;
    validate_risk_config(config)?;
    validate_indicator_config(config)?;
    validate_paper_config(config)?;
    Ok(())
}

pub fn validate_trading_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    parse_pairs(config)?;
    if config.get_string("trading", "data_dir").is_none() {
        return Err(missing("trading", "data_dir"));
    }
    if config.get_int("trading", "bar_limit", 500)? < 1 {
        return Err(invalid("trading", "bar_limit", "bar_limit must be at least 1"));
    }
    if config.get_int("trading", "cycle_interval_secs", 3600)? < 1 {
        return Err(invalid(
            "trading",
            "cycle_interval_secs",
            "cycle_interval_secs must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let max_loss = config.get_double("risk", "max_daily_loss", -0.05)?;
    if max_loss >= 0.0 || max_loss <= -1.0 {
        return Err(invalid(
            "risk",
            "max_daily_loss",
            "max_daily_loss must be between -1 and 0",
        ));
    }

    let tiers = parse_triple(config, "risk", "take_profit_tiers", [0.02, 0.05, 0.10])?;
    if tiers.iter().any(|t| *t <= 0.0) {
        return Err(invalid(
            "risk",
            "take_profit_tiers",
            "take_profit_tiers must all be positive",
        ));
    }

    let split = parse_triple(config, "risk", "take_profit_split", [0.5, 0.25, 0.25])?;
    if split.iter().any(|f| *f <= 0.0) {
        return Err(invalid(
            "risk",
            "take_profit_split",
            "take_profit_split must all be positive",
        ));
    }
    if (split.iter().sum::<f64>() - 1.0).abs() > FRACTION_EPSILON {
        return Err(invalid(
            "risk",
            "take_profit_split",
            "take_profit_split must sum to 1",
        ));
    }

    let offset = config.get_double("risk", "stop_limit_offset", 0.02)?;
    if !(0.0..1.0).contains(&offset) {
        return Err(invalid(
            "risk",
            "stop_limit_offset",
            "stop_limit_offset must be in [0, 1)",
        ));
    }

    if config.get_double("risk", "default_atr_fraction", 0.02)? <= 0.0 {
        return Err(invalid(
            "risk",
            "default_atr_fraction",
            "default_atr_fraction must be positive",
        ));
    }

    let pairs = parse_pairs(config)?;
    for section in ["allocations", "volatility_multipliers"] {
        let values = parse_pair_map(config, section)?;
        for pair in &pairs {
            let value = values.get(pair).ok_or_else(|| missing(section, pair))?;
            if *value <= 0.0 {
                return Err(invalid(section, pair, "value must be positive"));
            }
        }
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    for (key, default) in [
        ("fast_ema", 50),
        ("slow_ema", 200),
        ("adx_period", 14),
        ("atr_period", 14),
    ] {
        if config.get_int("indicators", key, default)? < 1 {
            return Err(invalid("indicators", key, "window must be at least 1"));
        }
    }
    let fast = config.get_int("indicators", "fast_ema", 50)?;
    let slow = config.get_int("indicators", "slow_ema", 200)?;
    if fast >= slow {
        return Err(invalid(
            "indicators",
            "fast_ema",
            "fast_ema must be shorter than slow_ema",
        ));
    }
    if config.get_double("indicators", "trend_threshold", 25.0)? < 0.0 {
        return Err(invalid(
            "indicators",
            "trend_threshold",
            "trend_threshold must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_paper_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if config.get_double("paper", "balance", 10_000.0)? <= 0.0 {
        return Err(invalid("paper", "balance", "balance must be positive"));
    }
    if config.get_double("paper", "fee_pct", 0.1)? < 0.0 {
        return Err(invalid("paper", "fee_pct", "fee_pct must be non-negative"));
    }
    if config.get_double("paper", "min_quantity", 0.0)? < 0.0 {
        return Err(invalid(
            "paper",
            "min_quantity",
            "min_quantity must be non-negative",
        ));
    }
    Ok(())
}

/// Upper-cased, de-duplicated pair list from `[trading] pairs`.
pub fn parse_pairs(config: &dyn ConfigPort) -> Result<Vec<String>, TraderError> {
    let raw = config
        .get_list("trading", "pairs")
        .ok_or_else(|| missing("trading", "pairs"))?;
    if raw.is_empty() {
        return Err(missing("trading", "pairs"));
    }

    let mut seen = HashSet::new();
    let mut pairs = Vec::with_capacity(raw.len());
    for item in raw {
        let pair = item.to_uppercase();
        if !seen.insert(pair.clone()) {
            return Err(invalid(
                "trading",
                "pairs",
                &format!("duplicate pair: {pair}"),
            ));
        }
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Per-pair numbers from `section`, keyed by upper-cased symbol.
///
/// Keys that differ only by case are rejected.
pub fn parse_pair_map(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<HashMap<String, f64>, TraderError> {
    let mut values = HashMap::new();
    for key in config.keys(section) {
        let value = config.get_double(section, &key, 0.0)?;
        if values.insert(key.to_uppercase(), value).is_some() {
            return Err(invalid(
                section,
                &key,
                &format!("duplicate key: {}", key.to_uppercase()),
            ));
        }
    }
    Ok(values)
}

/// Three comma-separated numbers, or `default` when the key is absent.
pub fn parse_triple(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: [f64; 3],
) -> Result<[f64; 3], TraderError> {
    let Some(items) = config.get_list(section, key) else {
        return Ok(default);
    };
    if items.len() != 3 {
        return Err(invalid(
            section,
            key,
            &format!("expected 3 values, got {}", items.len()),
        ));
    }
    let mut out = [0.0; 3];
    for (slot, item) in out.iter_mut().zip(&items) {
        *slot = item
            .parse()
            .map_err(|_| invalid(section, key, &format!("invalid number: {item}")))?;
    }
    Ok(out)
}

fn missing(section: &str, key: &str) -> TraderError {
    TraderError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
