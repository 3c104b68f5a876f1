//! Technical indicator implementations.
//!
//! This module provides types for representing indicator output:
//! - `SeriesPoint`: A single `{time, value}` point in a derived series
//! - `HistogramPoint`: A series point tagged with a rendering colour
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A single-line derived series
//!
//! Every calculator is total: undersized input or a zero period yields an
//! empty series, never a panic. Output only starts once a full window of
//! history exists, so derived series are shorter than their input.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;

pub use atr::{calculate_atr, calculate_atr_wilder};
pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::{calculate_ema, ema_of_points};
pub use macd::{calculate_macd, calculate_macd_default, MacdOutput};
pub use rsi::{calculate_rsi, calculate_rsi_wilder};
pub use sma::{calculate_sma, sma_of_points};
pub use stochastic::{calculate_stochastic, StochasticOutput};

use crate::domain::error::ParseError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time: i64,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistogramColor {
    Positive,
    Negative,
}

impl HistogramColor {
    /// Zero counts as positive.
    pub fn for_value(value: f64) -> Self {
        if value >= 0.0 {
            HistogramColor::Positive
        } else {
            HistogramColor::Negative
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            HistogramColor::Positive => "#10B981",
            HistogramColor::Negative => "#EF4444",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramPoint {
    pub time: i64,
    pub value: f64,
    pub color: HistogramColor,
}

impl HistogramPoint {
    pub fn new(time: i64, value: f64) -> Self {
        Self {
            time,
            value,
            color: HistogramColor::for_value(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    RsiWilder(usize),
    Atr(usize),
    AtrWilder(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
    Stochastic {
        period: usize,
        smooth_k: usize,
        smooth_d: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<SeriesPoint>,
}

impl IndicatorSeries {
    pub fn empty(indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::RsiWilder(period) => write!(f, "RSI_WILDER({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::AtrWilder(period) => write!(f, "ATR_WILDER({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
            IndicatorType::Stochastic {
                period,
                smooth_k,
                smooth_d,
            } => write!(f, "STOCHASTIC({},{},{})", period, smooth_k, smooth_d),
        }
    }
}

/// A single argument token and its byte offset in the original input.
struct Arg<'a> {
    text: &'a str,
    position: usize,
}

fn split_args(args: &str, offset: usize) -> Vec<Arg<'_>> {
    if args.trim().is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut start = 0;
    for piece in args.split(',') {
        let lead = piece.len() - piece.trim_start().len();
        out.push(Arg {
            text: piece.trim(),
            position: offset + start + lead,
        });
        start += piece.len() + 1;
    }
    out
}

fn parse_period(arg: &Arg<'_>) -> Result<usize, ParseError> {
    match arg.text.parse::<usize>() {
        Ok(p) if p > 0 => Ok(p),
        _ => Err(ParseError::new(
            format!("expected positive integer period, found '{}'", arg.text),
            arg.position,
        )),
    }
}

fn parse_multiplier(arg: &Arg<'_>) -> Result<u32, ParseError> {
    match arg.text.parse::<f64>() {
        Ok(m) if m.is_finite() && m >= 0.0 => Ok((m * 100.0).round() as u32),
        _ => Err(ParseError::new(
            format!("expected non-negative multiplier, found '{}'", arg.text),
            arg.position,
        )),
    }
}

impl FromStr for IndicatorType {
    type Err = ParseError;

    /// Parses the canonical form produced by `Display`, case-insensitively.
    /// Indicators with default parameters may omit their argument list.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lead = input.len() - input.trim_start().len();
        let s = input.trim();
        if s.is_empty() {
            return Err(ParseError::new("empty indicator spec", 0));
        }

        let (name, args, args_pos) = match s.find('(') {
            Some(open) => {
                if !s.ends_with(')') {
                    return Err(ParseError::new("expected ')'", lead + s.len()));
                }
                (&s[..open], &s[open + 1..s.len() - 1], lead + open + 1)
            }
            None => (s, "", lead + s.len()),
        };

        let args = split_args(args, args_pos);
        let arity_error = |expected: &str| {
            ParseError::new(
                format!("{} expects {} argument(s), got {}", name.trim(), expected, args.len()),
                args_pos,
            )
        };

        match name.trim().to_ascii_uppercase().as_str() {
            kind @ ("SMA" | "EMA") => {
                let [period] = args.as_slice() else {
                    return Err(arity_error("1"));
                };
                let period = parse_period(period)?;
                if kind == "SMA" {
                    Ok(IndicatorType::Sma(period))
                } else {
                    Ok(IndicatorType::Ema(period))
                }
            }
            kind @ ("RSI" | "RSI_WILDER" | "ATR" | "ATR_WILDER") => {
                let default = if kind.starts_with("RSI") {
                    rsi::DEFAULT_PERIOD
                } else {
                    atr::DEFAULT_PERIOD
                };
                let period = match args.as_slice() {
                    [] => default,
                    [period] => parse_period(period)?,
                    _ => return Err(arity_error("0 or 1")),
                };
                Ok(match kind {
                    "RSI" => IndicatorType::Rsi(period),
                    "RSI_WILDER" => IndicatorType::RsiWilder(period),
                    "ATR" => IndicatorType::Atr(period),
                    _ => IndicatorType::AtrWilder(period),
                })
            }
            "MACD" => match args.as_slice() {
                [] => Ok(IndicatorType::Macd {
                    fast: macd::DEFAULT_FAST,
                    slow: macd::DEFAULT_SLOW,
                    signal: macd::DEFAULT_SIGNAL,
                }),
                [fast, slow, signal] => Ok(IndicatorType::Macd {
                    fast: parse_period(fast)?,
                    slow: parse_period(slow)?,
                    signal: parse_period(signal)?,
                }),
                _ => Err(arity_error("0 or 3")),
            },
            "BOLLINGER" | "BB" => match args.as_slice() {
                [] => Ok(IndicatorType::Bollinger {
                    period: bollinger::DEFAULT_PERIOD,
                    stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
                }),
                [period] => Ok(IndicatorType::Bollinger {
                    period: parse_period(period)?,
                    stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
                }),
                [period, mult] => Ok(IndicatorType::Bollinger {
                    period: parse_period(period)?,
                    stddev_mult_x100: parse_multiplier(mult)?,
                }),
                _ => Err(arity_error("0 to 2")),
            },
            "STOCHASTIC" | "STOCH" => match args.as_slice() {
                [] => Ok(IndicatorType::Stochastic {
                    period: stochastic::DEFAULT_PERIOD,
                    smooth_k: stochastic::DEFAULT_SMOOTH_K,
                    smooth_d: stochastic::DEFAULT_SMOOTH_D,
                }),
                [period] => Ok(IndicatorType::Stochastic {
                    period: parse_period(period)?,
                    smooth_k: stochastic::DEFAULT_SMOOTH_K,
                    smooth_d: stochastic::DEFAULT_SMOOTH_D,
                }),
                [period, smooth_k, smooth_d] => Ok(IndicatorType::Stochastic {
                    period: parse_period(period)?,
                    smooth_k: parse_period(smooth_k)?,
                    smooth_d: parse_period(smooth_d)?,
                }),
                _ => Err(arity_error("0, 1 or 3")),
            },
            _ => Err(ParseError::new(
                format!("unknown indicator '{}'", name.trim()),
                lead,
            )),
        }
    }
}
