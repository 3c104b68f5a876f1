//! Dispatch from an `IndicatorType` to its calculator, and a flat row view of
//! every output shape for tabular export.

use std::collections::HashMap;

use crate::domain::indicator::{
    calculate_atr, calculate_atr_wilder, calculate_bollinger, calculate_ema, calculate_macd,
    calculate_rsi, calculate_rsi_wilder, calculate_sma, calculate_stochastic, BollingerBands,
    HistogramColor, IndicatorType, MacdOutput, SeriesPoint, StochasticOutput,
};
use crate::domain::ohlcv::Candle;

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorOutput {
    Line(Vec<SeriesPoint>),
    Macd(MacdOutput),
    Bollinger(BollingerBands),
    Stochastic(StochasticOutput),
}

/// One `(time, component, value)` cell of an indicator output. Only MACD
/// histogram cells carry a colour.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub time: i64,
    pub component: &'static str,
    pub value: f64,
    pub color: Option<HistogramColor>,
}

impl IndicatorOutput {
    /// Flattens the output into rows, component by component, each in time order.
    pub fn rows(&self) -> Vec<OutputRow> {
        fn push(rows: &mut Vec<OutputRow>, component: &'static str, points: &[SeriesPoint]) {
            rows.extend(points.iter().map(|p| OutputRow {
                time: p.time,
                component,
                value: p.value,
                color: None,
            }));
        }

        let mut rows = Vec::new();
        match self {
            IndicatorOutput::Line(points) => push(&mut rows, "value", points),
            IndicatorOutput::Macd(out) => {
                push(&mut rows, "macd", &out.macd);
                push(&mut rows, "signal", &out.signal);
                rows.extend(out.histogram.iter().map(|h| OutputRow {
                    time: h.time,
                    component: "histogram",
                    value: h.value,
                    color: Some(h.color),
                }));
            }
            IndicatorOutput::Bollinger(bands) => {
                push(&mut rows, "upper", &bands.upper);
                push(&mut rows, "middle", &bands.middle);
                push(&mut rows, "lower", &bands.lower);
            }
            IndicatorOutput::Stochastic(out) => {
                push(&mut rows, "k", &out.k);
                push(&mut rows, "d", &out.d);
            }
        }
        rows
    }

    pub fn is_empty(&self) -> bool {
        match self {
            IndicatorOutput::Line(points) => points.is_empty(),
            IndicatorOutput::Macd(out) => out.macd.is_empty(),
            IndicatorOutput::Bollinger(bands) => bands.middle.is_empty(),
            IndicatorOutput::Stochastic(out) => out.k.is_empty(),
        }
    }
}

pub fn compute_indicator(candles: &[Candle], indicator: &IndicatorType) -> IndicatorOutput {
    match *indicator {
        IndicatorType::Sma(period) => IndicatorOutput::Line(calculate_sma(candles, period).values),
        IndicatorType::Ema(period) => IndicatorOutput::Line(calculate_ema(candles, period).values),
        IndicatorType::Rsi(period) => IndicatorOutput::Line(calculate_rsi(candles, period).values),
        IndicatorType::RsiWilder(period) => {
            IndicatorOutput::Line(calculate_rsi_wilder(candles, period).values)
        }
        IndicatorType::Atr(period) => IndicatorOutput::Line(calculate_atr(candles, period).values),
        IndicatorType::AtrWilder(period) => {
            IndicatorOutput::Line(calculate_atr_wilder(candles, period).values)
        }
        IndicatorType::Macd { fast, slow, signal } => {
            IndicatorOutput::Macd(calculate_macd(candles, fast, slow, signal))
        }
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => IndicatorOutput::Bollinger(calculate_bollinger(candles, period, stddev_mult_x100)),
        IndicatorType::Stochastic {
            period,
            smooth_k,
            smooth_d,
        } => IndicatorOutput::Stochastic(calculate_stochastic(candles, period, smooth_k, smooth_d)),
    }
}

/// Computes each distinct indicator once. Indicators are independent, so the
/// order of `indicators` does not affect any output.
pub fn compute_indicators(
    candles: &[Candle],
    indicators: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorOutput> {
    let mut out = HashMap::with_capacity(indicators.len());
    for indicator in indicators {
        if !out.contains_key(indicator) {
            log::debug!("computing {} over {} candles", indicator, candles.len());
            out.insert(indicator.clone(), compute_indicator(candles, indicator));
        }
    }
    out
}
