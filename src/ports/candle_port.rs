//! Candle series storage port.

use crate::domain::error::AlphamindError;
use crate::domain::ohlcv::Candle;

pub trait CandlePort {
    /// Loads a named series, sorted by time with unique timestamps.
    fn load_candles(&self, name: &str) -> Result<Vec<Candle>, AlphamindError>;

    fn save_candles(&self, name: &str, candles: &[Candle]) -> Result<(), AlphamindError>;
}
