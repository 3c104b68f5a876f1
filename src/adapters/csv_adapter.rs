//! CSV candle series adapter.
//!
//! Files carry a header row followed by `time,open,high,low,close[,volume]`
//! records. A series name resolves to `<base_path>/<name>`, with `.csv`
//! appended when the name has no extension.

use crate::domain::error::AlphamindError;
use crate::domain::ohlcv::Candle;
use crate::ports::candle_port::CandlePort;
use csv::StringRecord;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 6] = ["time", "open", "high", "low", "close", "volume"];

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, name: &str) -> PathBuf {
        if Path::new(name).extension().is_some() {
            self.base_path.join(name)
        } else {
            self.base_path.join(format!("{}.csv", name))
        }
    }
}

fn field<T: std::str::FromStr>(
    record: &StringRecord,
    idx: usize,
    line: u64,
) -> Result<T, AlphamindError>
where
    T::Err: std::fmt::Display,
{
    let name = HEADER[idx];
    record
        .get(idx)
        .ok_or_else(|| AlphamindError::Data {
            reason: format!("line {}: missing {} column", line, name),
        })?
        .trim()
        .parse()
        .map_err(|e: T::Err| AlphamindError::Data {
            reason: format!("line {}: invalid {} value: {}", line, name, e),
        })
}

/// Parses candles from any CSV source, then sorts them by time. Duplicate
/// timestamps are an error.
pub fn read_candles<R: io::Read>(reader: R) -> Result<Vec<Candle>, AlphamindError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut candles = Vec::new();

    for result in rdr.records() {
        let record = result.map_err(|e| AlphamindError::Data {
            reason: format!("CSV parse error: {}", e),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let mut candle = Candle::new(
            field(&record, 0, line)?,
            field(&record, 1, line)?,
            field(&record, 2, line)?,
            field(&record, 3, line)?,
            field(&record, 4, line)?,
        );
        if record.get(5).is_some_and(|v| !v.trim().is_empty()) {
            candle.volume = Some(field(&record, 5, line)?);
        }
        candles.push(candle);
    }

    candles.sort_by_key(|c| c.time);
    if let Some(pair) = candles.windows(2).find(|w| w[0].time == w[1].time) {
        return Err(AlphamindError::Data {
            reason: format!("duplicate timestamp {}", pair[0].time),
        });
    }
    Ok(candles)
}

pub fn write_candles<W: io::Write>(writer: W, candles: &[Candle]) -> Result<(), AlphamindError> {
    let to_data = |e: csv::Error| AlphamindError::Data {
        reason: format!("CSV write error: {}", e),
    };

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(to_data)?;
    for c in candles {
        wtr.write_record([
            c.time.to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.map(|v| v.to_string()).unwrap_or_default(),
        ])
        .map_err(to_data)?;
    }
    wtr.flush()?;
    Ok(())
}

impl CandlePort for CsvAdapter {
    fn load_candles(&self, name: &str) -> Result<Vec<Candle>, AlphamindError> {
        let path = self.csv_path(name);
        let content = fs::read_to_string(&path).map_err(|e| AlphamindError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;
        let candles = read_candles(content.as_bytes())?;
        log::debug!("loaded {} candles from {}", candles.len(), path.display());
        Ok(candles)
    }

    fn save_candles(&self, name: &str, candles: &[Candle]) -> Result<(), AlphamindError> {
        let path = self.csv_path(name);
        let file = fs::File::create(&path)?;
        write_candles(file, candles)?;
        log::debug!("wrote {} candles to {}", candles.len(), path.display());
        Ok(())
    }
}
