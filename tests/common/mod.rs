#![allow(dead_code)]

use alphamind::domain::error::AlphamindError;
use alphamind::domain::journal::{JournalEntry, JournalStatus, JournalUpdate};
pub use alphamind::domain::ohlcv::Candle;
use alphamind::domain::trade::Side;
use alphamind::ports::journal_port::JournalPort;
use std::cell::RefCell;
use std::io::Write;

pub struct MockJournal {
    pub entries: RefCell<Vec<JournalEntry>>,
    pub fail_with: Option<String>,
}

impl MockJournal {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            fail_with: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            fail_with: Some(reason.to_string()),
        }
    }

    fn check(&self) -> Result<(), AlphamindError> {
        match &self.fail_with {
            Some(reason) => Err(AlphamindError::Journal {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl JournalPort for MockJournal {
    fn append(&self, entry: &JournalEntry) -> Result<(), AlphamindError> {
        self.check()?;
        self.entries.borrow_mut().push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<JournalEntry>, AlphamindError> {
        self.check()?;
        Ok(self.entries.borrow().clone())
    }

    fn update(&self, id: &str, update: &JournalUpdate) -> Result<bool, AlphamindError> {
        self.check()?;
        let mut entries = self.entries.borrow_mut();
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                update.apply(entry);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: &str) -> Result<bool, AlphamindError> {
        self.check()?;
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    fn replace_all(&self, entries: &[JournalEntry]) -> Result<(), AlphamindError> {
        self.check()?;
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}

pub fn make_candle(time: i64, close: f64) -> Candle {
    Candle::new(time, close - 0.5, close + 1.0, close - 1.0, close)
}

/// `count` candles one minute apart with closes rising by `step`.
pub fn trending_candles(count: usize, start_price: f64, step: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| make_candle(1_700_000_000 + 60 * i as i64, start_price + step * i as f64))
        .collect()
}

pub fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(i as i64, price, price, price, price))
        .collect()
}

pub fn make_entry(id: &str, status: JournalStatus, profit: Option<f64>) -> JournalEntry {
    JournalEntry {
        id: id.to_string(),
        date: "2024-06-03 12:00:00".to_string(),
        timestamp: 1_717_416_000_000,
        symbol: "EUR/USD".to_string(),
        side: Side::Buy,
        entry_price: 1.0850,
        exit_price: None,
        lot_size: 0.1,
        stop_loss: None,
        take_profit: None,
        pips: None,
        profit,
        profit_percent: None,
        layers: 1,
        duration: None,
        strategy: None,
        status,
        notes: None,
        broker: None,
    }
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
