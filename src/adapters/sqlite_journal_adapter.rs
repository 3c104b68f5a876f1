//! SQLite journal adapter.

use crate::domain::error::AlphamindError;
use crate::domain::journal::{JournalEntry, JournalStatus, JournalUpdate};
use crate::domain::trade::Side;
use crate::ports::journal_port::JournalPort;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Row};
use std::str::FromStr;

const SELECT_COLUMNS: &str = "id, date, timestamp, symbol, side, entry_price, exit_price,
    lot_size, stop_loss, take_profit, pips, profit, profit_percent, layers, duration,
    strategy, status, notes, broker";

pub struct SqliteJournalAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn journal_err(e: impl std::fmt::Display) -> AlphamindError {
    AlphamindError::Journal {
        reason: e.to_string(),
    }
}

fn parse_text<T: FromStr<Err = String>>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.into())
    })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    Ok(JournalEntry {
        id: row.get(0)?,
        date: row.get(1)?,
        timestamp: row.get(2)?,
        symbol: row.get(3)?,
        side: parse_text::<Side>(row, 4)?,
        entry_price: row.get(5)?,
        exit_price: row.get(6)?,
        lot_size: row.get(7)?,
        stop_loss: row.get(8)?,
        take_profit: row.get(9)?,
        pips: row.get(10)?,
        profit: row.get(11)?,
        profit_percent: row.get(12)?,
        layers: row.get(13)?,
        duration: row.get(14)?,
        strategy: row.get(15)?,
        status: parse_text::<JournalStatus>(row, 16)?,
        notes: row.get(17)?,
        broker: row.get(18)?,
    })
}

impl SqliteJournalAdapter {
    pub fn open(path: &str, pool_size: u32) -> Result<Self, AlphamindError> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(journal_err)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, AlphamindError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(journal_err)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, AlphamindError> {
        self.pool.get().map_err(journal_err)
    }

    pub fn initialize_schema(&self) -> Result<(), AlphamindError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS journal (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL,
                date TEXT NOT NULL,
                timestamp INTEGER NOT NULL,
                symbol TEXT NOT NULL,
                side TEXT NOT NULL,
                entry_price REAL NOT NULL,
                exit_price REAL,
                lot_size REAL NOT NULL,
                stop_loss REAL,
                take_profit REAL,
                pips REAL,
                profit REAL,
                profit_percent REAL,
                layers INTEGER NOT NULL,
                duration TEXT,
                strategy TEXT,
                status TEXT NOT NULL,
                notes TEXT,
                broker TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_journal_id ON journal(id);
            CREATE INDEX IF NOT EXISTS idx_journal_status ON journal(status);",
        )
        .map_err(journal_err)?;
        Ok(())
    }
}

fn insert_entry(conn: &rusqlite::Connection, entry: &JournalEntry) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO journal (id, date, timestamp, symbol, side, entry_price, exit_price,
            lot_size, stop_loss, take_profit, pips, profit, profit_percent, layers, duration,
            strategy, status, notes, broker)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            entry.id,
            entry.date,
            entry.timestamp,
            entry.symbol,
            entry.side.as_str(),
            entry.entry_price,
            entry.exit_price,
            entry.lot_size,
            entry.stop_loss,
            entry.take_profit,
            entry.pips,
            entry.profit,
            entry.profit_percent,
            entry.layers,
            entry.duration,
            entry.strategy,
            entry.status.as_str(),
            entry.notes,
            entry.broker
        ],
    )
}

impl JournalPort for SqliteJournalAdapter {
    fn append(&self, entry: &JournalEntry) -> Result<(), AlphamindError> {
        let conn = self.conn()?;
        insert_entry(&conn, entry).map_err(journal_err)?;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<JournalEntry>, AlphamindError> {
        let conn = self.conn()?;
        let query = format!("SELECT {} FROM journal ORDER BY seq ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&query).map_err(journal_err)?;
        let rows = stmt.query_map([], entry_from_row).map_err(journal_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(journal_err)?);
        }
        Ok(entries)
    }

    fn find(&self, id: &str) -> Result<Option<JournalEntry>, AlphamindError> {
        let conn = self.conn()?;
        let query = format!(
            "SELECT {} FROM journal WHERE id = ?1 ORDER BY seq ASC LIMIT 1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&query).map_err(journal_err)?;
        let mut rows = stmt.query_map(params![id], entry_from_row).map_err(journal_err)?;
        let found = rows.next().transpose().map_err(journal_err)?;
        Ok(found)
    }

    fn update(&self, id: &str, update: &JournalUpdate) -> Result<bool, AlphamindError> {
        let Some(mut entry) = self.find(id)? else {
            return Ok(false);
        };
        update.apply(&mut entry);

        let conn = self.conn()?;
        conn.execute(
            "UPDATE journal SET exit_price = ?2, stop_loss = ?3, take_profit = ?4, pips = ?5,
                profit = ?6, profit_percent = ?7, layers = ?8, duration = ?9, strategy = ?10,
                status = ?11, notes = ?12, broker = ?13
             WHERE seq = (SELECT MIN(seq) FROM journal WHERE id = ?1)",
            params![
                entry.id,
                entry.exit_price,
                entry.stop_loss,
                entry.take_profit,
                entry.pips,
                entry.profit,
                entry.profit_percent,
                entry.layers,
                entry.duration,
                entry.strategy,
                entry.status.as_str(),
                entry.notes,
                entry.broker
            ],
        )
        .map_err(journal_err)?;
        Ok(true)
    }

    fn delete(&self, id: &str) -> Result<bool, AlphamindError> {
        let conn = self.conn()?;
        let removed = conn
            .execute("DELETE FROM journal WHERE id = ?1", params![id])
            .map_err(journal_err)?;
        Ok(removed > 0)
    }

    fn replace_all(&self, entries: &[JournalEntry]) -> Result<(), AlphamindError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(journal_err)?;
        tx.execute("DELETE FROM journal", []).map_err(journal_err)?;
        for entry in entries {
            insert_entry(&tx, entry).map_err(journal_err)?;
        }
        tx.commit().map_err(journal_err)?;
        Ok(())
    }
}
