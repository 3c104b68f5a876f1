//! CLI integration tests.
//!
//! Tests cover:
//! - Dispatch through `cli::run` with exit codes per error kind
//! - Generated CSV files feeding the indicator and Heikin-Ashi commands
//! - Journal workflow against a JSON journal on disk
//! - Stdout of the built binary for the tabular commands

mod common;

use alphamind::adapters::csv_adapter::CsvAdapter;
use alphamind::adapters::json_journal_adapter::JsonJournalAdapter;
use alphamind::cli::{self, Cli};
use alphamind::domain::journal::JournalStatus;
use alphamind::ports::candle_port::CandlePort;
use alphamind::ports::journal_port::JournalPort;
use clap::Parser;
use common::*;
use std::path::Path;
use std::process::{Command, ExitCode};

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["alphamind"];
    argv.extend_from_slice(args);
    cli::run(Cli::parse_from(argv))
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn binary(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_alphamind"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

mod config_loading {
    use super::*;

    #[test]
    fn missing_config_file_exits_with_config_code() {
        let code = run(&["--config", "/nonexistent/alphamind.ini", "size", "-s", "eurusd", "--risk", "1", "--stop-pips", "20"]);
        assert_eq!(code, ExitCode::from(2));
    }

    #[test]
    fn out_of_range_generator_setting_is_rejected() {
        let ini = write_temp_ini("[generator]\ndrift_center = 1.7\n");
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("bars.csv");
        let code = run(&[
            "--config",
            path_str(ini.path()),
            "generate",
            "-s",
            "eurusd",
            "-n",
            "10",
            "-o",
            path_str(&out),
        ]);
        assert_eq!(code, ExitCode::from(2));
        assert!(!out.exists());
    }

    #[test]
    fn non_positive_balance_is_rejected() {
        let ini = write_temp_ini("[account]\nbalance = -5\n");
        let code = run(&[
            "--config",
            path_str(ini.path()),
            "size",
            "-s",
            "gbpusd",
            "--risk",
            "1",
            "--stop-pips",
            "20",
        ]);
        assert_eq!(code, ExitCode::from(2));
    }
}

mod market_data_commands {
    use super::*;

    #[test]
    fn generate_writes_requested_bar_count() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("eurusd.csv");
        let code = run(&[
            "generate", "-s", "eurusd", "-t", "15m", "-n", "40", "--seed", "7", "-o",
            path_str(&out),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let candles = CsvAdapter::new(dir.path().to_path_buf())
            .load_candles("eurusd")
            .unwrap();
        assert_eq!(candles.len(), 40);
        for pair in candles.windows(2) {
            assert_eq!(pair[1].time - pair[0].time, 900);
        }
    }

    #[test]
    fn generate_uses_configured_history_count() {
        let ini = write_temp_ini("[generator]\nhistory_count = 12\nseed = 3\n");
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("bars.csv");
        let code = run(&[
            "--config",
            path_str(ini.path()),
            "generate",
            "-s",
            "audusd",
            "-o",
            path_str(&out),
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
        let candles = CsvAdapter::new(dir.path().to_path_buf())
            .load_candles("bars.csv")
            .unwrap();
        assert_eq!(candles.len(), 12);
    }

    #[test]
    fn bad_indicator_spec_exits_with_parse_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bars.csv");
        std::fs::write(&input, "time,open,high,low,close\n1,1,2,0.5,1.5\n").unwrap();

        let code = run(&["indicators", "-i", path_str(&input), "--indicator", "SMA(0)"]);
        assert_eq!(code, ExitCode::from(4));
        let code = run(&["indicators", "-i", path_str(&input), "--indicator", "VWAP(5)"]);
        assert_eq!(code, ExitCode::from(4));
    }

    #[test]
    fn missing_input_exits_with_data_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("absent.csv");
        assert_eq!(run(&["heikin-ashi", "-i", path_str(&input)]), ExitCode::from(5));
    }

    #[test]
    fn malformed_csv_exits_with_data_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bars.csv");
        std::fs::write(&input, "time,open,high,low,close\n1,1,2,x,1.5\n").unwrap();
        assert_eq!(run(&["heikin-ashi", "-i", path_str(&input)]), ExitCode::from(5));
    }

    #[test]
    fn indicators_binary_prints_rows_in_request_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bars.csv");
        CsvAdapter::new(dir.path().to_path_buf())
            .save_candles("bars.csv", &trending_candles(30, 1.10, 0.001))
            .unwrap();

        let output = binary(&[
            "indicators",
            "-i",
            path_str(&input),
            "--indicator",
            "ema(5)",
            "--indicator",
            "SMA(10)",
            "--indicator",
            "EMA(5)",
        ]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();

        assert_eq!(lines[0], "time,indicator,component,value,color");
        // EMA(5) once, then SMA(10)
        assert_eq!(lines.len(), 1 + 26 + 21);
        assert!(lines[1].starts_with(&format!("{},EMA(5),value,", 1_700_000_000 + 4 * 60)));
        assert!(lines[27].contains(",SMA(10),value,"));
    }

    #[test]
    fn macd_histogram_rows_carry_colour() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bars.csv");
        CsvAdapter::new(dir.path().to_path_buf())
            .save_candles("bars.csv", &trending_candles(40, 1.10, 0.001))
            .unwrap();

        let output = binary(&["indicators", "-i", path_str(&input), "--indicator", "MACD(3,6,2)"]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();

        let histogram: Vec<&str> = stdout.lines().filter(|l| l.contains(",histogram,")).collect();
        assert!(!histogram.is_empty());
        for line in histogram {
            assert!(line.ends_with(",#10B981") || line.ends_with(",#EF4444"), "{line}");
        }
        for line in stdout.lines().filter(|l| l.contains(",macd,")) {
            assert!(line.ends_with(','), "{line}");
        }
    }

    #[test]
    fn input_path_is_read_as_given() {
        let dir = tempfile::TempDir::new().unwrap();
        let bare = dir.path().join("bars");
        std::fs::write(dir.path().join("bars.csv"), "time,open,high,low,close\n1,1,2,0.5,1.5\n")
            .unwrap();
        assert_eq!(run(&["heikin-ashi", "-i", path_str(&bare)]), ExitCode::from(5));

        std::fs::write(&bare, "time,open,high,low,close\n1,1,2,0.5,1.5\n").unwrap();
        assert_eq!(run(&["heikin-ashi", "-i", path_str(&bare)]), ExitCode::SUCCESS);
    }

    #[test]
    fn generate_writes_exact_output_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("bars");
        let code = run(&["generate", "-s", "eurgbp", "-n", "5", "--seed", "2", "-o", path_str(&out)]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.exists());
        assert!(!dir.path().join("bars.csv").exists());
    }

    #[test]
    fn heikin_ashi_binary_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("bars.csv");
        std::fs::write(
            &input,
            "time,open,high,low,close\n1,10,12,9,11\n2,11,13,10,12\n",
        )
        .unwrap();

        let output = binary(&["heikin-ashi", "-i", path_str(&input)]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines[0], "time,open,high,low,close,bullish,strong_trend");
        // first bar: open (10+11)/2, close (10+12+9+11)/4
        assert_eq!(lines[1], "1,10.5,12,9,10.5,false,false");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn simulate_binary_streams_ticks_and_quote() {
        let output = binary(&[
            "simulate", "-s", "usdjpy", "--history", "5", "--ticks", "8", "--seed", "11",
        ]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        let lines: Vec<&str> = stdout.lines().collect();

        assert_eq!(lines[0], "event,time,open,high,low,close,volume");
        assert_eq!(lines.len(), 1 + 8 + 1);
        for line in &lines[1..9] {
            assert!(line.starts_with("new,") || line.starts_with("update,"));
        }
        assert!(lines[9].starts_with("USD/JPY bid "));
    }

    #[test]
    fn size_binary_reports_lots() {
        let output = binary(&[
            "size", "-s", "eurusd", "--risk", "2", "--stop-pips", "50", "--balance", "10000",
        ]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        // 200 risked / (50 pips * 10 per pip)
        assert_eq!(stdout.lines().next(), Some("lots: 0.40"));
    }
}

mod journal_commands {
    use super::*;

    fn trade_id(journal: &Path) -> String {
        let entries = JsonJournalAdapter::new(journal).entries().unwrap();
        assert_eq!(entries.len(), 1);
        entries[0].id.clone()
    }

    #[test]
    fn trade_close_export_import_delete() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let j = path_str(&journal);

        let code = run(&[
            "journal", "-j", j, "trade", "-s", "eurusd", "--side", "buy", "--lots", "0.5",
            "--seed", "4",
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
        let id = trade_id(&journal);
        assert!(id.starts_with("trade_"));

        let code = run(&["journal", "-j", j, "close", &id, "--exit-price", "1.1"]);
        assert_eq!(code, ExitCode::SUCCESS);
        let closed = JsonJournalAdapter::new(&journal).find(&id).unwrap().unwrap();
        assert_eq!(closed.status, JournalStatus::Closed);
        assert_eq!(closed.exit_price, Some(1.1));
        assert!(closed.profit.is_some() && closed.duration.is_some());

        let export = dir.path().join("export.json");
        let code = run(&["journal", "-j", j, "export", "-o", path_str(&export)]);
        assert_eq!(code, ExitCode::SUCCESS);

        assert_eq!(run(&["journal", "-j", j, "delete", &id]), ExitCode::SUCCESS);
        assert!(JsonJournalAdapter::new(&journal).entries().unwrap().is_empty());

        let code = run(&["journal", "-j", j, "import", "-i", path_str(&export)]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(trade_id(&journal), id);
    }

    #[test]
    fn oversized_trade_exits_with_rejection_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let code = run(&[
            "journal",
            "-j",
            path_str(&journal),
            "trade",
            "-s",
            "gbpusd",
            "--side",
            "sell",
            "--lots",
            "25",
        ]);
        assert_eq!(code, ExitCode::from(6));
        assert!(JsonJournalAdapter::new(&journal).entries().unwrap().is_empty());
    }

    #[test]
    fn nan_lots_are_rejected_and_journal_stays_usable() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let j = path_str(&journal);

        let code = run(&["journal", "-j", j, "trade", "-s", "eurusd", "--side", "buy", "--lots", "NaN"]);
        assert_eq!(code, ExitCode::from(6));
        let code = run(&[
            "journal", "-j", j, "trade", "-s", "eurusd", "--side", "buy", "--lots", "0.1",
            "--stop-loss", "NaN",
        ]);
        assert_eq!(code, ExitCode::from(6));

        assert_eq!(run(&["journal", "-j", j, "list"]), ExitCode::SUCCESS);
        let code = run(&["journal", "-j", j, "trade", "-s", "eurusd", "--side", "buy", "--lots", "0.1"]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(JsonJournalAdapter::new(&journal).entries().unwrap().len(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_backend_from_config() {
        use alphamind::adapters::sqlite_journal_adapter::SqliteJournalAdapter;

        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("journal.db");
        let ini = write_temp_ini(&format!(
            "[journal]\nbackend = sqlite\npath = {}\npool_size = 2\n",
            path_str(&db)
        ));
        let code = run(&[
            "--config",
            path_str(ini.path()),
            "journal",
            "trade",
            "-s",
            "usdchf",
            "--side",
            "sell",
            "--lots",
            "0.2",
            "--seed",
            "9",
        ]);
        assert_eq!(code, ExitCode::SUCCESS);

        let store = SqliteJournalAdapter::open(path_str(&db), 1).unwrap();
        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].symbol, "USD/CHF");
    }

    #[test]
    fn closing_unknown_entry_exits_with_journal_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let code = run(&[
            "journal",
            "-j",
            path_str(&journal),
            "close",
            "trade_0_missing",
            "--exit-price",
            "1.0",
        ]);
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn importing_non_array_exits_with_journal_code() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let input = dir.path().join("bad.json");
        std::fs::write(&input, "{\"entries\": []}").unwrap();

        let code = run(&["journal", "-j", path_str(&journal), "import", "-i", path_str(&input)]);
        assert_eq!(code, ExitCode::from(3));
    }

    #[test]
    fn journal_path_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("configured.json");
        let ini = write_temp_ini(&format!("[journal]\npath = {}\n", path_str(&journal)));

        let code = run(&[
            "--config",
            path_str(ini.path()),
            "journal",
            "trade",
            "-s",
            "audusd",
            "--side",
            "long",
            "--lots",
            "0.1",
        ]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(JsonJournalAdapter::new(&journal).entries().unwrap().len(), 1);
    }

    #[test]
    fn stats_binary_over_imported_entries() {
        let dir = tempfile::TempDir::new().unwrap();
        let journal = dir.path().join("journal.json");
        let store = JsonJournalAdapter::new(&journal);
        store
            .append(&make_entry("a", JournalStatus::Closed, Some(300.0)))
            .unwrap();
        store
            .append(&make_entry("b", JournalStatus::Closed, Some(-100.0)))
            .unwrap();
        store
            .append(&make_entry("c", JournalStatus::Open, None))
            .unwrap();

        let output = binary(&["journal", "-j", path_str(&journal), "stats"]);
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert!(stdout.contains("total_trades: 2\n"));
        assert!(stdout.contains("win_rate: 50.00\n"));
        assert!(stdout.contains("total_profit: 200.00\n"));
        assert!(stdout.contains("profit_factor: 3.00\n"));
        assert!(stdout.contains("largest_loss: -100.00\n"));
    }
}
