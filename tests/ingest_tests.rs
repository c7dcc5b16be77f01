use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tempfile::NamedTempFile;
use tick_scaling::error::AppError;
use tick_scaling::ingest::{
    generate_synthetic_csv, load_market_data, parse_timestamp, stream_market_data, SyntheticSpec,
};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 20)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn parses_supported_timestamp_layouts() {
    assert_eq!(parse_timestamp("2026-01-20T15:04:05").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp(" 2026-01-20 15:04:05 ").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp("2026/01/20 15:04:05").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp("2026-01-20T15:04:05Z").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp("2026-01-20T17:04:05+02:00").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp("2026-01-20").unwrap(), at(0, 0, 0));
    assert_eq!(parse_timestamp("2026-01-20T15:04").unwrap(), at(15, 4, 0));
    assert_eq!(parse_timestamp("2026-01-20 15:04").unwrap(), at(15, 4, 0));
    assert_eq!(parse_timestamp("2026-01-20T17:04:05+0200").unwrap(), at(15, 4, 5));
    assert_eq!(parse_timestamp("2026-01-20 13:04:05.5-0200").unwrap().second(), 5);

    let frac = parse_timestamp("2026-01-20T15:04:05.250").unwrap();
    assert_eq!(frac.nanosecond(), 250_000_000);
}

#[test]
fn rejects_unknown_timestamp() {
    assert!(matches!(
        parse_timestamp("20/01/2026 3pm"),
        Err(AppError::Timestamp(_))
    ));
}

#[test]
fn loads_rows_in_file_order() {
    let file = csv_file(&[
        "timestamp,symbol,price",
        "2026-01-20T15:04:07, ABC ,101.5",
        "2026-01-20T15:04:05,ABC,100.25",
        "2026-01-20T15:04:06,XYZ,-3",
    ]);

    let ticks = load_market_data(file.path()).unwrap();
    assert_eq!(ticks.len(), 3);
    assert_eq!(ticks[0].timestamp(), at(15, 4, 7));
    assert_eq!(ticks[0].symbol(), "ABC");
    assert!((ticks[0].price() - 101.5).abs() < f64::EPSILON);
    assert_eq!(ticks[1].timestamp(), at(15, 4, 5));
    assert_eq!(ticks[2].symbol(), "XYZ");
    assert!((ticks[2].price() + 3.0).abs() < f64::EPSILON);
}

#[test]
fn column_order_and_extra_columns_do_not_matter() {
    let file = csv_file(&[
        "price,volume,symbol,timestamp",
        "10.5,100,ABC,2026-01-20 15:04:05",
    ]);
    let ticks = load_market_data(file.path()).unwrap();
    assert_eq!(ticks.len(), 1);
    assert_eq!(ticks[0].symbol(), "ABC");
    assert_eq!(ticks[0].timestamp(), at(15, 4, 5));
}

#[test]
fn header_only_file_is_empty() {
    let file = csv_file(&["timestamp,symbol,price"]);
    assert!(load_market_data(file.path()).unwrap().is_empty());
}

#[test]
fn missing_columns_are_reported() {
    let file = csv_file(&["time,symbol,price", "2026-01-20T15:04:05,ABC,1.0"]);
    match load_market_data(file.path()) {
        Err(AppError::MissingColumns { found }) => {
            assert_eq!(found, vec!["time", "symbol", "price"]);
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn bad_price_names_the_row() {
    let file = csv_file(&[
        "timestamp,symbol,price",
        "2026-01-20T15:04:05,ABC,1.0",
        "2026-01-20T15:04:06,ABC,abc",
    ]);
    match load_market_data(file.path()) {
        Err(AppError::Price { row, raw }) => {
            assert_eq!(row, 2);
            assert_eq!(raw, "abc");
        }
        other => panic!("expected Price error, got {:?}", other),
    }
}

#[test]
fn non_finite_price_is_rejected() {
    let file = csv_file(&["timestamp,symbol,price", "2026-01-20T15:04:05,ABC,inf"]);
    assert!(matches!(
        load_market_data(file.path()),
        Err(AppError::Price { row: 1, .. })
    ));
}

#[test]
fn blank_symbol_is_rejected() {
    let file = csv_file(&["timestamp,symbol,price", "2026-01-20T15:04:05,  ,1.0"]);
    assert!(matches!(
        load_market_data(file.path()),
        Err(AppError::EmptySymbol { row: 1 })
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_market_data(dir.path().join("nope.csv")),
        Err(AppError::Io(_))
    ));
}

#[test]
fn stream_yields_same_ticks_as_load() {
    let file = csv_file(&[
        "timestamp,symbol,price",
        "2026-01-20T15:04:05,ABC,1.0",
        "2026-01-20T15:04:06,ABC,2.0",
        "2026-01-20T15:04:07,XYZ,3.0",
    ]);
    let loaded = load_market_data(file.path()).unwrap();
    let streamed: Vec<_> = stream_market_data(file.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(loaded, streamed);
}

#[test]
fn stream_surfaces_bad_rows_lazily() {
    let file = csv_file(&[
        "timestamp,symbol,price",
        "2026-01-20T15:04:05,ABC,1.0",
        "not-a-time,ABC,2.0",
    ]);
    let mut stream = stream_market_data(file.path()).unwrap();
    assert!(stream.next().unwrap().is_ok());
    assert!(matches!(stream.next(), Some(Err(AppError::Timestamp(_)))));
    assert!(stream.next().is_none());
}

#[test]
fn synthetic_csv_round_trips_and_is_seeded() {
    let dir = tempfile::tempdir().unwrap();
    let spec = SyntheticSpec {
        n: 250,
        ..SyntheticSpec::default()
    };

    let a = generate_synthetic_csv(dir.path().join("sub").join("a.csv"), &spec).unwrap();
    let b = generate_synthetic_csv(dir.path().join("b.csv"), &spec).unwrap();
    assert_eq!(
        std::fs::read_to_string(&a).unwrap(),
        std::fs::read_to_string(&b).unwrap()
    );

    let ticks = load_market_data(&a).unwrap();
    assert_eq!(ticks.len(), 250);
    assert!(ticks.iter().all(|t| t.symbol() == "ABC"));
    assert_eq!(
        ticks[0].timestamp(),
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    );
    assert_eq!(
        ticks[1].timestamp() - ticks[0].timestamp(),
        chrono::Duration::minutes(1)
    );
    assert!((ticks[0].price() - 100.0).abs() <= 0.5 + 1e-4);
    for pair in ticks.windows(2) {
        assert!((pair[1].price() - pair[0].price()).abs() <= 0.5 + 1e-3);
    }

    let other = SyntheticSpec {
        n: 250,
        seed: 7,
        ..SyntheticSpec::default()
    };
    let c = generate_synthetic_csv(dir.path().join("c.csv"), &other).unwrap();
    assert_ne!(
        std::fs::read_to_string(&a).unwrap(),
        std::fs::read_to_string(&c).unwrap()
    );
}
