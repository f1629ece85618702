//! Seeding tests against in-memory SQLite databases.

use fc_seed::sqlite::seed_history;
use fc_seed::{
    checksum, read_table, records, seed, EntitySeeder, SeedConfig, SeedError, SeedOutcome,
    SqlScriptSeeder, SqliteSeeder, CALDAR_RECORD, RECORD_COUNT,
};
use fc_time::{Date, WeekPeriod};
use rusqlite::Connection;

fn memory() -> Connection {
    Connection::open_in_memory().unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .unwrap()
}

#[test]
fn seed_then_read_back() {
    let mut conn = memory();
    let mut seeder = SqliteSeeder::new(&mut conn, SeedConfig::default());
    let outcome = seed(&mut seeder).unwrap();
    assert_eq!(
        outcome,
        SeedOutcome {
            inserted: RECORD_COUNT,
            updated: 0,
            deleted: 0,
            skipped: 0,
        }
    );
    assert_eq!(seeder.read_back().unwrap(), records());

    let history = seeder.history().unwrap().unwrap();
    assert_eq!(history.seed_name, "caldar_record");
    assert_eq!(history.table_name, "CALDAR_RECORD");
    assert_eq!(history.row_count, RECORD_COUNT as i64);
    assert_eq!(history.checksum, checksum(records()));
}

#[test]
fn rerun_is_skipped() {
    let mut conn = memory();
    {
        let mut seeder = SqliteSeeder::new(&mut conn, SeedConfig::default());
        seed(&mut seeder).unwrap();
        let again = seed(&mut seeder).unwrap();
        assert_eq!(again.skipped, RECORD_COUNT);
        assert_eq!(again.inserted + again.updated, 0);
    }
    assert_eq!(count(&conn, "CALDAR_RECORD"), RECORD_COUNT as i64);
}

#[test]
fn changed_rows_are_reapplied_as_upserts() {
    let mut conn = memory();
    let mut seeder = SqliteSeeder::new(&mut conn, SeedConfig::default());
    seed(&mut seeder).unwrap();

    let mut corrected = records().to_vec();
    let last = corrected
        .iter_mut()
        .find(|r| r.week_ending_date == Date::from_ymd(2024, 12, 28).unwrap())
        .unwrap();
    last.cln7x = WeekPeriod::new(52, 12);

    let outcome = seeder.has_data(&CALDAR_RECORD, &corrected).unwrap();
    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.updated, RECORD_COUNT);
    assert_eq!(outcome.deleted, 0);

    let back = seeder.read_back().unwrap();
    assert_eq!(back, corrected);
    assert_eq!(seeder.history().unwrap().unwrap().checksum, checksum(&corrected));
}

#[test]
fn weeks_dropped_from_a_reapplied_seed_are_deleted() {
    let mut conn = memory();
    let mut seeder = SqliteSeeder::new(&mut conn, SeedConfig::default());
    seed(&mut seeder).unwrap();

    let mut trimmed = records().to_vec();
    trimmed.retain(|r| r.week_ending_date.year() < 2024);
    let dropped = RECORD_COUNT - trimmed.len();
    assert_eq!(dropped, 52);

    let outcome = seeder.has_data(&CALDAR_RECORD, &trimmed).unwrap();
    assert_eq!(outcome.inserted, 0);
    assert_eq!(outcome.updated, trimmed.len());
    assert_eq!(outcome.deleted, dropped);
    assert_eq!(seeder.read_back().unwrap(), trimmed);
    assert_eq!(seeder.history().unwrap().unwrap().row_count, trimmed.len() as i64);
}

#[test]
fn same_seed_into_another_table_is_applied() {
    let mut conn = memory();
    {
        let mut first = SqliteSeeder::new(&mut conn, SeedConfig::default());
        seed(&mut first).unwrap();
    }
    let config = SeedConfig {
        table_name: "ACCOUNTING_WEEK".into(),
        ..SeedConfig::default()
    };
    {
        let mut second = SqliteSeeder::new(&mut conn, config);
        let outcome = seed(&mut second).unwrap();
        assert_eq!(outcome.inserted, RECORD_COUNT);
        assert_eq!(outcome.skipped, 0);
        let again = seed(&mut second).unwrap();
        assert_eq!(again.skipped, RECORD_COUNT);
    }
    assert_eq!(read_table(&conn, "ACCOUNTING_WEEK").unwrap(), records());
    assert_eq!(read_table(&conn, "CALDAR_RECORD").unwrap(), records());
    let indexes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = 'ACCOUNTING_WEEK' AND sql IS NOT NULL",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(indexes, 2);
    assert!(seed_history(&conn, "caldar_record", "ACCOUNTING_WEEK").unwrap().is_some());
    assert!(seed_history(&conn, "caldar_record", "CALDAR_RECORD").unwrap().is_some());
}

#[test]
fn second_seed_name_hits_the_primary_key() {
    let mut conn = memory();
    {
        let mut first = SqliteSeeder::new(&mut conn, SeedConfig::default());
        seed(&mut first).unwrap();
    }
    let config = SeedConfig {
        seed_name: "caldar_record_copy".into(),
        ..SeedConfig::default()
    };
    {
        let mut second = SqliteSeeder::new(&mut conn, config);
        let err = seed(&mut second).unwrap_err();
        match err {
            SeedError::DuplicateKey { table, .. } => assert_eq!(table, "CALDAR_RECORD"),
            other => panic!("unexpected error {other}"),
        }
    }
    // rolled back
    assert_eq!(count(&conn, "CALDAR_RECORD"), RECORD_COUNT as i64);
    assert!(seed_history(&conn, "caldar_record_copy", "CALDAR_RECORD").unwrap().is_none());
}

#[test]
fn duplicate_rows_in_input_are_rejected() {
    let mut conn = memory();
    let mut rows = records()[..3].to_vec();
    rows.push(rows[0]);
    {
        let mut seeder = SqliteSeeder::new(&mut conn, SeedConfig::default());
        let err = seeder.has_data(&CALDAR_RECORD, &rows).unwrap_err();
        assert!(matches!(err, SeedError::DuplicateKey { .. }));
    }
    assert!(seed_history(&conn, "caldar_record", "CALDAR_RECORD").unwrap().is_none());
}

#[test]
fn attached_schema() {
    let mut conn = memory();
    conn.execute_batch("ATTACH DATABASE ':memory:' AS legacy;").unwrap();
    let config = SeedConfig {
        schema: Some("legacy".into()),
        ..SeedConfig::default()
    };
    let mut seeder = SqliteSeeder::new(&mut conn, config);
    seed(&mut seeder).unwrap();
    drop(seeder);
    assert_eq!(count(&conn, "legacy.CALDAR_RECORD"), RECORD_COUNT as i64);
}

#[test]
fn invalid_config_touches_nothing() {
    let mut conn = memory();
    let config = SeedConfig {
        table_name: "CALDAR RECORD".into(),
        ..SeedConfig::default()
    };
    {
        let mut seeder = SqliteSeeder::new(&mut conn, config);
        assert!(matches!(seed(&mut seeder), Err(SeedError::Core(_))));
    }
    assert!(seed_history(&conn, "caldar_record", "CALDAR_RECORD").unwrap().is_none());
}

// ─── SQL script ──────────────────────────────────────────────────────────────

#[test]
fn generated_script_loads_into_sqlite() {
    let mut seeder = SqlScriptSeeder::new(Vec::new(), SeedConfig::default());
    let outcome = seed(&mut seeder).unwrap();
    assert_eq!(outcome.inserted, RECORD_COUNT);
    let script = String::from_utf8(seeder.into_inner()).unwrap();
    assert!(script.contains("CREATE TABLE IF NOT EXISTS CALDAR_RECORD ("));
    assert_eq!(script.matches("INSERT INTO CALDAR_RECORD").count(), 3);

    let conn = memory();
    conn.execute_batch(&script).unwrap();
    assert_eq!(read_table(&conn, "CALDAR_RECORD").unwrap(), records());
}

#[test]
fn script_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("seed.yaml");
    std::fs::write(&path, "table_name: ACCOUNTING_WEEK\nbatch_size: 100\n").unwrap();
    let config = SeedConfig::from_file(&path).unwrap();

    let mut seeder = SqlScriptSeeder::new(Vec::new(), config);
    seed(&mut seeder).unwrap();
    let script = String::from_utf8(seeder.into_inner()).unwrap();
    assert_eq!(script.matches("INSERT INTO ACCOUNTING_WEEK").count(), 14);

    let conn = memory();
    conn.execute_batch(&script).unwrap();
    assert_eq!(count(&conn, "ACCOUNTING_WEEK"), RECORD_COUNT as i64);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SeedConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, SeedError::Io(_)));
}
