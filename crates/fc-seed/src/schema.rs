//! Relational layout of `CALDAR_RECORD`.
//!
//! The column names, primary key, and unique indexes are the ones the legacy
//! consumers query, so they are reproduced verbatim.

use fc_core::errors::{Error, Result};
use fc_time::{AccountingPeriod, Date, PackedOrdinal, WeekPeriod};

/// A column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// SQL type.
    pub sql_type: &'static str,
    /// Whether NULL is allowed.
    pub nullable: bool,
}

/// A single-column unique index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueIndex {
    /// Index name.
    pub name: &'static str,
    /// Indexed column.
    pub column: &'static str,
}

/// A table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    /// Default table name.
    pub name: &'static str,
    /// Columns in insert order.
    pub columns: &'static [Column],
    /// Primary-key column.
    pub primary_key: &'static str,
    /// Unique indexes beyond the primary key.
    pub unique_indexes: &'static [UniqueIndex],
}

const fn int(name: &'static str) -> Column {
    Column {
        name,
        sql_type: "INTEGER",
        nullable: false,
    }
}

/// The `CALDAR_RECORD` table.
pub static CALDAR_RECORD: TableSchema = TableSchema {
    name: "CALDAR_RECORD",
    columns: &[
        int("ACC_WKEND_N"),
        int("ACC_WKEND2_N"),
        int("ACC_APWKEND"),
        int("ACC_WEEKN"),
        int("ACC_PERIOD"),
        int("ACC_QUARTER"),
        int("ACC_CALPERIOD"),
        int("ACC_CLN60_WEEK"),
        int("ACC_CLN60_PERIOD"),
        int("ACC_CLN61_WEEK"),
        int("ACC_CLN61_PERIOD"),
        int("ACC_CLN7X_WEEK"),
        int("ACC_CLN7X_PERIOD"),
        int("ACC_CLN6X_WEEK"),
        int("ACC_CLN6X_PERIOD"),
        int("ACC_ALT_KEY_NUM"),
    ],
    primary_key: "ACC_WKEND_N",
    unique_indexes: &[
        UniqueIndex {
            name: "CALDAR_RECORD_ACC_APWKEND_N",
            column: "ACC_APWKEND",
        },
        UniqueIndex {
            name: "CALDAR_RECORD_ACC_WEDATE2",
            column: "ACC_WKEND2_N",
        },
    ],
};

/// Number of columns in a `CALDAR_RECORD` row.
pub const COLUMN_COUNT: usize = 16;

impl TableSchema {
    /// Comma-separated column list.
    pub fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `CREATE TABLE IF NOT EXISTS` plus the unique indexes, for `table`.
    ///
    /// `table` is the (possibly schema-qualified) name; index names get the
    /// same schema prefix, and their table-name stem follows `table`.
    pub fn create_table_sql(&self, table: &str) -> String {
        let (prefix, base) = match table.rsplit_once('.') {
            Some((schema, base)) => (format!("{schema}."), base),
            None => (String::new(), table),
        };
        let mut sql = format!("CREATE TABLE IF NOT EXISTS {table} (\n");
        for col in self.columns {
            let null = if col.nullable { "" } else { " NOT NULL" };
            sql.push_str(&format!("    {} {}{},\n", col.name, col.sql_type, null));
        }
        sql.push_str(&format!("    PRIMARY KEY ({})\n);\n", self.primary_key));
        for idx in self.unique_indexes {
            let name = match idx.name.strip_prefix(self.name) {
                Some(rest) => format!("{base}{rest}"),
                None => idx.name.to_string(),
            };
            sql.push_str(&format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {prefix}{name} ON {base} ({});\n",
                idx.column
            ));
        }
        sql
    }

    /// Single-row `INSERT` with positional parameters.
    pub fn insert_sql(&self, table: &str) -> String {
        let params = (1..=self.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("INSERT INTO {table} ({}) VALUES ({params})", self.column_list())
    }

    /// Single-row upsert keyed on the primary key.
    pub fn upsert_sql(&self, table: &str) -> String {
        let updates = self
            .columns
            .iter()
            .filter(|c| c.name != self.primary_key)
            .map(|c| format!("{0} = excluded.{0}", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} ON CONFLICT({}) DO UPDATE SET {updates}",
            self.insert_sql(table),
            self.primary_key
        )
    }
}

/// Column values of `row`, in [`CALDAR_RECORD`] column order.
pub fn row_values(row: &AccountingPeriod) -> [i64; COLUMN_COUNT] {
    [
        i64::from(row.week_ending_ordinal.value()),
        i64::from(row.week_ending_date.to_yyyymmdd()),
        i64::from(row.next_week_ordinal.value()),
        i64::from(row.fiscal_week),
        i64::from(row.fiscal_period),
        i64::from(row.fiscal_quarter),
        i64::from(row.calendar_period),
        i64::from(row.cln60.week),
        i64::from(row.cln60.period),
        i64::from(row.cln61.week),
        i64::from(row.cln61.period),
        i64::from(row.cln7x.week),
        i64::from(row.cln7x.period),
        i64::from(row.cln6x.week),
        i64::from(row.cln6x.period),
        row.sequential_key,
    ]
}

/// Rebuild a row from column values in [`CALDAR_RECORD`] order.
pub fn row_from_values(values: &[i64; COLUMN_COUNT]) -> Result<AccountingPeriod> {
    let int = |i: usize| -> Result<i32> {
        i32::try_from(values[i]).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} value {} out of range",
                CALDAR_RECORD.columns[i].name, values[i]
            ))
        })
    };
    let small = |i: usize| -> Result<u8> {
        u8::try_from(values[i]).map_err(|_| {
            Error::InvalidArgument(format!(
                "{} value {} out of range",
                CALDAR_RECORD.columns[i].name, values[i]
            ))
        })
    };
    Ok(AccountingPeriod {
        week_ending_ordinal: PackedOrdinal::new(int(0)?),
        week_ending_date: Date::from_yyyymmdd(int(1)?)?,
        next_week_ordinal: PackedOrdinal::new(int(2)?),
        fiscal_week: small(3)?,
        fiscal_period: small(4)?,
        fiscal_quarter: small(5)?,
        calendar_period: small(6)?,
        cln60: WeekPeriod::new(small(7)?, small(8)?),
        cln61: WeekPeriod::new(small(9)?, small(10)?),
        cln7x: WeekPeriod::new(small(11)?, small(12)?),
        cln6x: WeekPeriod::new(small(13)?, small(14)?),
        sequential_key: values[15],
    })
}
