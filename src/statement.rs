use std::io;
use std::path::Path;

use crate::dates::parse_statement_date;
use crate::error::{Error, Result};
use crate::{parse_amount, Flow, Transaction};

/// Columns a statement export must provide. Any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Date", "Details", "Amount", "Debit/Credit"];

/// Where each required column sits in a statement row.
#[derive(Debug, PartialEq)]
struct ColumnIndex {
    date: usize,
    details: usize,
    amount: usize,
    flow: usize,
}

impl ColumnIndex {
    /// Locate the required columns among the (trimmed) header names.
    fn locate<H: AsRef<str>>(headers: &[H]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .ok_or_else(|| Error::Schema {
                    column: name.to_owned(),
                })
        };
        let [date, details, amount, flow] = REQUIRED_COLUMNS;
        Ok(ColumnIndex {
            date: find(date)?,
            details: find(details)?,
            amount: find(amount)?,
            flow: find(flow)?,
        })
    }

    /// Build a transaction from one row; `row` counts data rows from 1.
    fn transaction<C: AsRef<str>>(&self, row: usize, cells: &[C]) -> Result<Transaction> {
        let cell = |idx: usize, column: &str| {
            cells
                .get(idx)
                .map(|c| c.as_ref())
                .ok_or_else(|| Error::Parse {
                    row,
                    column: column.to_owned(),
                    value: String::new(),
                })
        };
        let invalid = |column: &str, value: &str| Error::Parse {
            row,
            column: column.to_owned(),
            value: value.to_owned(),
        };

        let raw_date = cell(self.date, "Date")?;
        let date = parse_statement_date(raw_date).ok_or_else(|| invalid("Date", raw_date))?;

        let details = cell(self.details, "Details")?;

        let raw_amount = cell(self.amount, "Amount")?;
        let amount = parse_amount(raw_amount).ok_or_else(|| invalid("Amount", raw_amount))?;

        let raw_flow = cell(self.flow, "Debit/Credit")?;
        let flow: Flow = raw_flow
            .parse()
            .map_err(|_| invalid("Debit/Credit", raw_flow))?;

        Ok(Transaction::new(date, details, amount, flow))
    }
}

/// Convert a raw table of strings into transactions.
///
/// Either every row converts or the whole table is rejected; rows are
/// never skipped.
pub fn parse_records<H, R, C>(headers: &[H], rows: impl IntoIterator<Item = R>) -> Result<Vec<Transaction>>
where
    H: AsRef<str>,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    let columns = ColumnIndex::locate(headers)?;
    rows.into_iter()
        .enumerate()
        .map(|(i, cells)| columns.transaction(i + 1, cells.as_ref()))
        .collect()
}

/// Read a CSV statement export into transactions.
pub fn parse_statement(reader: impl io::Read) -> Result<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_owned()).collect();
    let columns = ColumnIndex::locate(&headers)?;

    let mut transactions = vec![];
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let cells: Vec<&str> = record.iter().collect();
        transactions.push(columns.transaction(i + 1, &cells)?);
    }
    Ok(transactions)
}

/// Read a CSV statement export from disk.
pub fn parse_statement_file(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())?;
    parse_statement(io::BufReader::new(file))
}
