//! CSV export of the pending review queue.

use std::path::Path;

use csv::Writer;
use engine::PendingTransaction;
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct ExportRow<'a> {
    id: &'a str,
    merchant: &'a str,
    amount_minor: i64,
    suggested_category: Option<&'a str>,
    occurred_at: Option<String>,
}

/// Writes the queue to `path`, returning the number of rows written.
pub fn write_queue_csv<'a>(
    path: &Path,
    transactions: impl IntoIterator<Item = &'a PendingTransaction>,
) -> Result<usize> {
    let mut writer = Writer::from_path(path)?;
    let mut rows = 0;
    for tx in transactions {
        writer.serialize(ExportRow {
            id: &tx.id,
            merchant: &tx.merchant_label,
            amount_minor: tx.amount.cents(),
            suggested_category: tx.suggested_category.as_deref(),
            occurred_at: tx.occurred_at.map(|dt| dt.to_rfc3339()),
        })?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::MoneyCents;

    #[test]
    fn writes_one_row_per_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.csv");

        let mut amazon = PendingTransaction::new("t1", "AMZN-19283", MoneyCents::new(4_299));
        amazon.suggested_category = Some("Shopping".to_string());
        let netflix = PendingTransaction::new("t2", "NETFLIX", MoneyCents::new(1_599));

        let rows = write_queue_csv(&path, [&amazon, &netflix]).unwrap();
        assert_eq!(rows, 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("id,merchant,amount_minor,suggested_category,occurred_at")
        );
        assert_eq!(lines.next(), Some("t1,AMZN-19283,4299,Shopping,"));
        assert_eq!(lines.next(), Some("t2,NETFLIX,1599,,"));
    }

    #[test]
    fn empty_queue_writes_only_the_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("queue.csv");

        let rows = write_queue_csv(&path, std::iter::empty::<&PendingTransaction>()).unwrap();
        assert_eq!(rows, 0);
    }
}
