//! CSV export and terminal table rendering

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

use crate::core::{PoRecord, Result};

/// Column headers of the exported CSV, in order
pub const HEADERS: [&str; 9] = [
    "Time",
    "PO Number",
    "Warehouse",
    "Vendor",
    "Total Qty",
    "Name",
    "SKU",
    "Ordered Qty",
    "PO URL",
];

/// Encode records as CSV, header row first
pub fn write_records<W: Write>(writer: W, records: &[PoRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    // Explicit header so an empty export still names its columns
    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.write_record([
            &record.time,
            &record.po_number,
            &record.warehouse,
            &record.vendor,
            &record.total_qty,
            &record.product_name,
            &record.sku,
            &record.ordered_qty,
            &record.po_url,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Encode records as a CSV string
pub fn to_csv_string(records: &[PoRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(&mut buffer, records)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write records to a CSV file
pub fn write_csv(path: &Path, records: &[PoRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    write_records(File::create(path)?, records)?;
    info!(path = %path.display(), records = records.len(), "Saved PO details");
    Ok(())
}

/// Decode a CSV produced by `write_records`
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PoRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let records = rdr.deserialize().collect::<std::result::Result<Vec<PoRecord>, _>>()?;
    Ok(records)
}

/// Render records as an aligned text table
pub fn render_table(records: &[PoRecord]) -> String {
    let rows: Vec<[&str; 9]> = records
        .iter()
        .map(|r| {
            [
                r.time.as_str(),
                r.po_number.as_str(),
                r.warehouse.as_str(),
                r.vendor.as_str(),
                r.total_qty.as_str(),
                r.product_name.as_str(),
                r.sku.as_str(),
                r.ordered_qty.as_str(),
                r.po_url.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str; 9]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut output = String::new();
    output.push_str(&format_row(&HEADERS));
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');
    for row in &rows {
        output.push_str(&format_row(row));
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str, qty: &str) -> PoRecord {
        PoRecord {
            time: "2024-01-03 09:30:00".to_string(),
            po_number: "PO-100".to_string(),
            warehouse: "Primary  East".to_string(),
            vendor: "Acme  Inc.".to_string(),
            total_qty: "15".to_string(),
            product_name: "Widget".to_string(),
            sku: sku.to_string(),
            ordered_qty: qty.to_string(),
            po_url: "https://app.shiphero.com/dashboard/purchase-orders/details/100".to_string(),
        }
    }

    #[test]
    fn test_csv_header_row() {
        let csv = to_csv_string(&[]).unwrap();
        assert_eq!(
            csv,
            "Time,PO Number,Warehouse,Vendor,Total Qty,Name,SKU,Ordered Qty,PO URL\n"
        );
    }

    #[test]
    fn test_csv_rows() {
        let csv = to_csv_string(&[record("A1", "5")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2024-01-03 09:30:00,PO-100,Primary  East,Acme  Inc.,15,Widget,A1,5,https://app.shiphero.com/dashboard/purchase-orders/details/100"
        );
    }

    #[test]
    fn test_csv_round_trip() {
        let records = vec![record("A1", "5"), record("B2", "10")];
        let csv = to_csv_string(&records).unwrap();
        let decoded = read_records(csv.as_bytes()).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(&[record("A1", "5")]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Time                | PO Number | "));
        assert!(lines[1].starts_with("--------------------+-"));
        assert!(lines[2].contains("| Widget | A1  |"));
    }
}
