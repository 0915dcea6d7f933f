//! Semicolon-delimited export of ranked products.
//!
//! Output is UTF-8 with a byte-order mark and CRLF line endings so that
//! spreadsheet software opens it with the right encoding and columns.

use std::io::{self, Write};

use crate::Error;
use crate::product::Product;

const BOM: &[u8] = b"\xEF\xBB\xBF";
const SEP: char = ';';
const EOL: &str = "\r\n";
const HEADER: [&str; 5] = ["#", "Name", "Price", "Website", "URL"];

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write>(w: &mut W, row: &[&str]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{SEP}")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    write!(w, "{EOL}")
}

/// Write the export table for `products` (already ranked) into `w`.
pub fn write_csv<W: Write>(mut w: W, products: &[Product]) -> Result<(), Error> {
    w.write_all(BOM)?;
    write_row(&mut w, &HEADER)?;

    for (i, p) in products.iter().enumerate() {
        let index = (i + 1).to_string();
        let price = if p.price_text.trim().is_empty() { p.price.to_string() } else { p.price_text.clone() };
        write_row(&mut w, &[index.as_str(), p.name.as_str(), price.as_str(), p.website.as_str(), p.url.as_str()])?;
    }

    w.flush()?;
    Ok(())
}

/// Export table for `products` as bytes.
pub fn export_csv(products: &[Product]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    write_csv(&mut buf, products)?;
    Ok(buf)
}

/// Download filename for an export of `query`.
pub fn export_filename(query: &str) -> String {
    format!("export_{}.csv", urlencoding::encode(query))
}
