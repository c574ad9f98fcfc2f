//! CSV writer.

use std::io::{self, Write};

use h3o::LatLng;

use crate::types::ResultSet;

/// Header row of the tabular output.
pub const CSV_HEADER: &str = "h3_index,value,longitude,latitude";

/// Write `results` as CSV.
///
/// The centroid is derived from the cell index here rather than taken from
/// the record's geometry, so the output is the same whether or not the
/// records carry boundaries. Fails with `InvalidData` if any value is not
/// finite.
pub fn write_csv<W: Write>(results: &ResultSet, out: &mut W) -> io::Result<()> {
    super::ensure_finite(results)?;
    writeln!(out, "{}", CSV_HEADER)?;
    for record in &results.records {
        let center = LatLng::from(record.cell);
        writeln!(
            out,
            "{},{:?},{:?},{:?}",
            record.cell,
            record.value,
            center.lng(),
            center.lat()
        )?;
    }
    Ok(())
}
