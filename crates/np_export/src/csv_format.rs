use np_core::{AuthorPayout, Error, Result};

pub const HEADER: [&str; 3] = ["Author", "Article Count", "Total Payout"];

/// One row per author, in input order, under a fixed header.
pub fn to_csv(payouts: &[AuthorPayout]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    writer.write_record(HEADER).map_err(csv_error)?;
    for payout in payouts {
        writer
            .write_record([
                payout.author.clone(),
                payout.article_count.to_string(),
                payout.total_payout.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Export(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::Export(format!("CSV is not UTF-8: {}", e)))
}

fn csv_error(e: csv::Error) -> Error {
    Error::Export(format!("Failed to write CSV: {}", e))
}
