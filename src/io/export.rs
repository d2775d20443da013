use std::io::Write;

use anyhow::Result;

use crate::application::LedgerService;
use crate::domain::format_rupiah;

/// Exporter for turning the transaction feed into CSV.
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Write the transaction feed as CSV. Amounts carry the direction's
    /// sign; `jumlah_rupiah` adds a human-readable rendering. Returns the
    /// number of data rows written.
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rows = self.service.list_transactions(None).await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "created_at",
            "anggota",
            "nomor_anggota",
            "tipe_transaksi",
            "source_type",
            "jumlah",
            "jumlah_rupiah",
            "saldo_sebelum",
            "saldo_sesudah",
            "deskripsi",
        ])?;

        let mut count = 0;
        for row in &rows {
            let signed = row.direction.signed(row.amount);
            csv_writer.write_record([
                row.id.to_string(),
                row.created_at.to_rfc3339(),
                row.member_name.clone().unwrap_or_default(),
                row.member_number.clone().unwrap_or_default(),
                row.direction.to_string(),
                row.source_kind.to_string(),
                signed.to_string(),
                format_rupiah(signed),
                row.balance_before.to_string(),
                row.balance_after.to_string(),
                row.description.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }
}
