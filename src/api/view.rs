use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    Direction, LoanId, MemberId, Rupiah, SavingsAccountId, SavingsTypeId, SourceKind,
    TransactionId,
};
use crate::storage::TransactionRow;

/// Canonical transaction shape served by `GET /transactions`.
///
/// The amount sign is recomputed from the direction here; the stored
/// magnitude is unsigned and a sign coming back from the store is never
/// trusted. Related context (`anggota`, `tabungan`, `pinjaman`) is
/// `Option` so missing data serializes as `null`, never as an object
/// with blank fields.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub anggota_id: MemberId,
    pub tipe_transaksi: Direction,
    pub source_type: SourceKind,
    /// Signed: `masuk` non-negative, `keluar` non-positive.
    pub jumlah: Rupiah,
    pub saldo_sebelum: Rupiah,
    pub saldo_sesudah: Rupiah,
    pub deskripsi: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub anggota: Option<MemberView>,
    pub tabungan: Option<SavingsView>,
    /// Loan context, re-exposed under the stable `pinjaman` name even
    /// though the store still uses the legacy `pembiayaan_*` columns.
    pub pinjaman: Option<LoanView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub nama: String,
    pub nomor_anggota: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsView {
    pub id: SavingsAccountId,
    pub saldo: Option<Rupiah>,
    pub jenis_tabungan: Option<SavingsTypeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavingsTypeView {
    pub id: Option<SavingsTypeId>,
    pub nama: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub id: LoanId,
    pub saldo: Option<Rupiah>,
}

impl From<TransactionRow> for TransactionView {
    fn from(row: TransactionRow) -> Self {
        // A member sub-object exists only when a name was joined.
        let anggota = row.member_name.map(|nama| MemberView {
            nama,
            nomor_anggota: row.member_number,
        });

        // Savings context only when the transaction links a savings
        // account; the type sub-object only when a type name exists.
        let tabungan = row.savings_account_id.map(|id| SavingsView {
            id,
            saldo: row.savings_balance,
            jenis_tabungan: row.savings_type_name.map(|nama| SavingsTypeView {
                id: row.savings_type_id,
                nama,
            }),
        });

        let pinjaman = row.loan_id.map(|id| LoanView {
            id,
            saldo: row.loan_balance,
        });

        TransactionView {
            id: row.id,
            anggota_id: row.member_id,
            tipe_transaksi: row.direction,
            source_type: row.source_kind,
            jumlah: row.direction.signed(row.amount),
            saldo_sebelum: row.balance_before,
            saldo_sesudah: row.balance_after,
            deskripsi: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
            anggota,
            tabungan,
            pinjaman,
        }
    }
}
