use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Direction, Loan, LoanId, Member, MemberId, Rupiah, SavingsAccount, SavingsAccountId,
    SavingsType, SavingsTypeId, SourceKind, SourceRef, Transaction, TransactionDraft,
    TransactionId, format_rupiah,
};

use super::MIGRATION_001_INITIAL;

/// Failures raised by the ledger store. `Database` carries the structured
/// diagnostics the HTTP layer surfaces on delete failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message}")]
    Database {
        message: String,
        code: Option<String>,
        details: Option<String>,
        hint: Option<String>,
    },

    #[error("Anggota tidak ditemukan: {0}")]
    MemberNotFound(MemberId),

    #[error("Rekening tabungan tidak ditemukan untuk anggota {member_id} dan jenis tabungan {savings_type_id}")]
    SavingsAccountNotFound {
        member_id: MemberId,
        savings_type_id: SavingsTypeId,
    },

    #[error("Pinjaman tidak ditemukan: {0}")]
    LoanNotFound(LoanId),

    #[error("Pinjaman {loan_id} bukan milik anggota {member_id}")]
    LoanMemberMismatch {
        loan_id: LoanId,
        member_id: MemberId,
    },

    #[error("Transaksi tidak ditemukan: {0}")]
    TransactionNotFound(TransactionId),

    #[error("Saldo tidak mencukupi: saldo {}, penarikan {}", format_rupiah(*balance), format_rupiah(*requested))]
    InsufficientBalance { balance: Rupiah, requested: Rupiah },

    #[error("Saldo melampaui batas penyimpanan: saldo {}, perubahan {}", format_rupiah(*balance), format_rupiah(*delta))]
    BalanceOverflow { balance: Rupiah, delta: Rupiah },

    #[error(
        "Transaksi tidak dapat dihapus: pembatalan setoran {} melebihi saldo rekening {}",
        format_rupiah(*amount),
        format_rupiah(*balance)
    )]
    ReversalOverdraws { balance: Rupiah, amount: Rupiah },

    #[error("Baris rusak di penyimpanan: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => StoreError::Database {
                message: db.message().to_string(),
                code: db.code().map(|c| c.into_owned()),
                details: None,
                hint: None,
            },
            other => StoreError::Database {
                message: other.to_string(),
                code: None,
                details: None,
                hint: None,
            },
        }
    }
}

/// Outcome of recording a transaction. `duplicate` is true when the
/// idempotency key had already been used and `id` is the original entry.
#[derive(Debug, Clone, Copy)]
pub struct RecordedTransaction {
    pub id: TransactionId,
    pub duplicate: bool,
}

/// Flat joined row for the transaction feed, as handed to the normalizer.
/// Joined context fields are optional; absence must survive to the view
/// layer so it can serialize as null.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub member_id: MemberId,
    pub direction: Direction,
    pub source_kind: SourceKind,
    pub amount: Rupiah,
    pub balance_before: Rupiah,
    pub balance_after: Rupiah,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub member_name: Option<String>,
    pub member_number: Option<String>,
    pub savings_account_id: Option<SavingsAccountId>,
    pub savings_balance: Option<Rupiah>,
    pub savings_type_id: Option<SavingsTypeId>,
    pub savings_type_name: Option<String>,
    pub loan_id: Option<LoanId>,
    pub loan_balance: Option<Rupiah>,
}

/// Repository over the ledger database. Balance fields are owned here
/// exclusively: they change only inside `record_transaction` and
/// `delete_transaction`, each of which runs as one database transaction.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path, creating the file
    /// if needed. Foreign keys are enforced; the busy and acquire
    /// timeouts bound how long a write waits behind a concurrent one.
    pub async fn connect(
        database_path: &str,
        busy_timeout: Duration,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", database_path))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await?;

        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(MIGRATION_001_INITIAL).execute(&self.pool).await?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(
        database_path: &str,
        busy_timeout: Duration,
        acquire_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let repo = Self::connect(database_path, busy_timeout, acquire_timeout).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Member / product registry
    // ========================

    pub async fn save_member(&self, member: &Member) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO anggota (id, nama, nomor_anggota, created_at) VALUES (?, ?, ?, ?)")
            .bind(member.id.to_string())
            .bind(&member.name)
            .bind(&member.member_number)
            .bind(member.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let rows =
            sqlx::query("SELECT id, nama, nomor_anggota, created_at FROM anggota ORDER BY nama")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(Self::row_to_member).collect()
    }

    pub async fn save_savings_type(&self, savings_type: &SavingsType) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO jenis_tabungan (id, nama, created_at) VALUES (?, ?, ?)")
            .bind(savings_type.id.to_string())
            .bind(&savings_type.name)
            .bind(savings_type.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_savings_types(&self) -> Result<Vec<SavingsType>, StoreError> {
        let rows = sqlx::query("SELECT id, nama, created_at FROM jenis_tabungan ORDER BY nama")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(SavingsType {
                    id: parse_uuid(&row.get::<String, _>("id"), "jenis_tabungan.id")?,
                    name: row.get("nama"),
                    created_at: parse_timestamp(
                        &row.get::<String, _>("created_at"),
                        "jenis_tabungan.created_at",
                    )?,
                })
            })
            .collect()
    }

    pub async fn save_savings_account(&self, account: &SavingsAccount) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tabungan (id, anggota_id, jenis_tabungan_id, saldo, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(account.member_id.to_string())
        .bind(account.savings_type_id.to_string())
        .bind(account.balance)
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a member's savings account under a given savings product.
    pub async fn get_savings_account(
        &self,
        member_id: MemberId,
        savings_type_id: SavingsTypeId,
    ) -> Result<Option<SavingsAccount>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, anggota_id, jenis_tabungan_id, saldo, created_at
            FROM tabungan
            WHERE anggota_id = ? AND jenis_tabungan_id = ?
            "#,
        )
        .bind(member_id.to_string())
        .bind(savings_type_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_savings_account).transpose()
    }

    pub async fn save_loan(&self, loan: &Loan) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO pinjaman (id, anggota_id, saldo, created_at) VALUES (?, ?, ?, ?)")
            .bind(loan.id.to_string())
            .bind(loan.member_id.to_string())
            .bind(loan.balance)
            .bind(loan.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_loan(&self, id: LoanId) -> Result<Option<Loan>, StoreError> {
        let row = sqlx::query("SELECT id, anggota_id, saldo, created_at FROM pinjaman WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_loan).transpose()
    }

    // ========================
    // Ledger operations
    // ========================

    /// Record a transaction: resolve the target account, snapshot its
    /// balance, apply the mutation, and append the ledger row — all
    /// inside one database transaction, so the mutation and the ledger
    /// entry land together or not at all.
    pub async fn record_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<RecordedTransaction, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Idempotency-key replay returns the original entry untouched.
        if let Some(key) = &draft.idempotency_key {
            let existing = sqlx::query("SELECT id FROM transaksi WHERE idempotency_key = ?")
                .bind(key)
                .fetch_optional(&mut *tx)
                .await?;
            if let Some(row) = existing {
                let id = parse_uuid(&row.get::<String, _>("id"), "transaksi.id")?;
                return Ok(RecordedTransaction {
                    id,
                    duplicate: true,
                });
            }
        }

        let member_exists = sqlx::query("SELECT 1 FROM anggota WHERE id = ?")
            .bind(draft.member_id.to_string())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !member_exists {
            return Err(StoreError::MemberNotFound(draft.member_id));
        }

        let signed = draft.direction.signed(draft.amount);

        let (source, balance_before, balance_after) = match draft.source_kind {
            SourceKind::Tabungan => {
                let savings_type_id = draft.savings_type_id.ok_or_else(|| {
                    StoreError::Corrupt("draft tabungan tanpa jenis_tabungan_id".into())
                })?;

                let row = sqlx::query(
                    "SELECT id, saldo FROM tabungan WHERE anggota_id = ? AND jenis_tabungan_id = ?",
                )
                .bind(draft.member_id.to_string())
                .bind(savings_type_id.to_string())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StoreError::SavingsAccountNotFound {
                    member_id: draft.member_id,
                    savings_type_id,
                })?;

                let account_id = parse_uuid(&row.get::<String, _>("id"), "tabungan.id")?;
                let balance: Rupiah = row.get("saldo");

                // Savings may not be overdrawn.
                if draft.direction == Direction::Keluar && balance < draft.amount {
                    return Err(StoreError::InsufficientBalance {
                        balance,
                        requested: draft.amount,
                    });
                }

                let new_balance = apply_delta(balance, signed)?;
                sqlx::query("UPDATE tabungan SET saldo = ? WHERE id = ?")
                    .bind(new_balance)
                    .bind(account_id.to_string())
                    .execute(&mut *tx)
                    .await?;

                (
                    SourceRef::Savings {
                        account_id,
                        savings_type_id,
                    },
                    balance,
                    new_balance,
                )
            }
            SourceKind::Pembiayaan => {
                let loan_id = draft
                    .loan_id
                    .ok_or_else(|| StoreError::Corrupt("draft pembiayaan tanpa pinjaman_id".into()))?;

                let row = sqlx::query("SELECT anggota_id, saldo FROM pinjaman WHERE id = ?")
                    .bind(loan_id.to_string())
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or(StoreError::LoanNotFound(loan_id))?;

                let owner = parse_uuid(&row.get::<String, _>("anggota_id"), "pinjaman.anggota_id")?;
                if owner != draft.member_id {
                    return Err(StoreError::LoanMemberMismatch {
                        loan_id,
                        member_id: draft.member_id,
                    });
                }

                let balance: Rupiah = row.get("saldo");

                // Outstanding principal may reach zero or go negative on
                // overpayment; settlement is reconciled administratively.
                let new_balance = apply_delta(balance, signed)?;
                sqlx::query("UPDATE pinjaman SET saldo = ? WHERE id = ?")
                    .bind(new_balance)
                    .bind(loan_id.to_string())
                    .execute(&mut *tx)
                    .await?;

                (SourceRef::Financing { loan_id }, balance, new_balance)
            }
        };

        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            r#"
            INSERT INTO transaksi (
                id, anggota_id, tipe_transaksi, source_type, jumlah,
                saldo_sebelum, saldo_sesudah, deskripsi,
                tabungan_id, jenis_tabungan_id, pembiayaan_id,
                idempotency_key, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(draft.member_id.to_string())
        .bind(draft.direction.as_str())
        .bind(draft.source_kind.as_str())
        .bind(draft.amount)
        .bind(balance_before)
        .bind(balance_after)
        .bind(&draft.description)
        .bind(source.savings_account_id().map(|v| v.to_string()))
        .bind(source.savings_type_id().map(|v| v.to_string()))
        .bind(source.loan_id().map(|v| v.to_string()))
        .bind(&draft.idempotency_key)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {
                tx.commit().await?;
                Ok(RecordedTransaction {
                    id,
                    duplicate: false,
                })
            }
            Err(err) => {
                // Two concurrent creates with the same key can both miss
                // the replay check above; the unique index catches the
                // loser here. Roll back its balance mutation and hand
                // back the winner's entry.
                if let Some(key) = &draft.idempotency_key {
                    if is_idempotency_conflict(&err) {
                        drop(tx);
                        let existing =
                            sqlx::query("SELECT id FROM transaksi WHERE idempotency_key = ?")
                                .bind(key)
                                .fetch_optional(&self.pool)
                                .await?;
                        if let Some(row) = existing {
                            let id = parse_uuid(&row.get::<String, _>("id"), "transaksi.id")?;
                            return Ok(RecordedTransaction {
                                id,
                                duplicate: true,
                            });
                        }
                    }
                }
                Err(err.into())
            }
        }
    }

    /// Most recent transactions, pre-joined with member, savings, and
    /// loan context. `limit` caps the page size.
    pub async fn list_transactions(&self, limit: i64) -> Result<Vec<TransactionRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.anggota_id, t.tipe_transaksi, t.source_type, t.jumlah,
                   t.saldo_sebelum, t.saldo_sesudah, t.deskripsi, t.created_at, t.updated_at,
                   a.nama AS anggota_nama, a.nomor_anggota,
                   t.tabungan_id, tab.saldo AS tabungan_saldo,
                   t.jenis_tabungan_id, jt.nama AS jenis_tabungan_nama,
                   t.pembiayaan_id, p.saldo AS pembiayaan_saldo
            FROM transaksi t
            LEFT JOIN anggota a ON a.id = t.anggota_id
            LEFT JOIN tabungan tab ON tab.id = t.tabungan_id
            LEFT JOIN jenis_tabungan jt ON jt.id = t.jenis_tabungan_id
            LEFT JOIN pinjaman p ON p.id = t.pembiayaan_id
            ORDER BY t.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_transaction_row).collect()
    }

    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<Option<Transaction>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, anggota_id, tipe_transaksi, source_type, jumlah,
                   saldo_sebelum, saldo_sesudah, deskripsi,
                   tabungan_id, jenis_tabungan_id, pembiayaan_id,
                   idempotency_key, created_at, updated_at
            FROM transaksi
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }

    /// Delete a transaction and reverse the balance mutation it caused,
    /// in one database transaction. A deleted deposit that would overdraw
    /// the savings account fails the whole operation.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, anggota_id, tipe_transaksi, source_type, jumlah,
                   saldo_sebelum, saldo_sesudah, deskripsi,
                   tabungan_id, jenis_tabungan_id, pembiayaan_id,
                   idempotency_key, created_at, updated_at
            FROM transaksi
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::TransactionNotFound(id))?;

        let transaction = Self::row_to_transaction(&row)?;
        let reversal = -transaction.signed_amount();

        match transaction.source {
            SourceRef::Savings { account_id, .. } => {
                let balance: Rupiah = sqlx::query("SELECT saldo FROM tabungan WHERE id = ?")
                    .bind(account_id.to_string())
                    .fetch_one(&mut *tx)
                    .await?
                    .get("saldo");

                let new_balance = apply_delta(balance, reversal)?;
                if new_balance < 0 {
                    return Err(StoreError::ReversalOverdraws {
                        balance,
                        amount: transaction.amount,
                    });
                }

                sqlx::query("UPDATE tabungan SET saldo = ? WHERE id = ?")
                    .bind(new_balance)
                    .bind(account_id.to_string())
                    .execute(&mut *tx)
                    .await?;
            }
            SourceRef::Financing { loan_id } => {
                let balance: Rupiah = sqlx::query("SELECT saldo FROM pinjaman WHERE id = ?")
                    .bind(loan_id.to_string())
                    .fetch_one(&mut *tx)
                    .await?
                    .get("saldo");

                let new_balance = apply_delta(balance, reversal)?;
                sqlx::query("UPDATE pinjaman SET saldo = ? WHERE id = ?")
                    .bind(new_balance)
                    .bind(loan_id.to_string())
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("DELETE FROM transaksi WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ========================
    // Row mappers
    // ========================

    fn row_to_member(row: &SqliteRow) -> Result<Member, StoreError> {
        Ok(Member {
            id: parse_uuid(&row.get::<String, _>("id"), "anggota.id")?,
            name: row.get("nama"),
            member_number: row.get("nomor_anggota"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"), "anggota.created_at")?,
        })
    }

    fn row_to_savings_account(row: &SqliteRow) -> Result<SavingsAccount, StoreError> {
        Ok(SavingsAccount {
            id: parse_uuid(&row.get::<String, _>("id"), "tabungan.id")?,
            member_id: parse_uuid(&row.get::<String, _>("anggota_id"), "tabungan.anggota_id")?,
            savings_type_id: parse_uuid(
                &row.get::<String, _>("jenis_tabungan_id"),
                "tabungan.jenis_tabungan_id",
            )?,
            balance: row.get("saldo"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"), "tabungan.created_at")?,
        })
    }

    fn row_to_loan(row: &SqliteRow) -> Result<Loan, StoreError> {
        Ok(Loan {
            id: parse_uuid(&row.get::<String, _>("id"), "pinjaman.id")?,
            member_id: parse_uuid(&row.get::<String, _>("anggota_id"), "pinjaman.anggota_id")?,
            balance: row.get("saldo"),
            created_at: parse_timestamp(&row.get::<String, _>("created_at"), "pinjaman.created_at")?,
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction, StoreError> {
        let direction = parse_direction(&row.get::<String, _>("tipe_transaksi"))?;
        let source_kind = parse_source_kind(&row.get::<String, _>("source_type"))?;

        let source = match source_kind {
            SourceKind::Tabungan => SourceRef::Savings {
                account_id: parse_opt_uuid(row.get("tabungan_id"), "transaksi.tabungan_id")?
                    .ok_or_else(|| {
                        StoreError::Corrupt("transaksi tabungan tanpa tabungan_id".into())
                    })?,
                savings_type_id: parse_opt_uuid(
                    row.get("jenis_tabungan_id"),
                    "transaksi.jenis_tabungan_id",
                )?
                .ok_or_else(|| {
                    StoreError::Corrupt("transaksi tabungan tanpa jenis_tabungan_id".into())
                })?,
            },
            SourceKind::Pembiayaan => SourceRef::Financing {
                loan_id: parse_opt_uuid(row.get("pembiayaan_id"), "transaksi.pembiayaan_id")?
                    .ok_or_else(|| {
                        StoreError::Corrupt("transaksi pembiayaan tanpa pembiayaan_id".into())
                    })?,
            },
        };

        Ok(Transaction {
            id: parse_uuid(&row.get::<String, _>("id"), "transaksi.id")?,
            member_id: parse_uuid(&row.get::<String, _>("anggota_id"), "transaksi.anggota_id")?,
            direction,
            source,
            amount: row.get("jumlah"),
            balance_before: row.get("saldo_sebelum"),
            balance_after: row.get("saldo_sesudah"),
            description: row.get("deskripsi"),
            idempotency_key: row.get("idempotency_key"),
            created_at: parse_timestamp(
                &row.get::<String, _>("created_at"),
                "transaksi.created_at",
            )?,
            updated_at: parse_timestamp(
                &row.get::<String, _>("updated_at"),
                "transaksi.updated_at",
            )?,
        })
    }

    fn row_to_transaction_row(row: &SqliteRow) -> Result<TransactionRow, StoreError> {
        Ok(TransactionRow {
            id: parse_uuid(&row.get::<String, _>("id"), "transaksi.id")?,
            member_id: parse_uuid(&row.get::<String, _>("anggota_id"), "transaksi.anggota_id")?,
            direction: parse_direction(&row.get::<String, _>("tipe_transaksi"))?,
            source_kind: parse_source_kind(&row.get::<String, _>("source_type"))?,
            amount: row.get("jumlah"),
            balance_before: row.get("saldo_sebelum"),
            balance_after: row.get("saldo_sesudah"),
            description: row.get("deskripsi"),
            created_at: parse_timestamp(
                &row.get::<String, _>("created_at"),
                "transaksi.created_at",
            )?,
            updated_at: parse_timestamp(
                &row.get::<String, _>("updated_at"),
                "transaksi.updated_at",
            )?,
            member_name: row.get("anggota_nama"),
            member_number: row.get("nomor_anggota"),
            savings_account_id: parse_opt_uuid(row.get("tabungan_id"), "transaksi.tabungan_id")?,
            savings_balance: row.get("tabungan_saldo"),
            savings_type_id: parse_opt_uuid(
                row.get("jenis_tabungan_id"),
                "transaksi.jenis_tabungan_id",
            )?,
            savings_type_name: row.get("jenis_tabungan_nama"),
            loan_id: parse_opt_uuid(row.get("pembiayaan_id"), "transaksi.pembiayaan_id")?,
            loan_balance: row.get("pembiayaan_saldo"),
        })
    }
}

fn apply_delta(balance: Rupiah, delta: Rupiah) -> Result<Rupiah, StoreError> {
    balance
        .checked_add(delta)
        .ok_or(StoreError::BalanceOverflow { balance, delta })
}

fn is_idempotency_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
                && db.message().contains("idempotency")
        }
        _ => false,
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(s).map_err(|_| StoreError::Corrupt(format!("{} bukan UUID: {}", what, s)))
}

fn parse_opt_uuid(s: Option<String>, what: &str) -> Result<Option<Uuid>, StoreError> {
    s.as_deref().map(|v| parse_uuid(v, what)).transpose()
}

fn parse_timestamp(s: &str, what: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("{} bukan timestamp RFC3339: {}", what, s)))
}

fn parse_direction(s: &str) -> Result<Direction, StoreError> {
    Direction::from_str(s)
        .ok_or_else(|| StoreError::Corrupt(format!("tipe_transaksi tidak dikenal: {}", s)))
}

fn parse_source_kind(s: &str) -> Result<SourceKind, StoreError> {
    SourceKind::from_str(s)
        .ok_or_else(|| StoreError::Corrupt(format!("source_type tidak dikenal: {}", s)))
}
