use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    Direction, Loan, LoanId, Member, MemberId, Rupiah, SavingsAccount, SavingsType, SavingsTypeId,
    SourceKind, Transaction, TransactionDraft, TransactionId,
};
use crate::storage::{RecordedTransaction, Repository, TransactionRow};

use super::AppError;

/// Hard cap on the transaction feed page size.
pub const FEED_LIMIT: i64 = 100;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw create request as it arrives on the wire. Every field is optional
/// so validation can reject with a message naming the missing field
/// instead of a generic deserialization error.
///
/// The loan reference is accepted under both its current name
/// (`pinjaman_id`) and its legacy one (`pembiayaan_id`); `pinjaman_id`
/// wins when both are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTransactionInput {
    pub anggota_id: Option<String>,
    pub tipe_transaksi: Option<String>,
    pub source_type: Option<String>,
    pub jumlah: Option<Rupiah>,
    pub deskripsi: Option<String>,
    pub jenis_tabungan_id: Option<String>,
    pub pinjaman_id: Option<String>,
    pub pembiayaan_id: Option<String>,
    pub idempotency_key: Option<String>,
}

impl CreateTransactionInput {
    /// The effective loan reference after alias resolution.
    pub fn loan_ref(&self) -> Option<&str> {
        self.pinjaman_id
            .as_deref()
            .or(self.pembiayaan_id.as_deref())
    }

    /// Fail-fast contract check, performed before any store call.
    pub fn validate(&self) -> Result<TransactionDraft, AppError> {
        let member_id = require_uuid(self.anggota_id.as_deref(), "anggota_id")?;

        let direction_raw = self
            .tipe_transaksi
            .as_deref()
            .ok_or(AppError::MissingField("tipe_transaksi"))?;
        let direction = Direction::from_str(direction_raw).ok_or_else(|| AppError::InvalidField {
            field: "tipe_transaksi",
            value: direction_raw.to_string(),
        })?;

        let source_raw = self
            .source_type
            .as_deref()
            .ok_or(AppError::MissingField("source_type"))?;
        let source_kind =
            SourceKind::from_str(source_raw).ok_or_else(|| AppError::InvalidField {
                field: "source_type",
                value: source_raw.to_string(),
            })?;

        let amount = self.jumlah.ok_or(AppError::MissingField("jumlah"))?;
        if amount <= 0 {
            return Err(AppError::InvalidAmount);
        }

        let (savings_type_id, loan_id) = match source_kind {
            SourceKind::Tabungan => {
                let raw = self
                    .jenis_tabungan_id
                    .as_deref()
                    .ok_or(AppError::SavingsTypeRequired)?;
                (Some(parse_uuid_field(raw, "jenis_tabungan_id")?), None)
            }
            SourceKind::Pembiayaan => {
                let raw = self
                    .loan_ref()
                    .ok_or(AppError::MissingField("pinjaman_id"))?;
                (None, Some(parse_uuid_field(raw, "pinjaman_id")?))
            }
        };

        Ok(TransactionDraft {
            member_id,
            direction,
            source_kind,
            savings_type_id,
            loan_id,
            amount,
            description: self.deskripsi.clone(),
            idempotency_key: self.idempotency_key.clone(),
        })
    }
}

fn require_uuid(raw: Option<&str>, field: &'static str) -> Result<Uuid, AppError> {
    let raw = raw.ok_or(AppError::MissingField(field))?;
    parse_uuid_field(raw, field)
}

fn parse_uuid_field(raw: &str, field: &'static str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidField {
        field,
        value: raw.to_string(),
    })
}

/// Application service for the ledger: the gateway every client (HTTP
/// API, exporter, tests) goes through.
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path (connect + migrate) with
    /// default timeouts.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        Self::init_with_timeouts(database_path, DEFAULT_BUSY_TIMEOUT, DEFAULT_ACQUIRE_TIMEOUT).await
    }

    pub async fn init_with_timeouts(
        database_path: &str,
        busy_timeout: Duration,
        acquire_timeout: Duration,
    ) -> Result<Self, AppError> {
        let repo = Repository::init(database_path, busy_timeout, acquire_timeout).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Ledger operations
    // ========================

    /// Validate and record a transaction. Validation failures never reach
    /// the store; the store applies the balance mutation and the ledger
    /// insert as one unit.
    pub async fn record_transaction(
        &self,
        input: &CreateTransactionInput,
    ) -> Result<RecordedTransaction, AppError> {
        let draft = input.validate()?;
        let recorded = self.repo.record_transaction(&draft).await?;

        if recorded.duplicate {
            tracing::info!(
                transaction_id = %recorded.id,
                idempotency_key = draft.idempotency_key.as_deref(),
                "replayed create request, returning original transaction"
            );
        } else {
            tracing::info!(
                transaction_id = %recorded.id,
                anggota_id = %draft.member_id,
                tipe = %draft.direction,
                source = %draft.source_kind,
                jumlah = draft.amount,
                "recorded transaction"
            );
        }

        Ok(recorded)
    }

    /// The transaction feed: most recent first, joined with member and
    /// account context, capped at [`FEED_LIMIT`] rows.
    pub async fn list_transactions(
        &self,
        limit: Option<i64>,
    ) -> Result<Vec<TransactionRow>, AppError> {
        let limit = limit.unwrap_or(FEED_LIMIT).clamp(1, FEED_LIMIT);
        Ok(self.repo.list_transactions(limit).await?)
    }

    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }

    /// Delete a transaction: existence check first, then the store's
    /// reconciled removal (row deletion plus balance reversal, atomic).
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<(), AppError> {
        let transaction = self.get_transaction(id).await?;
        self.repo.delete_transaction(transaction.id).await?;

        tracing::info!(
            transaction_id = %id,
            anggota_id = %transaction.member_id,
            reversed = transaction.signed_amount(),
            "deleted transaction and reversed its balance mutation"
        );
        Ok(())
    }

    // ========================
    // Member / product registry (thin console glue)
    // ========================

    pub async fn create_member(
        &self,
        name: String,
        member_number: String,
    ) -> Result<Member, AppError> {
        let member = Member::new(name, member_number);
        self.repo.save_member(&member).await?;
        Ok(member)
    }

    pub async fn list_members(&self) -> Result<Vec<Member>, AppError> {
        Ok(self.repo.list_members().await?)
    }

    pub async fn create_savings_type(&self, name: String) -> Result<SavingsType, AppError> {
        let savings_type = SavingsType::new(name);
        self.repo.save_savings_type(&savings_type).await?;
        Ok(savings_type)
    }

    pub async fn list_savings_types(&self) -> Result<Vec<SavingsType>, AppError> {
        Ok(self.repo.list_savings_types().await?)
    }

    pub async fn open_savings_account(
        &self,
        member_id: MemberId,
        savings_type_id: SavingsTypeId,
    ) -> Result<SavingsAccount, AppError> {
        let account = SavingsAccount::open(member_id, savings_type_id);
        self.repo.save_savings_account(&account).await?;
        Ok(account)
    }

    pub async fn get_savings_account(
        &self,
        member_id: MemberId,
        savings_type_id: SavingsTypeId,
    ) -> Result<Option<SavingsAccount>, AppError> {
        Ok(self.repo.get_savings_account(member_id, savings_type_id).await?)
    }

    pub async fn open_loan(
        &self,
        member_id: MemberId,
        principal: Rupiah,
    ) -> Result<Loan, AppError> {
        let loan = Loan::open(member_id, principal);
        self.repo.save_loan(&loan).await?;
        Ok(loan)
    }

    pub async fn get_loan(&self, id: LoanId) -> Result<Option<Loan>, AppError> {
        Ok(self.repo.get_loan(id).await?)
    }
}
