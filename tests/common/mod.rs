// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use koperasi_ledger::application::{CreateTransactionInput, LedgerService};
use koperasi_ledger::domain::{Loan, Member, Rupiah, SavingsAccount, SavingsType};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Test fixture: one member with a savings account and an outstanding loan.
pub struct Cooperative {
    pub member: Member,
    pub savings_type: SavingsType,
    pub savings_account: SavingsAccount,
    pub loan: Loan,
}

impl Cooperative {
    pub const LOAN_PRINCIPAL: Rupiah = 5_000_000;

    pub async fn seed(service: &LedgerService) -> Result<Self> {
        let member = service
            .create_member("Budi Santoso".into(), "AG-0001".into())
            .await?;
        let savings_type = service.create_savings_type("Simpanan Sukarela".into()).await?;
        let savings_account = service
            .open_savings_account(member.id, savings_type.id)
            .await?;
        let loan = service.open_loan(member.id, Self::LOAN_PRINCIPAL).await?;

        Ok(Self {
            member,
            savings_type,
            savings_account,
            loan,
        })
    }

    /// A savings deposit (masuk) request for this member.
    pub fn deposit(&self, amount: Rupiah) -> CreateTransactionInput {
        CreateTransactionInput {
            anggota_id: Some(self.member.id.to_string()),
            tipe_transaksi: Some("masuk".into()),
            source_type: Some("tabungan".into()),
            jumlah: Some(amount),
            jenis_tabungan_id: Some(self.savings_type.id.to_string()),
            ..Default::default()
        }
    }

    /// A savings withdrawal (keluar) request for this member.
    pub fn withdrawal(&self, amount: Rupiah) -> CreateTransactionInput {
        CreateTransactionInput {
            tipe_transaksi: Some("keluar".into()),
            ..self.deposit(amount)
        }
    }

    /// A loan repayment (keluar against the financing account).
    pub fn loan_repayment(&self, amount: Rupiah) -> CreateTransactionInput {
        CreateTransactionInput {
            anggota_id: Some(self.member.id.to_string()),
            tipe_transaksi: Some("keluar".into()),
            source_type: Some("pembiayaan".into()),
            jumlah: Some(amount),
            pinjaman_id: Some(self.loan.id.to_string()),
            ..Default::default()
        }
    }

    pub async fn savings_balance(&self, service: &LedgerService) -> Result<Rupiah> {
        let account = service
            .get_savings_account(self.member.id, self.savings_type.id)
            .await?
            .expect("savings account should exist");
        Ok(account.balance)
    }

    pub async fn loan_balance(&self, service: &LedgerService) -> Result<Rupiah> {
        let loan = service
            .get_loan(self.loan.id)
            .await?
            .expect("loan should exist");
        Ok(loan.balance)
    }
}
