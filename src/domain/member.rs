use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Rupiah;

pub type MemberId = Uuid;
pub type SavingsTypeId = Uuid;
pub type SavingsAccountId = Uuid;
pub type LoanId = Uuid;

/// A cooperative member (anggota). The ledger references members by id;
/// name and member number are carried for the transaction feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    /// Cooperative-assigned member number (nomor anggota), e.g. "AG-0031".
    pub member_number: String,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(name: String, member_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            member_number,
            created_at: Utc::now(),
        }
    }
}

/// A savings product (jenis tabungan), e.g. "Simpanan Wajib".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsType {
    pub id: SavingsTypeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl SavingsType {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// A member's savings account (tabungan) under one savings product.
/// The balance is owned by the store and only ever changes inside the
/// store's recording/reconciliation transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsAccount {
    pub id: SavingsAccountId,
    pub member_id: MemberId,
    pub savings_type_id: SavingsTypeId,
    pub balance: Rupiah,
    pub created_at: DateTime<Utc>,
}

impl SavingsAccount {
    pub fn open(member_id: MemberId, savings_type_id: SavingsTypeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            savings_type_id,
            balance: 0,
            created_at: Utc::now(),
        }
    }
}

/// A financing account (pinjaman, formerly pembiayaan). `balance` tracks
/// outstanding principal: disbursements and charges are `masuk`,
/// repayments are `keluar`. Amortization and margin computation are not
/// modeled here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    pub balance: Rupiah,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    pub fn open(member_id: MemberId, principal: Rupiah) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            balance: principal,
            created_at: Utc::now(),
        }
    }
}
