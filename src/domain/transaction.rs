use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LoanId, MemberId, Rupiah, SavingsAccountId, SavingsTypeId};

pub type TransactionId = Uuid;

/// Direction of a monetary movement, using the wire vocabulary of the
/// admin console: `masuk` (in) increases the account balance, `keluar`
/// (out) decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Masuk,
    Keluar,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Masuk => "masuk",
            Direction::Keluar => "keluar",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "masuk" => Some(Direction::Masuk),
            "keluar" => Some(Direction::Keluar),
            _ => None,
        }
    }

    /// Apply the direction's sign to an unsigned magnitude.
    pub fn signed(&self, magnitude: Rupiah) -> Rupiah {
        match self {
            Direction::Masuk => magnitude.abs(),
            Direction::Keluar => -magnitude.abs(),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which sub-ledger a transaction touches. The financing arm was renamed
/// from "pembiayaan" to "pinjaman" in the public API; `pembiayaan` remains
/// the canonical stored value and `pinjaman` is accepted as an input alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Tabungan,
    Pembiayaan,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Tabungan => "tabungan",
            SourceKind::Pembiayaan => "pembiayaan",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tabungan" => Some(SourceKind::Tabungan),
            "pembiayaan" | "pinjaman" => Some(SourceKind::Pembiayaan),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The account a transaction moves money against. A transaction touches
/// savings XOR financing, so this is a tagged union rather than two
/// nullable foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceRef {
    Savings {
        account_id: SavingsAccountId,
        savings_type_id: SavingsTypeId,
    },
    Financing {
        loan_id: LoanId,
    },
}

impl SourceRef {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceRef::Savings { .. } => SourceKind::Tabungan,
            SourceRef::Financing { .. } => SourceKind::Pembiayaan,
        }
    }

    pub fn savings_account_id(&self) -> Option<SavingsAccountId> {
        match self {
            SourceRef::Savings { account_id, .. } => Some(*account_id),
            SourceRef::Financing { .. } => None,
        }
    }

    pub fn savings_type_id(&self) -> Option<SavingsTypeId> {
        match self {
            SourceRef::Savings {
                savings_type_id, ..
            } => Some(*savings_type_id),
            SourceRef::Financing { .. } => None,
        }
    }

    pub fn loan_id(&self) -> Option<LoanId> {
        match self {
            SourceRef::Savings { .. } => None,
            SourceRef::Financing { loan_id } => Some(*loan_id),
        }
    }
}

/// A ledger entry: one monetary movement against a member's savings or
/// financing account. Entries are immutable once recorded (only
/// `updated_at` bookkeeping may change); corrections go through the
/// reconciled delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub member_id: MemberId,
    pub direction: Direction,
    pub source: SourceRef,
    /// Stored magnitude, always non-negative. The presented sign is
    /// derived from `direction`, never read back from storage.
    pub amount: Rupiah,
    /// Balance of the linked account immediately before this movement.
    pub balance_before: Rupiah,
    /// Balance immediately after; differs from `balance_before` by
    /// exactly `amount`, in the direction's sign.
    pub balance_after: Rupiah,
    pub description: Option<String>,
    /// Client-supplied replay guard for the create path; unique when set.
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// The amount with the direction's sign applied: `masuk` positive,
    /// `keluar` negative.
    pub fn signed_amount(&self) -> Rupiah {
        self.direction.signed(self.amount)
    }

    /// Check the snapshot invariant `balance_after = balance_before ± amount`.
    pub fn snapshots_consistent(&self) -> bool {
        self.balance_before + self.signed_amount() == self.balance_after
    }
}

/// A validated transaction intent, ready to hand to the store. Account
/// resolution and balance snapshots happen inside the store's transaction.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub member_id: MemberId,
    pub direction: Direction,
    pub source_kind: SourceKind,
    /// Present iff `source_kind` is `Tabungan`.
    pub savings_type_id: Option<SavingsTypeId>,
    /// Present iff `source_kind` is `Pembiayaan`.
    pub loan_id: Option<LoanId>,
    pub amount: Rupiah,
    pub description: Option<String>,
    pub idempotency_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        for d in [Direction::Masuk, Direction::Keluar] {
            assert_eq!(Direction::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Direction::from_str("MASUK"), Some(Direction::Masuk));
        assert_eq!(Direction::from_str("transfer"), None);
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Masuk.signed(5000), 5000);
        assert_eq!(Direction::Keluar.signed(5000), -5000);
        // Stored magnitudes are unsigned; a stray negative must not
        // flip the presented sign.
        assert_eq!(Direction::Masuk.signed(-5000), 5000);
        assert_eq!(Direction::Keluar.signed(-5000), -5000);
    }

    #[test]
    fn test_source_kind_accepts_rename_alias() {
        assert_eq!(SourceKind::from_str("tabungan"), Some(SourceKind::Tabungan));
        assert_eq!(
            SourceKind::from_str("pembiayaan"),
            Some(SourceKind::Pembiayaan)
        );
        assert_eq!(
            SourceKind::from_str("pinjaman"),
            Some(SourceKind::Pembiayaan)
        );
        assert_eq!(SourceKind::from_str("deposito"), None);
    }

    #[test]
    fn test_source_ref_is_exclusive() {
        let savings = SourceRef::Savings {
            account_id: Uuid::new_v4(),
            savings_type_id: Uuid::new_v4(),
        };
        assert!(savings.savings_account_id().is_some());
        assert!(savings.loan_id().is_none());
        assert_eq!(savings.kind(), SourceKind::Tabungan);

        let financing = SourceRef::Financing {
            loan_id: Uuid::new_v4(),
        };
        assert!(financing.savings_account_id().is_none());
        assert!(financing.loan_id().is_some());
        assert_eq!(financing.kind(), SourceKind::Pembiayaan);
    }

    #[test]
    fn test_snapshot_invariant() {
        let tx = Transaction {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            direction: Direction::Keluar,
            source: SourceRef::Financing {
                loan_id: Uuid::new_v4(),
            },
            amount: 250000,
            balance_before: 1000000,
            balance_after: 750000,
            description: None,
            idempotency_key: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(tx.signed_amount(), -250000);
        assert!(tx.snapshots_consistent());
    }
}
