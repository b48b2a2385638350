use sha2::{Digest, Sha256};

/// Which side of the ledger a transaction belongs to. The inbound and
/// outbound stores are symmetric; this enum is the only variation point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Inbound => "money_in",
            Self::Outbound => "money_out",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Inbound => "in",
            Self::Outbound => "out",
        }
    }

    /// Does this transaction belong in this direction's table?
    pub fn matches(&self, txn: &Transaction) -> bool {
        match self {
            Self::Inbound => txn.paid_in > 0.0 && txn.paid_out == 0.0,
            Self::Outbound => txn.paid_out > 0.0 && txn.paid_in == 0.0,
        }
    }

    /// The amount column value for this direction.
    pub fn amount(&self, txn: &Transaction) -> f64 {
        match self {
            Self::Inbound => txn.paid_in,
            Self::Outbound => txn.paid_out,
        }
    }
}

/// One bank transaction, immutable once built. There is no edit or delete
/// flow anywhere: rows are only ever inserted, keyed by the deterministic id.
#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub transaction_type: String,
    pub raw_description: String,
    pub processed_description: String,
    pub category: String,
    pub paid_in: f64,
    pub paid_out: f64,
    pub balance: f64,
}

/// Deterministic dedup id: the same logical row re-imported must hash to the
/// same id. Category and processed description are deliberately excluded so
/// that changing cleanup rules never changes identity.
pub fn transaction_id(
    date: &str,
    transaction_type: &str,
    raw_description: &str,
    paid_out: f64,
    paid_in: f64,
    balance: f64,
) -> String {
    let key = format!(
        "{date}|{transaction_type}|{raw_description}|{paid_out:.2}|{paid_in:.2}|{balance:.2}"
    );
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
