use serde::{Deserialize, Serialize};
use std::fmt;

/// A transfer request between two accounts.
///
/// Nothing is checked at construction: sender existence, recipient existence
/// and balance sufficiency are all decided later against ledger state.
/// Field order matters: the derived `Ord` is lexicographic on
/// `(sender, recipient, amount)` and is what makes pool batching deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Transaction {
    sender: String,
    recipient: String,
    amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T({} -> {}: {})", self.sender, self.recipient, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::Transaction;

    #[test]
    fn orders_by_sender_then_recipient_then_amount() {
        let mut txs = vec![
            Transaction::new("B", "C", 20),
            Transaction::new("A", "C", 5),
            Transaction::new("A", "B", 50),
            Transaction::new("A", "B", 10),
        ];
        txs.sort();
        assert_eq!(
            txs,
            vec![
                Transaction::new("A", "B", 10),
                Transaction::new("A", "B", 50),
                Transaction::new("A", "C", 5),
                Transaction::new("B", "C", 20),
            ]
        );
    }

    #[test]
    fn equality_is_field_based() {
        assert_eq!(Transaction::new("A", "B", 1), Transaction::new("A", "B", 1));
        assert_ne!(Transaction::new("A", "B", 1), Transaction::new("A", "B", 2));
    }

    #[test]
    fn json_keeps_field_names() {
        let tx = Transaction::new("A", "B", 30);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "sender": "A", "recipient": "B", "amount": 30 })
        );
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn negative_amount_does_not_decode() {
        let res = serde_json::from_value::<Transaction>(
            serde_json::json!({ "sender": "A", "recipient": "B", "amount": -5 }),
        );
        assert!(res.is_err());
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Transaction::new("A", "B", 30).to_string(), "T(A -> B: 30)");
    }
}
