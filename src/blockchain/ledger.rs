use std::collections::HashMap;

use super::Block;
use crate::error::LedgerError;
use crate::transaction::Transaction;

/// One balance change recorded against an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub block_number: u64,
    pub delta: i128,
}

/// In-memory account balances plus a per-account log of balance changes.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    balances: HashMap<String, u64>,
    history: HashMap<String, Vec<HistoryEntry>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create-zero. This is the only way an account comes into
    /// existence in the committed ledger.
    fn account_mut(&mut self, account: &str) -> &mut u64 {
        self.balances.entry(account.to_string()).or_insert(0)
    }

    fn record(&mut self, account: &str, block_number: u64, delta: i128) {
        self.history
            .entry(account.to_string())
            .or_default()
            .push(HistoryEntry {
                block_number,
                delta,
            });
    }

    pub fn balance(&self, account: &str) -> Option<u64> {
        self.balances.get(account).copied()
    }

    pub fn balances(&self) -> HashMap<String, u64> {
        self.balances.clone()
    }

    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    /// Start a copy-on-write simulation over the committed balances.
    pub fn simulate(&self) -> Simulation<'_> {
        Simulation {
            base: &self.balances,
            overlay: HashMap::new(),
        }
    }

    /// Keep, in order, every candidate that can be applied at the point it
    /// is reached. Earlier accepted transfers count towards later ones.
    /// Never mutates the ledger.
    pub fn validate(&self, candidates: &[Transaction]) -> Vec<Transaction> {
        let mut sim = self.simulate();
        candidates
            .iter()
            .filter(|tx| sim.transfer(tx).is_ok())
            .cloned()
            .collect()
    }

    /// All-or-nothing version of [`Ledger::validate`]: the first transfer
    /// that cannot be applied fails the whole batch.
    pub fn check_block(&self, transactions: &[Transaction]) -> Result<(), LedgerError> {
        let mut sim = self.simulate();
        for (index, tx) in transactions.iter().enumerate() {
            sim.transfer(tx).map_err(|e| e.at(index))?;
        }
        Ok(())
    }

    /// Apply every transfer of `block` in order and log both sides of each
    /// one under the block number.
    ///
    /// The whole batch is simulated first; if any transfer would touch an
    /// unknown sender or overdraw an account nothing is written and the
    /// error is returned.
    pub fn apply(&mut self, block: &Block) -> Result<(), LedgerError> {
        let changes = {
            let mut sim = self.simulate();
            for (index, tx) in block.transactions().iter().enumerate() {
                sim.transfer(tx).map_err(|e| e.at(index))?;
            }
            sim.into_changes()
        };

        for (account, balance) in changes {
            *self.account_mut(&account) = balance;
        }
        for tx in block.transactions() {
            let amount = tx.amount() as i128;
            self.record(tx.sender(), block.number(), -amount);
            self.record(tx.recipient(), block.number(), amount);
        }
        Ok(())
    }

    /// Create `amount` out of thin air for `account`. Only genesis does this.
    pub fn mint(&mut self, account: &str, amount: u64, block_number: u64) -> Result<(), LedgerError> {
        let balance = self.account_mut(account);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(account.to_string()))?;
        self.record(account, block_number, amount as i128);
        Ok(())
    }

    /// Net balance change per block for `account`, one entry per block, in
    /// the order blocks first touched the account.
    pub fn history(&self, account: &str) -> Vec<(u64, i128)> {
        let mut out: Vec<(u64, i128)> = Vec::new();
        let Some(entries) = self.history.get(account) else {
            return out;
        };
        for entry in entries {
            match out.iter_mut().find(|(n, _)| *n == entry.block_number) {
                Some((_, delta)) => *delta += entry.delta,
                None => out.push((entry.block_number, entry.delta)),
            }
        }
        out
    }
}

/// Balances as they would be after a sequence of transfers, without
/// touching the ledger. Only accounts touched by the simulation are copied.
#[derive(Debug)]
pub struct Simulation<'a> {
    base: &'a HashMap<String, u64>,
    overlay: HashMap<String, u64>,
}

impl Simulation<'_> {
    pub fn balance(&self, account: &str) -> Option<u64> {
        self.overlay
            .get(account)
            .or_else(|| self.base.get(account))
            .copied()
    }

    /// Debit the sender and credit the recipient (created at zero if
    /// absent). On error the simulated balances are left untouched.
    pub fn transfer(&mut self, tx: &Transaction) -> Result<(), LedgerError> {
        let sender = tx.sender();
        let recipient = tx.recipient();
        let amount = tx.amount();

        let sender_balance = self
            .balance(sender)
            .ok_or_else(|| LedgerError::UnknownSender(sender.to_string()))?;
        if sender_balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: sender.to_string(),
                balance: sender_balance,
                amount,
            });
        }

        if sender == recipient {
            return Ok(());
        }
        let recipient_balance = self
            .balance(recipient)
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::BalanceOverflow(recipient.to_string()))?;

        self.overlay.insert(sender.to_string(), sender_balance - amount);
        self.overlay.insert(recipient.to_string(), recipient_balance);
        Ok(())
    }

    fn into_changes(self) -> HashMap<String, u64> {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::Ledger;
    use crate::blockchain::{Block, GENESIS_ACCOUNT, GENESIS_SUPPLY};
    use crate::error::LedgerError;
    use crate::transaction::Transaction;

    fn funded() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.mint(GENESIS_ACCOUNT, GENESIS_SUPPLY, 1).unwrap();
        ledger
    }

    fn block(number: u64, txs: Vec<Transaction>) -> Block {
        Block::new(number, txs, "prev", "5000")
    }

    #[test]
    fn apply_moves_funds_and_logs_both_sides() {
        let mut ledger = funded();
        let b = block(
            2,
            vec![Transaction::new("A", "B", 30), Transaction::new("B", "C", 10)],
        );
        ledger.apply(&b).unwrap();

        assert_eq!(ledger.balance("A"), Some(9970));
        assert_eq!(ledger.balance("B"), Some(20));
        assert_eq!(ledger.balance("C"), Some(10));
        assert_eq!(ledger.history("B"), vec![(2, 20)]);
        assert_eq!(ledger.history("A"), vec![(1, 10000), (2, -30)]);
        assert_eq!(ledger.total_supply(), GENESIS_SUPPLY as u128);
    }

    #[test]
    fn history_merges_entries_of_the_same_block() {
        let mut ledger = funded();
        ledger
            .apply(&block(
                2,
                vec![
                    Transaction::new("A", "B", 100),
                    Transaction::new("B", "A", 40),
                    Transaction::new("A", "C", 5),
                ],
            ))
            .unwrap();
        ledger
            .apply(&block(3, vec![Transaction::new("B", "C", 60)]))
            .unwrap();

        assert_eq!(ledger.history("A"), vec![(1, 10000), (2, -65)]);
        assert_eq!(ledger.history("B"), vec![(2, 60), (3, -60)]);
        assert!(ledger.history("nobody").is_empty());
    }

    #[test]
    fn validate_skips_what_cannot_apply_and_keeps_order() {
        let ledger = funded();
        let candidates = vec![
            Transaction::new("B", "C", 5),
            Transaction::new("A", "B", 50),
            Transaction::new("B", "C", 20),
            Transaction::new("B", "D", 40),
            Transaction::new("Z", "A", 0),
        ];
        let accepted = ledger.validate(&candidates);
        assert_eq!(
            accepted,
            vec![Transaction::new("A", "B", 50), Transaction::new("B", "C", 20)]
        );
        // nothing was written
        assert_eq!(ledger.balance("B"), None);
        assert_eq!(ledger.balance("A"), Some(GENESIS_SUPPLY));
    }

    #[test]
    fn validate_never_overdraws() {
        let ledger = funded();
        let candidates: Vec<_> = (0..5)
            .map(|_| Transaction::new("A", "B", 3000))
            .collect();
        let accepted = ledger.validate(&candidates);
        assert_eq!(accepted.len(), 3);

        let mut sim = ledger.simulate();
        for tx in &accepted {
            sim.transfer(tx).unwrap();
        }
        assert_eq!(sim.balance("A"), Some(1000));
        assert_eq!(sim.balance("B"), Some(9000));
    }

    #[test]
    fn check_block_is_all_or_nothing() {
        let ledger = funded();
        let err = ledger
            .check_block(&[
                Transaction::new("A", "B", 10),
                Transaction::new("B", "C", 11),
            ])
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AtIndex { index: 1, ref source }
                if matches!(**source, LedgerError::InsufficientFunds { .. })
        ));

        let err = ledger
            .check_block(&[Transaction::new("Q", "A", 0)])
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::AtIndex { index: 0, ref source }
                if matches!(**source, LedgerError::UnknownSender(_))
        ));
    }

    #[test]
    fn apply_refuses_a_block_that_would_overdraw() {
        let mut ledger = funded();
        let bad = block(
            2,
            vec![
                Transaction::new("A", "B", 10),
                Transaction::new("B", "C", 500),
            ],
        );
        assert!(ledger.apply(&bad).is_err());
        assert_eq!(ledger.balance("A"), Some(GENESIS_SUPPLY));
        assert_eq!(ledger.balance("B"), None);
        assert!(ledger.history("B").is_empty());
    }

    #[test]
    fn self_transfer_keeps_balance_and_logs_zero_net() {
        let mut ledger = funded();
        ledger
            .apply(&block(2, vec![Transaction::new("A", "A", 70)]))
            .unwrap();
        assert_eq!(ledger.balance("A"), Some(GENESIS_SUPPLY));
        assert_eq!(ledger.history("A"), vec![(1, 10000), (2, 0)]);
    }

    #[test]
    fn zero_amount_creates_recipient() {
        let mut ledger = funded();
        ledger
            .apply(&block(2, vec![Transaction::new("A", "N", 0)]))
            .unwrap();
        assert_eq!(ledger.balance("N"), Some(0));
        assert_eq!(ledger.history("N"), vec![(2, 0)]);
    }
}
