//! Wallet aggregate entity.
//!
//! One wallet per user. The wallet owns the credit balance, the saved
//! payment methods, and the append-only ledger. All balance mutations go
//! through aggregate methods so that:
//!
//! - `balance` never drops below zero
//! - `total_purchased` only increases, except through explicit admin
//!   correction (`apply_admin_delta`)
//! - every balance change appends exactly one ledger entry whose signed
//!   credit delta equals the actual change

use crate::domain::foundation::{InvoiceId, Timestamp, UserId, WalletId};
use serde::{Deserialize, Serialize};

use super::{LedgerEntry, SavedCard, WalletError};

/// Per-user credit wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique identifier for this wallet.
    pub id: WalletId,

    /// User who owns this wallet (unique).
    pub user_id: UserId,

    /// Current credit balance. Never negative.
    pub balance: i64,

    /// Lifetime credits bought. Monotonic except admin correction;
    /// feeds usage-percentage reporting.
    pub total_purchased: i64,

    /// Payment provider's customer reference, once created.
    pub customer_ref: Option<String>,

    /// Saved cards. At most one is primary.
    pub cards: Vec<SavedCard>,

    /// Append-only audit trail of balance changes.
    pub ledger: Vec<LedgerEntry>,

    /// When the wallet was created.
    pub created_at: Timestamp,

    /// When the wallet was last updated.
    pub updated_at: Timestamp,
}

impl Wallet {
    /// Creates an empty wallet for a user.
    pub fn new(id: WalletId, user_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            user_id,
            balance: 0,
            total_purchased: 0,
            customer_ref: None,
            cards: Vec::new(),
            ledger: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // ───────────────────────── balance accounting ─────────────────────────

    /// Adds purchased or granted credits.
    ///
    /// Increases both `balance` and `total_purchased` and appends a
    /// `purchase` ledger entry.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailed` if `credits` is not positive.
    pub fn credit(
        &mut self,
        credits: i64,
        amount_cents: i64,
        order_id: Option<InvoiceId>,
        note: impl Into<String>,
    ) -> Result<(), WalletError> {
        if credits <= 0 {
            return Err(WalletError::validation("credits", "must be positive"));
        }
        self.balance += credits;
        self.total_purchased += credits;
        self.ledger
            .push(LedgerEntry::purchase(credits, amount_cents, order_id, note));
        self.touch();
        Ok(())
    }

    /// Removes credits at an admin's request.
    ///
    /// Unlike cancellation debits, an admin removal is rejected outright
    /// when it exceeds the balance. `total_purchased` is untouched.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientCredits` if `credits` exceeds the balance.
    pub fn debit_manual(&mut self, credits: i64, note: impl Into<String>) -> Result<(), WalletError> {
        if credits <= 0 {
            return Err(WalletError::validation("credits", "must be positive"));
        }
        if credits > self.balance {
            return Err(WalletError::insufficient_credits(credits, self.balance));
        }
        self.balance -= credits;
        self.ledger.push(LedgerEntry::manual_revoke(credits, None, note));
        self.touch();
        Ok(())
    }

    /// Revokes credits for a cancelled manual order.
    ///
    /// The debit floors at zero: if the user already spent part of the
    /// grant, only what remains is removed. Returns the number of credits
    /// actually debited, which is what the ledger entry records.
    pub fn revoke_for_cancellation(
        &mut self,
        credits: i64,
        order_id: InvoiceId,
        note: impl Into<String>,
    ) -> i64 {
        let debited = credits.clamp(0, self.balance);
        self.balance -= debited;
        self.ledger
            .push(LedgerEntry::manual_revoke(debited, Some(order_id), note));
        self.touch();
        debited
    }

    /// Revokes credits alongside an external monetary refund.
    ///
    /// Floor-at-zero debit; the `refund_adjust` ledger entry records the
    /// actual credit delta, the refunded amount, and the external refund
    /// reference. Returns the number of credits actually debited.
    pub fn adjust_for_refund(
        &mut self,
        credits: i64,
        refunded_cents: i64,
        refund_ref: impl Into<String>,
        order_id: InvoiceId,
        note: impl Into<String>,
    ) -> i64 {
        let debited = credits.clamp(0, self.balance);
        self.balance -= debited;
        self.ledger.push(LedgerEntry::refund_adjust(
            debited,
            refunded_cents,
            refund_ref,
            Some(order_id),
            note,
        ));
        self.touch();
        debited
    }

    /// Applies a signed credit delta from a manual-order update.
    ///
    /// This is the one explicit admin correction allowed to decrease
    /// `total_purchased`. Positive deltas behave like a purchase; negative
    /// deltas floor the balance at zero. Zero deltas are a no-op.
    pub fn apply_admin_delta(
        &mut self,
        delta: i64,
        order_id: InvoiceId,
        note: impl Into<String>,
    ) -> Result<(), WalletError> {
        if delta == 0 {
            return Ok(());
        }
        if delta > 0 {
            return self.credit(delta, 0, Some(order_id), note);
        }
        let removal = -delta;
        let debited = removal.min(self.balance);
        self.balance -= debited;
        self.total_purchased = (self.total_purchased - removal).max(0);
        self.ledger
            .push(LedgerEntry::manual_revoke(debited, Some(order_id), note));
        self.touch();
        Ok(())
    }

    // ───────────────────────────── cards ──────────────────────────────────

    /// Saves a card. The first card becomes primary automatically.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateCard` if the payment method is already saved.
    pub fn add_card(&mut self, mut card: SavedCard) -> Result<&SavedCard, WalletError> {
        if self
            .cards
            .iter()
            .any(|c| c.payment_method_ref == card.payment_method_ref)
        {
            return Err(WalletError::duplicate_card(card.payment_method_ref));
        }
        card.is_primary = self.cards.is_empty();
        self.cards.push(card);
        self.touch();
        Ok(self.cards.last().expect("card just pushed"))
    }

    /// Marks the given card primary, demoting all others.
    ///
    /// # Errors
    ///
    /// Returns `CardNotFound` if the card is not saved on this wallet.
    pub fn set_primary_card(&mut self, payment_method_ref: &str) -> Result<(), WalletError> {
        if !self
            .cards
            .iter()
            .any(|c| c.payment_method_ref == payment_method_ref)
        {
            return Err(WalletError::card_not_found(payment_method_ref));
        }
        for card in &mut self.cards {
            card.is_primary = card.payment_method_ref == payment_method_ref;
        }
        self.touch();
        Ok(())
    }

    /// Removes a card. If it was primary, the first remaining card is
    /// promoted. Returns the removed card so the caller can detach it at
    /// the payment provider.
    pub fn remove_card(&mut self, payment_method_ref: &str) -> Result<SavedCard, WalletError> {
        let index = self
            .cards
            .iter()
            .position(|c| c.payment_method_ref == payment_method_ref)
            .ok_or_else(|| WalletError::card_not_found(payment_method_ref))?;

        let removed = self.cards.remove(index);
        if removed.is_primary {
            if let Some(first) = self.cards.first_mut() {
                first.is_primary = true;
            }
        }
        self.touch();
        Ok(removed)
    }

    /// The default card for off-session charges, if any.
    pub fn primary_card(&self) -> Option<&SavedCard> {
        self.cards.iter().find(|c| c.is_primary)
    }

    /// The most recently saved card, if any.
    pub fn latest_card(&self) -> Option<&SavedCard> {
        self.cards.iter().max_by_key(|c| c.added_at)
    }

    /// Records the payment provider's customer reference.
    pub fn set_customer_ref(&mut self, customer_ref: impl Into<String>) {
        self.customer_ref = Some(customer_ref.into());
        self.touch();
    }

    // ─────────────────────────── reporting ────────────────────────────────

    /// Credits consumed so far. Floors at zero so manually granted credits
    /// never produce negative usage.
    pub fn used_credits(&self) -> i64 {
        (self.total_purchased - self.balance).max(0)
    }

    /// Usage as a rounded percentage of lifetime purchases.
    pub fn usage_percent(&self) -> u32 {
        if self.total_purchased <= 0 {
            return 0;
        }
        ((self.used_credits() as f64 / self.total_purchased as f64) * 100.0).round() as u32
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_wallet() -> Wallet {
        Wallet::new(WalletId::new(), UserId::new())
    }

    fn funded_wallet(credits: i64) -> Wallet {
        let mut wallet = test_wallet();
        wallet
            .credit(credits, credits * 100, None, "Wallet top-up purchase")
            .unwrap();
        wallet
    }

    // Credit tests

    #[test]
    fn credit_increases_balance_and_total_purchased() {
        let mut wallet = test_wallet();
        wallet.credit(100, 5_000, None, "Wallet top-up purchase").unwrap();

        assert_eq!(wallet.balance, 100);
        assert_eq!(wallet.total_purchased, 100);
    }

    #[test]
    fn credit_appends_one_purchase_ledger_entry() {
        let order = InvoiceId::new();
        let mut wallet = test_wallet();
        wallet.credit(100, 5_000, Some(order), "Wallet top-up purchase").unwrap();

        assert_eq!(wallet.ledger.len(), 1);
        let entry = &wallet.ledger[0];
        assert_eq!(entry.credits, 100);
        assert_eq!(entry.amount_cents, 5_000);
        assert_eq!(entry.order_id, Some(order));
    }

    #[test]
    fn credit_rejects_zero_and_negative() {
        let mut wallet = test_wallet();
        assert!(wallet.credit(0, 0, None, "x").is_err());
        assert!(wallet.credit(-5, 0, None, "x").is_err());
        assert!(wallet.ledger.is_empty());
    }

    // Manual debit tests

    #[test]
    fn debit_manual_reduces_balance_only() {
        let mut wallet = funded_wallet(100);
        wallet.debit_manual(30, "Manual credit deduction").unwrap();

        assert_eq!(wallet.balance, 70);
        assert_eq!(wallet.total_purchased, 100);
    }

    #[test]
    fn debit_manual_rejects_insufficient_balance_before_mutation() {
        let mut wallet = funded_wallet(40);
        let result = wallet.debit_manual(100, "Manual credit deduction");

        assert!(matches!(
            result,
            Err(WalletError::InsufficientCredits { requested: 100, available: 40 })
        ));
        assert_eq!(wallet.balance, 40);
        assert_eq!(wallet.ledger.len(), 1); // only the funding entry
    }

    // Cancellation / refund debit tests

    #[test]
    fn revoke_for_cancellation_floors_at_zero() {
        let mut wallet = funded_wallet(30);
        let debited = wallet.revoke_for_cancellation(50, InvoiceId::new(), "cancelled");

        assert_eq!(debited, 30);
        assert_eq!(wallet.balance, 0);
        let entry = wallet.ledger.last().unwrap();
        assert_eq!(entry.credits, -30);
    }

    #[test]
    fn adjust_for_refund_records_both_deltas() {
        let order = InvoiceId::new();
        let mut wallet = funded_wallet(100);
        let debited = wallet.adjust_for_refund(50, 5_000, "re_1", order, "partial refund");

        assert_eq!(debited, 50);
        assert_eq!(wallet.balance, 50);
        let entry = wallet.ledger.last().unwrap();
        assert_eq!(entry.credits, -50);
        assert_eq!(entry.amount_cents, -5_000);
        assert_eq!(entry.refund_ref.as_deref(), Some("re_1"));
    }

    // Admin delta tests

    #[test]
    fn positive_admin_delta_behaves_like_purchase() {
        let mut wallet = funded_wallet(50);
        wallet
            .apply_admin_delta(25, InvoiceId::new(), "Order updated by admin")
            .unwrap();

        assert_eq!(wallet.balance, 75);
        assert_eq!(wallet.total_purchased, 75);
    }

    #[test]
    fn negative_admin_delta_corrects_total_purchased() {
        let mut wallet = funded_wallet(100);
        wallet
            .apply_admin_delta(-40, InvoiceId::new(), "Order updated by admin")
            .unwrap();

        assert_eq!(wallet.balance, 60);
        assert_eq!(wallet.total_purchased, 60);
    }

    #[test]
    fn zero_admin_delta_is_noop() {
        let mut wallet = funded_wallet(100);
        let before = wallet.ledger.len();
        wallet.apply_admin_delta(0, InvoiceId::new(), "noop").unwrap();
        assert_eq!(wallet.ledger.len(), before);
    }

    // Card tests

    fn card(pm: &str) -> SavedCard {
        SavedCard::new(pm, "visa", "4242", 12, 2030)
    }

    #[test]
    fn first_card_becomes_primary() {
        let mut wallet = test_wallet();
        wallet.add_card(card("pm_1")).unwrap();
        wallet.add_card(card("pm_2")).unwrap();

        assert!(wallet.cards[0].is_primary);
        assert!(!wallet.cards[1].is_primary);
    }

    #[test]
    fn duplicate_card_is_rejected() {
        let mut wallet = test_wallet();
        wallet.add_card(card("pm_1")).unwrap();
        let result = wallet.add_card(card("pm_1"));

        assert!(matches!(result, Err(WalletError::DuplicateCard(_))));
        assert_eq!(wallet.cards.len(), 1);
    }

    #[test]
    fn set_primary_demotes_others() {
        let mut wallet = test_wallet();
        wallet.add_card(card("pm_1")).unwrap();
        wallet.add_card(card("pm_2")).unwrap();

        wallet.set_primary_card("pm_2").unwrap();
        assert!(!wallet.cards[0].is_primary);
        assert!(wallet.cards[1].is_primary);
        assert_eq!(wallet.primary_card().unwrap().payment_method_ref, "pm_2");
    }

    #[test]
    fn removing_primary_promotes_first_remaining() {
        let mut wallet = test_wallet();
        wallet.add_card(card("pm_1")).unwrap();
        wallet.add_card(card("pm_2")).unwrap();

        let removed = wallet.remove_card("pm_1").unwrap();
        assert!(removed.is_primary);
        assert!(wallet.cards[0].is_primary);
    }

    #[test]
    fn removing_unknown_card_fails() {
        let mut wallet = test_wallet();
        assert!(matches!(
            wallet.remove_card("pm_missing"),
            Err(WalletError::CardNotFound(_))
        ));
    }

    // Reporting tests

    #[test]
    fn usage_percent_rounds() {
        let mut wallet = funded_wallet(3);
        wallet.revoke_for_cancellation(1, InvoiceId::new(), "used one");
        // 1 of 3 used -> 33%
        assert_eq!(wallet.usage_percent(), 33);
    }

    #[test]
    fn usage_percent_is_zero_without_purchases() {
        assert_eq!(test_wallet().usage_percent(), 0);
    }

    // Property: no operation sequence can drive the balance negative, and
    // the ledger always reconciles to the balance.

    #[derive(Debug, Clone)]
    enum Op {
        Credit(i64),
        DebitManual(i64),
        Revoke(i64),
        Refund(i64, i64),
        AdminDelta(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..500).prop_map(Op::Credit),
            (1i64..500).prop_map(Op::DebitManual),
            (0i64..500).prop_map(Op::Revoke),
            ((0i64..500), (0i64..50_000)).prop_map(|(c, a)| Op::Refund(c, a)),
            (-500i64..500).prop_map(Op::AdminDelta),
        ]
    }

    proptest! {
        #[test]
        fn balance_never_negative_and_ledger_reconciles(ops in prop::collection::vec(op_strategy(), 1..40)) {
            let mut wallet = test_wallet();
            let order = InvoiceId::new();

            for op in ops {
                match op {
                    Op::Credit(c) => { let _ = wallet.credit(c, c * 100, None, "p"); }
                    Op::DebitManual(c) => { let _ = wallet.debit_manual(c, "d"); }
                    Op::Revoke(c) => { wallet.revoke_for_cancellation(c, order, "r"); }
                    Op::Refund(c, a) => { wallet.adjust_for_refund(c, a, "re_x", order, "f"); }
                    Op::AdminDelta(d) => { let _ = wallet.apply_admin_delta(d, order, "u"); }
                }

                prop_assert!(wallet.balance >= 0);
                prop_assert!(wallet.total_purchased >= 0);

                let ledger_sum: i64 = wallet.ledger.iter().map(|e| e.credits).sum();
                prop_assert_eq!(ledger_sum, wallet.balance);
            }
        }
    }
}
