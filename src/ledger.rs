// src/ledger.rs
//
// Token-based vacation accounting. Balances are never stored as a
// counter: every grant and debit is an append-only signed token over a
// date interval, and the balance at a date is the sum of the tokens
// covering it. That keeps compensating entries (credit-backs on decline
// or deletion) auditable.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::models::{User, VacationToken};
use crate::store::{RefreshMarkerStore, TokenStore};

#[derive(Clone)]
pub struct VacationLedger {
    tokens: Arc<dyn TokenStore>,
    markers: Arc<dyn RefreshMarkerStore>,
}

/// Entitlement tokens span `[Jan 1, Mar 1 of the next year]`: unused
/// days stay spendable through a three-month carry-over grace period.
pub fn fiscal_window(year: i32) -> (NaiveDate, NaiveDate) {
    // Both dates exist for every year chrono can represent.
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year + 1, 3, 1).unwrap_or(NaiveDate::MAX);
    (start, end)
}

impl VacationLedger {
    pub fn new(tokens: Arc<dyn TokenStore>, markers: Arc<dyn RefreshMarkerStore>) -> Self {
        Self { tokens, markers }
    }

    /// Remaining balance for a user at `as_of`: the signed sum over all
    /// tokens whose interval covers that date.
    pub async fn remaining_balance(
        &self,
        user_id: i64,
        as_of: NaiveDate,
    ) -> Result<f64, CoreError> {
        self.tokens.sum_covering(user_id, as_of).await
    }

    /// Grant the user's yearly entitlement once. Returns `true` when the
    /// year was already issued (no side effects in that case). A marker
    /// is written even for users with no entitlement so the guard stays
    /// idempotent either way.
    pub async fn issue_yearly_entitlement(
        &self,
        user: &User,
        year: i32,
    ) -> Result<bool, CoreError> {
        if self.markers.exists(user.id, year).await? {
            return Ok(true);
        }

        if user.vacation_days > 0 {
            let (start, end) = fiscal_window(year);
            self.tokens
                .create(user.id, start, end, user.vacation_days as f64)
                .await?;
        }
        self.markers.create(user.id, year).await?;

        info!(
            user = %user.username,
            year,
            days = user.vacation_days,
            "issued yearly vacation entitlement"
        );
        Ok(false)
    }

    /// Ad-hoc grant or debit over the year's fiscal window, independent
    /// of the yearly entitlement. Used for manual admin corrections and
    /// for event debits/credit-backs.
    pub async fn adjust_balance(
        &self,
        user_id: i64,
        year: i32,
        delta: f64,
    ) -> Result<VacationToken, CoreError> {
        let (start, end) = fiscal_window(year);
        let token = self.tokens.create(user_id, start, end, delta).await?;
        debug!(user_id, year, delta, "adjusted vacation balance");
        Ok(token)
    }

    pub async fn revoke(&self, token_id: i64) -> Result<(), CoreError> {
        self.tokens.delete(token_id).await
    }

    /// Administrative reset: drops every token and every refresh marker
    /// so yearly issuance can be replayed deterministically.
    pub async fn revoke_all(&self) -> Result<(), CoreError> {
        self.tokens.delete_all().await?;
        self.markers.delete_all().await?;
        info!("revoked all vacation tokens and refresh markers");
        Ok(())
    }
}
