// src/ledger_tests.rs

#[cfg(test)]
mod tests {
    use crate::ledger::{fiscal_window, VacationLedger};
    use crate::mem_store::MemStore;
    use crate::models::User;
    use crate::store::RefreshMarkerStore;
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_user(id: i64, vacation_days: i64) -> User {
        User {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            vacation_days,
            is_superuser: false,
            color: "hsl(0, 50%, 40%)".to_string(),
            created_at: Utc::now(),
        }
    }

    fn setup() -> (Arc<MemStore>, VacationLedger) {
        let store = Arc::new(MemStore::new());
        let ledger = VacationLedger::new(store.clone(), store.clone());
        (store, ledger)
    }

    #[test]
    fn test_fiscal_window_spans_carry_over() {
        let (start, end) = fiscal_window(2025);
        assert_eq!(start, date(2025, 1, 1));
        assert_eq!(end, date(2026, 3, 1));
    }

    #[tokio::test]
    async fn test_issue_entitlement_once() {
        let (store, ledger) = setup();
        let user = test_user(1, 10);

        let already = ledger.issue_yearly_entitlement(&user, 2025).await.unwrap();
        assert!(!already);
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            10.0
        );
        assert!(RefreshMarkerStore::exists(store.as_ref(), 1, 2025)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_issue_entitlement_is_idempotent() {
        let (_store, ledger) = setup();
        let user = test_user(1, 10);

        assert!(!ledger.issue_yearly_entitlement(&user, 2025).await.unwrap());
        // The second call reports prior issuance and grants nothing.
        assert!(ledger.issue_yearly_entitlement(&user, 2025).await.unwrap());
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            10.0
        );
    }

    #[tokio::test]
    async fn test_zero_entitlement_still_writes_marker() {
        let (store, ledger) = setup();
        let user = test_user(1, 0);

        assert!(!ledger.issue_yearly_entitlement(&user, 2025).await.unwrap());
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            0.0
        );
        assert!(RefreshMarkerStore::exists(store.as_ref(), 1, 2025)
            .await
            .unwrap());
        assert!(ledger.issue_yearly_entitlement(&user, 2025).await.unwrap());
    }

    #[tokio::test]
    async fn test_balance_respects_fiscal_window() {
        let (_store, ledger) = setup();
        let user = test_user(1, 10);
        ledger.issue_yearly_entitlement(&user, 2025).await.unwrap();

        // Valid from January 1st through the March 1st carry-over cutoff.
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 1, 1)).await.unwrap(),
            10.0
        );
        assert_eq!(
            ledger.remaining_balance(1, date(2026, 3, 1)).await.unwrap(),
            10.0
        );
        assert_eq!(
            ledger
                .remaining_balance(1, date(2024, 12, 31))
                .await
                .unwrap(),
            0.0
        );
        assert_eq!(
            ledger.remaining_balance(1, date(2026, 3, 2)).await.unwrap(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_adjust_balance_signed() {
        let (_store, ledger) = setup();
        let user = test_user(1, 10);
        ledger.issue_yearly_entitlement(&user, 2025).await.unwrap();

        ledger.adjust_balance(1, 2025, -1.5).await.unwrap();
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            8.5
        );

        ledger.adjust_balance(1, 2025, 1.5).await.unwrap();
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            10.0
        );
    }

    #[tokio::test]
    async fn test_balances_are_per_user() {
        let (_store, ledger) = setup();
        ledger
            .issue_yearly_entitlement(&test_user(1, 10), 2025)
            .await
            .unwrap();
        ledger
            .issue_yearly_entitlement(&test_user(2, 25), 2025)
            .await
            .unwrap();

        let as_of = date(2025, 6, 1);
        assert_eq!(ledger.remaining_balance(1, as_of).await.unwrap(), 10.0);
        assert_eq!(ledger.remaining_balance(2, as_of).await.unwrap(), 25.0);
    }

    #[tokio::test]
    async fn test_revoke_single_token() {
        let (_store, ledger) = setup();
        let user = test_user(1, 10);
        ledger.issue_yearly_entitlement(&user, 2025).await.unwrap();

        let token = ledger.adjust_balance(1, 2025, -3.0).await.unwrap();
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            7.0
        );

        ledger.revoke(token.id).await.unwrap();
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            10.0
        );
    }

    #[tokio::test]
    async fn test_revoke_all_allows_reissue() {
        let (store, ledger) = setup();
        let user = test_user(1, 10);
        ledger.issue_yearly_entitlement(&user, 2025).await.unwrap();

        ledger.revoke_all().await.unwrap();
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            0.0
        );
        assert!(!RefreshMarkerStore::exists(store.as_ref(), 1, 2025)
            .await
            .unwrap());

        // With tokens and markers gone, issuance replays from scratch.
        assert!(!ledger.issue_yearly_entitlement(&user, 2025).await.unwrap());
        assert_eq!(
            ledger.remaining_balance(1, date(2025, 6, 1)).await.unwrap(),
            10.0
        );
    }
}
