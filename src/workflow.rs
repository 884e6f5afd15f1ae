// src/workflow.rs
//
// Approval state machine for absence events.
//
// Vacation events created by regular users start out pending with a
// paired approval request; the ledger is debited at creation time, so a
// pending request already reserves the balance. Declining (or deleting
// an accepted vacation event) writes the compensating credit. Superusers
// skip the request entirely, non-vacation events are always accepted and
// never touch the ledger.

use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::calendar;
use crate::error::CoreError;
use crate::ledger::VacationLedger;
use crate::models::{
    vacation_weight, BatchRequest, Event, EventState, EventUser, PendingRequest, Request, User,
    VacationSummary,
};
use crate::notify::Notifier;
use crate::store::{EventStore, RequestStore, UserStore};

fn batch_update_msg(editor: &str, state: EventState, reason: Option<&str>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => {
            format!("{} {} your request: {}.", editor, state, reason)
        }
        _ => format!("{} {} your request.", editor, state),
    }
}

#[derive(Clone)]
pub struct EventWorkflow {
    events: Arc<dyn EventStore>,
    requests: Arc<dyn RequestStore>,
    users: Arc<dyn UserStore>,
    ledger: VacationLedger,
    notifier: Notifier,
    bot_username: String,
}

impl EventWorkflow {
    pub fn new(
        events: Arc<dyn EventStore>,
        requests: Arc<dyn RequestStore>,
        users: Arc<dyn UserStore>,
        ledger: VacationLedger,
        notifier: Notifier,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            events,
            requests,
            users,
            ledger,
            notifier,
            bot_username: bot_username.into(),
        }
    }

    pub fn ledger(&self) -> &VacationLedger {
        &self.ledger
    }

    /// Create an absence event for `acting_user` on `date`.
    ///
    /// Vacation types debit the ledger immediately, before approval, so
    /// the balance is reserved while the request is pending. Regular
    /// users additionally get a pending request and the admins are
    /// notified; superusers are accepted on the spot.
    pub async fn create(
        &self,
        date: NaiveDate,
        event_type: &str,
        acting_user: &User,
    ) -> Result<Event, CoreError> {
        let name = event_type.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("empty event type".to_string()));
        }

        let weight = vacation_weight(name);
        if weight > 0.0 {
            self.ledger
                .adjust_balance(acting_user.id, date.year(), -weight)
                .await?;
        }

        let state = if weight == 0.0 || acting_user.is_superuser {
            EventState::Accepted
        } else {
            EventState::Pending
        };

        let event = self
            .events
            .create(date, name, acting_user.id, state)
            .await?;

        if state == EventState::Pending {
            let msg = event.request_msg(&acting_user.username);
            self.requests
                .create(&msg, acting_user.id, event.id)
                .await?;
            let admins = self.users.get_admins().await?;
            self.notifier.create_and_notify(&msg, &admins).await?;
        }

        info!(
            user = %acting_user.username,
            name,
            date = %date,
            state = %event.state,
            "created event"
        );
        Ok(event)
    }

    /// Delete an event. Only the owner or an admin may delete; removing
    /// an accepted vacation event credits its weight back to the ledger.
    pub async fn delete(&self, event_id: i64, acting_user: &User) -> Result<Event, CoreError> {
        let event = self.events.get_by_id(event_id).await?;
        if !acting_user.is_admin() && event.user_id != acting_user.id {
            return Err(CoreError::PermissionDenied(format!(
                "user {} may not delete event {}",
                acting_user.username, event_id
            )));
        }

        let event = self.events.delete(event_id).await?;

        if event.state == EventState::Accepted && event.is_vacation() {
            self.ledger
                .adjust_balance(event.user_id, event.scheduled_at.year(), event.weight())
                .await?;
        }

        info!(event_id, user = %acting_user.username, "deleted event");
        Ok(event)
    }

    /// Resolve one pending request. The linked event's state always
    /// mirrors the request's state afterwards. Declining credits the
    /// creation-time debit back; approval leaves the ledger untouched
    /// because the debit already happened.
    pub async fn resolve_request(
        &self,
        request_id: i64,
        new_state: EventState,
        editor: &User,
    ) -> Result<Request, CoreError> {
        if new_state == EventState::Pending {
            return Err(CoreError::Validation(
                "a request can only be resolved to accepted or declined".to_string(),
            ));
        }

        let request = self.requests.get_by_id(request_id).await?;
        if request.state != EventState::Pending {
            // A concurrent editor won the race; surface it instead of
            // double-crediting the ledger.
            return Err(CoreError::Conflict(format!(
                "request {} is already {}",
                request_id, request.state
            )));
        }

        let request = self
            .requests
            .update_state(request_id, new_state, editor.id)
            .await?;
        let event = self.events.get_by_id(request.event_id).await?;
        let event = self.events.update_state(event.id, new_state).await?;

        if new_state == EventState::Declined && event.is_vacation() {
            self.ledger
                .adjust_balance(event.user_id, event.scheduled_at.year(), event.weight())
                .await?;
        }

        let requester = self.users.get_by_id(request.user_id).await?;
        let msg = event.update_msg(&editor.username, new_state);
        self.notifier.create_and_notify(&msg, &[requester]).await?;

        info!(request_id, state = %new_state, editor = %editor.username, "resolved request");
        Ok(request)
    }

    /// Resolve every pending event of one user inside the half-open
    /// window `[start, end)` at once — "approve/reject the whole trip".
    pub async fn resolve_range(
        &self,
        user_id: i64,
        new_state: EventState,
        start: NaiveDate,
        end: NaiveDate,
        editor: &User,
        reason: Option<&str>,
    ) -> Result<(), CoreError> {
        if new_state == EventState::Pending {
            return Err(CoreError::Validation(
                "a request can only be resolved to accepted or declined".to_string(),
            ));
        }
        if start >= end {
            return Err(CoreError::Validation(format!(
                "invalid range: {} is not before {}",
                start, end
            )));
        }

        let pending = self
            .requests
            .get_pending_in_range(user_id, start, end)
            .await?;
        if pending.is_empty() {
            return Err(CoreError::NotFound(format!(
                "no pending requests for user {} in {}..{}",
                user_id, start, end
            )));
        }

        for p in &pending {
            self.requests
                .update_state(p.request.id, new_state, editor.id)
                .await?;
            if new_state == EventState::Declined {
                let weight = vacation_weight(&p.event_name);
                if weight > 0.0 {
                    self.ledger
                        .adjust_balance(user_id, p.event_date.year(), weight)
                        .await?;
                }
            }
        }
        self.events
            .update_range(user_id, new_state, start, end)
            .await?;

        let requester = self.users.get_by_id(user_id).await?;
        let msg = batch_update_msg(&editor.username, new_state, reason);
        self.notifier.create_and_notify(&msg, &[requester]).await?;

        info!(
            user_id,
            state = %new_state,
            count = pending.len(),
            editor = %editor.username,
            "resolved request range"
        );
        Ok(())
    }

    /// Every other user with an absence event (any state) overlapping
    /// the inclusive window — shown to approvers before they accept
    /// overlapping trips. The holiday bot is skipped: its events apply
    /// to everyone and carry no signal.
    pub async fn conflicts(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<User>, CoreError> {
        let events = self.events.get_overlapping(start, end, user_id).await?;

        let ids: BTreeSet<i64> = events.iter().map(|e| e.user_id).collect();
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.users.get_by_id(id).await {
                Ok(user) if user.username == self.bot_username => continue,
                Ok(user) => users.push(user),
                Err(CoreError::NotFound(_)) => {
                    warn!(user_id = id, "event owner vanished, skipping in conflicts");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    /// Pending requests grouped for review: consecutive days of the same
    /// user and event type collapse into one batch row, each annotated
    /// with the users absent in the same window.
    pub async fn pending_requests(&self) -> Result<Vec<BatchRequest>, CoreError> {
        let pending = self.requests.get_pending().await?;
        let mut batches = Vec::new();

        let mut start_index = 0;
        while start_index < pending.len() {
            let mut end_index = start_index;
            while end_index + 1 < pending.len()
                && is_consecutive(&pending[end_index], &pending[end_index + 1])
            {
                end_index += 1;
            }

            let start_date = pending[start_index].event_date;
            let end_date = pending[end_index].event_date;
            let user_id = pending[start_index].request.user_id;
            let conflicts = self.conflicts(user_id, start_date, end_date).await?;

            batches.push(BatchRequest {
                start_date,
                end_date,
                event_count: end_index - start_index + 1,
                request: pending[end_index].request.clone(),
                conflicts,
            });

            start_index = end_index + 1;
        }

        Ok(batches)
    }

    /// The month grid joined with the month's events. `user_filter`
    /// keeps one user's events, `type_filter` matches on a name
    /// substring ("all" disables it); holiday bot events always pass.
    pub async fn month_view(
        &self,
        year: i32,
        month: u32,
        user_filter: Option<&str>,
        type_filter: Option<&str>,
    ) -> Result<calendar::MonthGrid, CoreError> {
        let mut grid = calendar::build_month(month, year).ok_or_else(|| {
            CoreError::Validation(format!("invalid month {}-{}", year, month))
        })?;

        let events = self.events.get_for_month(year, month).await?;
        for event in events {
            let user = match self.users.get_by_id(event.user_id).await {
                Ok(user) => user,
                Err(CoreError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            };

            let is_bot = user.username == self.bot_username;
            if let Some(filter) = user_filter {
                if user.username != filter && !is_bot {
                    continue;
                }
            }
            if let Some(filter) = type_filter {
                if filter != "all" && !event.name.contains(filter) && !is_bot {
                    continue;
                }
            }

            let idx = (event.scheduled_at.day() - 1) as usize;
            if let Some(cell) = grid.days.get_mut(idx) {
                cell.events.push(EventUser { event, user });
            }
        }

        Ok(grid)
    }

    /// Balance, used days and pending count for one user's year.
    pub async fn user_vacation_summary(
        &self,
        user_id: i64,
        year: i32,
        as_of: NaiveDate,
    ) -> Result<VacationSummary, CoreError> {
        let remaining = self.ledger.remaining_balance(user_id, as_of).await?;

        let events = self.events.get_for_user(user_id).await?;
        let mut used = 0.0;
        let mut pending = 0;
        for event in events {
            if event.scheduled_at.year() != year {
                continue;
            }
            match event.state {
                EventState::Accepted => used += event.weight(),
                EventState::Pending => pending += 1,
                EventState::Declined => {}
            }
        }

        Ok(VacationSummary {
            remaining,
            used,
            pending,
        })
    }
}

/// Two pending rows continue the same batch when they belong to the same
/// user, carry the same event name and lie on adjacent days of the same
/// year. A trip spanning New Year shows as one batch per year, keeping
/// each batch inside a single entitlement year.
fn is_consecutive(a: &PendingRequest, b: &PendingRequest) -> bool {
    a.request.user_id == b.request.user_id
        && a.event_name == b.event_name
        && a.event_date.year() == b.event_date.year()
        && b.event_date
            .signed_duration_since(a.event_date)
            .num_days()
            == 1
}
