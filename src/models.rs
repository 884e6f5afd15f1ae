// src/models.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Event names that consume vacation balance. Everything else (sick days,
// holidays, ...) is informational and never touches the ledger.
pub const VACATION_FULL: &str = "vacation";
pub const VACATION_HALF_DAY: &str = "vacation-half-day";
pub const SICK_DAY: &str = "sick";

/// Ledger weight of an event name: 1.0 for a full vacation day,
/// 0.5 for a half day, 0.0 for anything that is not a vacation type.
pub fn vacation_weight(name: &str) -> f64 {
    match name {
        VACATION_FULL => 1.0,
        VACATION_HALF_DAY => 0.5,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub vacation_days: i64,
    pub is_superuser: bool,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.is_superuser
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub vacation_days: i64,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    Pending,
    Accepted,
    Declined,
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventState::Pending => "pending",
            EventState::Accepted => "accepted",
            EventState::Declined => "declined",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub scheduled_at: NaiveDate,
    pub name: String,
    pub state: EventState,
    pub user_id: i64,
}

impl Event {
    pub fn is_vacation(&self) -> bool {
        vacation_weight(&self.name) > 0.0
    }

    pub fn weight(&self) -> f64 {
        vacation_weight(&self.name)
    }

    pub fn request_msg(&self, username: &str) -> String {
        format!("{} sent a new request for {}!", username, self.name)
    }

    pub fn update_msg(&self, editor: &str, state: EventState) -> String {
        format!("{} {} your {} request!", editor, state, self.name)
    }
}

// Approval shadow record paired with a pending vacation event. Its state
// must mirror the event's state once an admin resolves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub id: i64,
    pub message: String,
    pub state: EventState,
    pub user_id: i64,
    pub edited_by: Option<i64>,
    pub event_id: i64,
}

// Signed ledger entry: positive values grant vacation days, negative
// values debit them. A user's balance at date T is the sum of `value`
// over all tokens whose [start_date, end_date] interval covers T.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationToken {
    pub id: i64,
    pub user_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub value: f64,
}

/// Yearly-issuance guard: existence means the entitlement token for
/// (user, year) was already granted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshMarker {
    pub user_id: i64,
    pub year: i32,
}

/// Holiday-materialization guard, one per processed year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMarker {
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Event joined with its owning user, as rendered in calendar views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUser {
    pub event: Event,
    pub user: User,
}

/// A pending request joined with the fields of its underlying event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequest {
    pub request: Request,
    pub event_date: NaiveDate,
    pub event_name: String,
}

/// Consecutive same-user, same-type pending days coalesced into one row,
/// with the users that are absent in the same window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_count: usize,
    pub request: Request,
    pub conflicts: Vec<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacationSummary {
    pub remaining: f64,
    pub used: f64,
    pub pending: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacation_weight_distinguishes_types() {
        assert_eq!(vacation_weight(VACATION_FULL), 1.0);
        assert_eq!(vacation_weight(VACATION_HALF_DAY), 0.5);
        assert_eq!(vacation_weight(SICK_DAY), 0.0);
        assert_eq!(vacation_weight("Neujahrstag"), 0.0);
    }

    #[test]
    fn event_state_display_matches_wire_format() {
        assert_eq!(EventState::Pending.to_string(), "pending");
        assert_eq!(EventState::Accepted.to_string(), "accepted");
        assert_eq!(EventState::Declined.to_string(), "declined");
    }
}
