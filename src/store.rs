// src/store.rs
//
// Collaborator contracts the core services are built against. The SQL,
// HTTP and rendering adapters live outside this crate; services receive
// these traits by constructor injection. `MemStore` (mem_store.rs)
// implements all of them for tests and the CLI.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::models::{
    CacheMarker, CreateUser, Event, EventState, Notification, PendingRequest, RefreshMarker,
    Request, User, VacationToken,
};

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(
        &self,
        date: NaiveDate,
        name: &str,
        user_id: i64,
        state: EventState,
    ) -> Result<Event, CoreError>;

    async fn delete(&self, id: i64) -> Result<Event, CoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Event, CoreError>;

    async fn get_for_day(&self, date: NaiveDate) -> Result<Vec<Event>, CoreError>;

    async fn get_for_month(&self, year: i32, month: u32) -> Result<Vec<Event>, CoreError>;

    async fn get_for_year(&self, year: i32) -> Result<Vec<Event>, CoreError>;

    async fn get_for_user(&self, user_id: i64) -> Result<Vec<Event>, CoreError>;

    async fn update_state(&self, id: i64, state: EventState) -> Result<Event, CoreError>;

    /// Move every *pending* event of `user_id` scheduled in `[start, end)`
    /// to `state`. Returns the number of events touched.
    async fn update_range(
        &self,
        user_id: i64,
        state: EventState,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, CoreError>;

    /// Events of any state and any user except `exclude_user` whose date
    /// falls in the inclusive window.
    async fn get_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_user: i64,
    ) -> Result<Vec<Event>, CoreError>;
}

#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn create(
        &self,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        value: f64,
    ) -> Result<VacationToken, CoreError>;

    async fn delete(&self, id: i64) -> Result<(), CoreError>;

    async fn delete_all(&self) -> Result<(), CoreError>;

    /// Sum of `value` over the user's tokens whose inclusive interval
    /// covers `date`. No tokens means 0.0, not an error.
    async fn sum_covering(&self, user_id: i64, date: NaiveDate) -> Result<f64, CoreError>;
}

#[async_trait]
pub trait RefreshMarkerStore: Send + Sync {
    async fn exists(&self, user_id: i64, year: i32) -> Result<bool, CoreError>;

    /// Fails with `Conflict` if the marker already exists.
    async fn create(&self, user_id: i64, year: i32) -> Result<RefreshMarker, CoreError>;

    async fn delete_all(&self) -> Result<(), CoreError>;
}

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create(&self, msg: &str, user_id: i64, event_id: i64)
        -> Result<Request, CoreError>;

    async fn get_by_id(&self, id: i64) -> Result<Request, CoreError>;

    async fn update_state(
        &self,
        id: i64,
        state: EventState,
        editor_id: i64,
    ) -> Result<Request, CoreError>;

    /// All pending requests joined with their event's date and name,
    /// ordered by (user, date).
    async fn get_pending(&self) -> Result<Vec<PendingRequest>, CoreError>;

    /// Pending requests of one user whose event date falls in `[start, end)`.
    async fn get_pending_in_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PendingRequest>, CoreError>;

    async fn get_event_name(&self, request_id: i64) -> Result<String, CoreError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create(&self, msg: &str) -> Result<Notification, CoreError>;

    async fn notify_user(&self, user_id: i64, notification_id: i64) -> Result<(), CoreError>;

    /// Uncleared notifications for a user, newest first.
    async fn get_for_user(&self, user_id: i64) -> Result<Vec<Notification>, CoreError>;

    async fn clear(&self, user_id: i64, notification_id: i64) -> Result<(), CoreError>;

    async fn clear_all(&self, user_id: i64) -> Result<(), CoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: CreateUser) -> Result<User, CoreError>;

    async fn get_by_id(&self, id: i64) -> Result<User, CoreError>;

    async fn get_by_name(&self, username: &str) -> Result<User, CoreError>;

    async fn get_all(&self) -> Result<Vec<User>, CoreError>;

    async fn get_admins(&self) -> Result<Vec<User>, CoreError>;
}

#[async_trait]
pub trait CacheMarkerStore: Send + Sync {
    async fn exists(&self, year: i32) -> Result<bool, CoreError>;

    async fn create(&self, year: i32) -> Result<CacheMarker, CoreError>;

    async fn years(&self) -> Result<Vec<i32>, CoreError>;
}

/// External public-holiday source: name → date for one year.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn fetch(&self, year: i32) -> Result<HashMap<String, NaiveDate>, CoreError>;
}
