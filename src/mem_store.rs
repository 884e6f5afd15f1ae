// src/mem_store.rs
//
// In-memory implementation of every store trait, backing the test suite
// and the CLI. State lives in plain maps behind a single tokio Mutex, so
// each call is one atomic unit the same way a SQL transaction would be.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::color;
use crate::error::CoreError;
use crate::models::{
    CacheMarker, CreateUser, Event, EventState, Notification, PendingRequest, RefreshMarker,
    Request, User, VacationToken,
};
use crate::store::{
    CacheMarkerStore, EventStore, NotificationSink, RefreshMarkerStore, RequestStore, TokenStore,
    UserStore,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: HashMap<i64, User>,
    events: HashMap<i64, Event>,
    requests: HashMap<i64, Request>,
    tokens: HashMap<i64, VacationToken>,
    refresh_markers: HashSet<(i64, i32)>,
    cache_years: BTreeSet<i32>,
    notifications: HashMap<i64, Notification>,
    // user id -> (notification id, cleared)
    recipients: HashMap<i64, Vec<(i64, bool)>>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemStore {
    async fn create(
        &self,
        date: NaiveDate,
        name: &str,
        user_id: i64,
        state: EventState,
    ) -> Result<Event, CoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let event = Event {
            id,
            scheduled_at: date,
            name: name.to_string(),
            state,
            user_id,
        };
        inner.events.insert(id, event.clone());
        Ok(event)
    }

    async fn delete(&self, id: i64) -> Result<Event, CoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .events
            .remove(&id)
            .ok_or_else(|| CoreError::not_found("event", id))
    }

    async fn get_by_id(&self, id: i64) -> Result<Event, CoreError> {
        let inner = self.inner.lock().await;
        inner
            .events
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("event", id))
    }

    async fn get_for_day(&self, date: NaiveDate) -> Result<Vec<Event>, CoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.scheduled_at == date)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.id);
        Ok(events)
    }

    async fn get_for_month(&self, year: i32, month: u32) -> Result<Vec<Event>, CoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.scheduled_at.year() == year && e.scheduled_at.month() == month)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(events)
    }

    async fn get_for_year(&self, year: i32) -> Result<Vec<Event>, CoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.scheduled_at.year() == year)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(events)
    }

    async fn get_for_user(&self, user_id: i64) -> Result<Vec<Event>, CoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(events)
    }

    async fn update_state(&self, id: i64, state: EventState) -> Result<Event, CoreError> {
        let mut inner = self.inner.lock().await;
        let event = inner
            .events
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("event", id))?;
        event.state = state;
        Ok(event.clone())
    }

    async fn update_range(
        &self,
        user_id: i64,
        state: EventState,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, CoreError> {
        let mut inner = self.inner.lock().await;
        let mut touched = 0;
        for event in inner.events.values_mut() {
            if event.user_id == user_id
                && event.state == EventState::Pending
                && event.scheduled_at >= start
                && event.scheduled_at < end
            {
                event.state = state;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn get_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        exclude_user: i64,
    ) -> Result<Vec<Event>, CoreError> {
        let inner = self.inner.lock().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| {
                e.user_id != exclude_user && e.scheduled_at >= start && e.scheduled_at <= end
            })
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(events)
    }
}

#[async_trait]
impl TokenStore for MemStore {
    async fn create(
        &self,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
        value: f64,
    ) -> Result<VacationToken, CoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let token = VacationToken {
            id,
            user_id,
            start_date,
            end_date,
            value,
        };
        inner.tokens.insert(id, token.clone());
        Ok(token)
    }

    async fn delete(&self, id: i64) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        inner
            .tokens
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found("vacation token", id))
    }

    async fn delete_all(&self) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        inner.tokens.clear();
        Ok(())
    }

    async fn sum_covering(&self, user_id: i64, date: NaiveDate) -> Result<f64, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .tokens
            .values()
            .filter(|t| t.user_id == user_id && t.start_date <= date && t.end_date >= date)
            .map(|t| t.value)
            .sum())
    }
}

#[async_trait]
impl RefreshMarkerStore for MemStore {
    async fn exists(&self, user_id: i64, year: i32) -> Result<bool, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.refresh_markers.contains(&(user_id, year)))
    }

    async fn create(&self, user_id: i64, year: i32) -> Result<RefreshMarker, CoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.refresh_markers.insert((user_id, year)) {
            return Err(CoreError::Conflict(format!(
                "refresh marker for user {} year {} already exists",
                user_id, year
            )));
        }
        Ok(RefreshMarker { user_id, year })
    }

    async fn delete_all(&self) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        inner.refresh_markers.clear();
        Ok(())
    }
}

#[async_trait]
impl RequestStore for MemStore {
    async fn create(
        &self,
        msg: &str,
        user_id: i64,
        event_id: i64,
    ) -> Result<Request, CoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let request = Request {
            id,
            message: msg.to_string(),
            state: EventState::Pending,
            user_id,
            edited_by: None,
            event_id,
        };
        inner.requests.insert(id, request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: i64) -> Result<Request, CoreError> {
        let inner = self.inner.lock().await;
        inner
            .requests
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("request", id))
    }

    async fn update_state(
        &self,
        id: i64,
        state: EventState,
        editor_id: i64,
    ) -> Result<Request, CoreError> {
        let mut inner = self.inner.lock().await;
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("request", id))?;
        request.state = state;
        request.edited_by = Some(editor_id);
        Ok(request.clone())
    }

    async fn get_pending(&self) -> Result<Vec<PendingRequest>, CoreError> {
        let inner = self.inner.lock().await;
        let mut pending: Vec<PendingRequest> = inner
            .requests
            .values()
            .filter(|r| r.state == EventState::Pending)
            .filter_map(|r| {
                let event = inner.events.get(&r.event_id)?;
                Some(PendingRequest {
                    request: r.clone(),
                    event_date: event.scheduled_at,
                    event_name: event.name.clone(),
                })
            })
            .collect();
        pending.sort_by_key(|p| (p.request.user_id, p.event_date));
        Ok(pending)
    }

    async fn get_pending_in_range(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PendingRequest>, CoreError> {
        let mut pending = self.get_pending().await?;
        pending.retain(|p| {
            p.request.user_id == user_id && p.event_date >= start && p.event_date < end
        });
        Ok(pending)
    }

    async fn get_event_name(&self, request_id: i64) -> Result<String, CoreError> {
        let inner = self.inner.lock().await;
        let request = inner
            .requests
            .get(&request_id)
            .ok_or_else(|| CoreError::not_found("request", request_id))?;
        let event = inner
            .events
            .get(&request.event_id)
            .ok_or_else(|| CoreError::not_found("event", request.event_id))?;
        Ok(event.name.clone())
    }
}

#[async_trait]
impl NotificationSink for MemStore {
    async fn create(&self, msg: &str) -> Result<Notification, CoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id();
        let notification = Notification {
            id,
            message: msg.to_string(),
            created_at: Utc::now(),
        };
        inner.notifications.insert(id, notification.clone());
        Ok(notification)
    }

    async fn notify_user(&self, user_id: i64, notification_id: i64) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.notifications.contains_key(&notification_id) {
            return Err(CoreError::not_found("notification", notification_id));
        }
        inner
            .recipients
            .entry(user_id)
            .or_default()
            .push((notification_id, false));
        Ok(())
    }

    async fn get_for_user(&self, user_id: i64) -> Result<Vec<Notification>, CoreError> {
        let inner = self.inner.lock().await;
        let mut notifications: Vec<Notification> = inner
            .recipients
            .get(&user_id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(_, cleared)| !cleared)
                    .filter_map(|(id, _)| inner.notifications.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        notifications.sort_by_key(|n| std::cmp::Reverse(n.id));
        Ok(notifications)
    }

    async fn clear(&self, user_id: i64, notification_id: i64) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(entries) = inner.recipients.get_mut(&user_id) {
            for entry in entries.iter_mut() {
                if entry.0 == notification_id {
                    entry.1 = true;
                }
            }
        }
        Ok(())
    }

    async fn clear_all(&self, user_id: i64) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(entries) = inner.recipients.get_mut(&user_id) {
            for entry in entries.iter_mut() {
                entry.1 = true;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn create(&self, user: CreateUser) -> Result<User, CoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(CoreError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }
        let id = inner.next_id();
        let user = User {
            id,
            username: user.username,
            email: user.email,
            vacation_days: user.vacation_days,
            is_superuser: user.is_superuser,
            color: color::hsl(id),
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, CoreError> {
        let inner = self.inner.lock().await;
        inner
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    async fn get_by_name(&self, username: &str) -> Result<User, CoreError> {
        let inner = self.inner.lock().await;
        inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("user {}", username)))
    }

    async fn get_all(&self) -> Result<Vec<User>, CoreError> {
        let inner = self.inner.lock().await;
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn get_admins(&self) -> Result<Vec<User>, CoreError> {
        let mut users = self.get_all().await?;
        users.retain(|u| u.is_superuser);
        Ok(users)
    }
}

#[async_trait]
impl CacheMarkerStore for MemStore {
    async fn exists(&self, year: i32) -> Result<bool, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.cache_years.contains(&year))
    }

    async fn create(&self, year: i32) -> Result<CacheMarker, CoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.cache_years.insert(year) {
            return Err(CoreError::Conflict(format!(
                "holiday cache marker for {} already exists",
                year
            )));
        }
        Ok(CacheMarker { year })
    }

    async fn years(&self) -> Result<Vec<i32>, CoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.cache_years.iter().copied().collect())
    }
}
