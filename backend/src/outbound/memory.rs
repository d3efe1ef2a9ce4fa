//! In-process repository adapters.
//!
//! Used by integration tests and by debug builds started without a database.
//! State lives behind a `tokio::sync::RwLock`, so clones of the `Arc`
//! holding a repository share one store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{
    RequestRepository, RequestRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{ApprovalRequest, EmailAddress, RequestFilter, RequestId, StatusDecision, User};

/// Request store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryRequestRepository {
    requests: RwLock<HashMap<RequestId, ApprovalRequest>>,
}

impl InMemoryRequestRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Whether no request has been stored.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn insert(&self, request: &ApprovalRequest) -> Result<(), RequestRepositoryError> {
        self.requests
            .write()
            .await
            .insert(request.id(), request.clone());
        Ok(())
    }

    async fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<ApprovalRequest>, RequestRepositoryError> {
        let guard = self.requests.read().await;
        let mut matching: Vec<ApprovalRequest> = guard
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(matching)
    }

    async fn decide(
        &self,
        id: &RequestId,
        decision: StatusDecision,
        decided_at: DateTime<Utc>,
    ) -> Result<ApprovalRequest, RequestRepositoryError> {
        // The write guard makes check-and-set atomic across concurrent deciders.
        let mut guard = self.requests.write().await;
        let Some(current) = guard.get(id).cloned() else {
            return Err(RequestRepositoryError::not_found(*id));
        };
        let decided = current
            .decide(decision, decided_at)
            .map_err(|err| RequestRepositoryError::already_decided(err.current))?;
        guard.insert(*id, decided.clone());
        Ok(decided)
    }
}

/// User store keyed by email.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether no user has been stored.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.get(email.as_str()).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut guard = self.users.write().await;
        let key = user.email().as_str().to_owned();
        if guard.contains_key(&key) {
            return Err(UserPersistenceError::duplicate(key));
        }
        guard.insert(key, user.clone());
        Ok(())
    }

    async fn update_token(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut guard = self.users.write().await;
        match guard.get_mut(user.email().as_str()) {
            Some(stored) => {
                // Only the token and timestamp may change after creation.
                *stored = User::from_parts(
                    stored.email().clone(),
                    user.token().clone(),
                    stored.is_manager(),
                    stored.created_at(),
                    user.updated_at(),
                );
                Ok(())
            }
            None => Err(UserPersistenceError::not_found(user.email().as_str())),
        }
    }
}
