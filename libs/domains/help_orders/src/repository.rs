use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{HelpOrderError, HelpOrderResult};
use crate::models::HelpOrder;

/// Repository trait for HelpOrder persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HelpOrderRepository: Send + Sync {
    async fn create(&self, student_id: i32, question: String) -> HelpOrderResult<HelpOrder>;

    async fn get_by_id(&self, id: i32) -> HelpOrderResult<Option<HelpOrder>>;

    /// Questions without an answer, ordered by id.
    async fn list_unanswered(&self) -> HelpOrderResult<Vec<HelpOrder>>;

    async fn list_by_student(&self, student_id: i32) -> HelpOrderResult<Vec<HelpOrder>>;

    /// Stores the answer if the help order has none yet.
    ///
    /// Fails with `NotFound` for an unknown id and `AlreadyAnswered` when
    /// another answer got there first.
    async fn answer(
        &self,
        id: i32,
        answer: String,
        at: DateTime<Utc>,
    ) -> HelpOrderResult<HelpOrder>;
}

/// In-memory implementation of HelpOrderRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryHelpOrderRepository {
    state: Arc<RwLock<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i32,
    help_orders: BTreeMap<i32, HelpOrder>,
}

impl InMemoryHelpOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HelpOrderRepository for InMemoryHelpOrderRepository {
    async fn create(&self, student_id: i32, question: String) -> HelpOrderResult<HelpOrder> {
        let mut state = self.state.write().await;

        state.next_id += 1;
        let now = Utc::now();
        let help_order = HelpOrder {
            id: state.next_id,
            student_id,
            question,
            answer: None,
            answered_at: None,
            created_at: now,
            updated_at: now,
        };
        state.help_orders.insert(help_order.id, help_order.clone());

        tracing::info!(help_order_id = %help_order.id, student_id = %student_id, "Created help order");
        Ok(help_order)
    }

    async fn get_by_id(&self, id: i32) -> HelpOrderResult<Option<HelpOrder>> {
        let state = self.state.read().await;
        Ok(state.help_orders.get(&id).cloned())
    }

    async fn list_unanswered(&self) -> HelpOrderResult<Vec<HelpOrder>> {
        let state = self.state.read().await;
        Ok(state
            .help_orders
            .values()
            .filter(|h| !h.is_answered())
            .cloned()
            .collect())
    }

    async fn list_by_student(&self, student_id: i32) -> HelpOrderResult<Vec<HelpOrder>> {
        let state = self.state.read().await;
        Ok(state
            .help_orders
            .values()
            .filter(|h| h.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn answer(
        &self,
        id: i32,
        answer: String,
        at: DateTime<Utc>,
    ) -> HelpOrderResult<HelpOrder> {
        let mut state = self.state.write().await;

        let help_order = state
            .help_orders
            .get_mut(&id)
            .ok_or(HelpOrderError::NotFound)?;

        if help_order.is_answered() {
            return Err(HelpOrderError::AlreadyAnswered);
        }

        help_order.answer = Some(answer);
        help_order.answered_at = Some(at);
        help_order.updated_at = at;

        tracing::info!(help_order_id = %id, "Answered help order");
        Ok(help_order.clone())
    }
}
