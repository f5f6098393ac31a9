use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::worker::WorkerId;

/// Progress added to every processing order on each tick.
pub const PROGRESS_STEP: u32 = 10;

/// Progress at which an order is considered cooked.
pub const PROGRESS_COMPLETE: u32 = 100;

/// Identifier of an order, unique within one kitchen and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Processing => write!(f, "processing"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A unit of work travelling through the kitchen.
///
/// `Order` is not `Clone`. Exactly one of the queue, a bot or the completion
/// log holds it at any time, and moving it is the only way to change owner.
/// Callers observe orders through [`OrderView`].
#[derive(Debug)]
pub struct Order {
    id: OrderId,
    is_vip: bool,
    status: OrderStatus,
    progress: u32,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(id: OrderId, is_vip: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            is_vip,
            status: OrderStatus::Pending,
            progress: 0,
            created_at,
            completed_at: None,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn is_vip(&self) -> bool {
        self.is_vip
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// True if `self` must be served before `other`.
    ///
    /// VIP beats normal; inside a tier the earlier `created_at` wins and the
    /// lower id breaks timestamp collisions, which is creation call order.
    pub fn precedes(&self, other: &Order) -> bool {
        if self.is_vip != other.is_vip {
            return self.is_vip;
        }
        (self.created_at, self.id) < (other.created_at, other.id)
    }

    /// Begin a fresh processing span. Progress always restarts from zero.
    pub(crate) fn start_processing(&mut self) {
        self.status = OrderStatus::Processing;
        self.progress = 0;
    }

    /// Advance a processing order by `step`, clamped to completion.
    pub(crate) fn advance(&mut self, step: u32) {
        if self.status == OrderStatus::Processing {
            self.progress = self.progress.saturating_add(step).min(PROGRESS_COMPLETE);
        }
    }

    pub(crate) fn is_cooked(&self) -> bool {
        self.status == OrderStatus::Processing && self.progress >= PROGRESS_COMPLETE
    }

    pub(crate) fn complete(&mut self, at: DateTime<Utc>) {
        self.progress = PROGRESS_COMPLETE;
        self.status = OrderStatus::Completed;
        if self.completed_at.is_none() {
            self.completed_at = Some(at);
        }
    }

    /// Undo an in-flight run when the bot holding it is removed.
    pub(crate) fn revert_to_pending(&mut self) {
        self.status = OrderStatus::Pending;
        self.progress = 0;
    }

    pub fn view(&self) -> OrderView {
        OrderView {
            id: self.id,
            is_vip: self.is_vip,
            status: self.status,
            progress: self.progress,
            created_at: self.created_at,
            completed_at: self.completed_at,
            worker_id: None,
        }
    }
}

/// Read-only snapshot of an order handed out to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderView {
    pub id: OrderId,
    pub is_vip: bool,
    pub status: OrderStatus,
    pub progress: u32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Bot currently cooking the order; only set for processing orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn new_order_is_pending_at_zero() {
        let order = Order::new(OrderId(1), true, at(10));
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.progress(), 0);
        assert!(order.completed_at().is_none());
    }

    #[test]
    fn vip_precedes_normal_regardless_of_time() {
        let normal = Order::new(OrderId(1), false, at(1));
        let vip = Order::new(OrderId(2), true, at(50));
        assert!(vip.precedes(&normal));
        assert!(!normal.precedes(&vip));
    }

    #[test]
    fn same_tier_orders_by_time_then_id() {
        let early = Order::new(OrderId(5), false, at(1));
        let late = Order::new(OrderId(2), false, at(2));
        assert!(early.precedes(&late));

        let a = Order::new(OrderId(3), true, at(7));
        let b = Order::new(OrderId(4), true, at(7));
        assert!(a.precedes(&b));
        assert!(!b.precedes(&a));
    }

    #[test]
    fn advance_clamps_at_complete() {
        let mut order = Order::new(OrderId(1), false, at(0));
        order.start_processing();
        for _ in 0..15 {
            order.advance(PROGRESS_STEP);
        }
        assert_eq!(order.progress(), PROGRESS_COMPLETE);
        assert!(order.is_cooked());
    }

    #[test]
    fn advance_ignores_pending_orders() {
        let mut order = Order::new(OrderId(1), false, at(0));
        order.advance(PROGRESS_STEP);
        assert_eq!(order.progress(), 0);
    }

    #[test]
    fn completed_at_is_set_once() {
        let mut order = Order::new(OrderId(1), false, at(0));
        order.start_processing();
        order.complete(at(5));
        order.complete(at(9));
        assert_eq!(order.completed_at(), Some(at(5)));
        assert_eq!(order.status(), OrderStatus::Completed);
    }

    #[test]
    fn revert_resets_progress() {
        let mut order = Order::new(OrderId(1), false, at(0));
        order.start_processing();
        order.advance(40);
        order.revert_to_pending();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.progress(), 0);
    }

    #[test]
    fn status_display() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Processing.to_string(), "processing");
        assert_eq!(OrderStatus::Completed.to_string(), "completed");
    }
}
