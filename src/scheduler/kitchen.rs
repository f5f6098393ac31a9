use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KitchenError, Result};
use crate::scheduler::completed::CompletionLog;
use crate::scheduler::order::{Order, OrderId, OrderStatus, OrderView, PROGRESS_STEP};
use crate::scheduler::queue::OrderQueue;
use crate::worker::{BotPool, WorkerId};

/// Bot limit used when none is configured.
pub const DEFAULT_MAX_BOTS: usize = 1024;

/// A validated, non-negative bot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCount(pub usize);

impl TryFrom<i64> for WorkerCount {
    type Error = KitchenError;

    fn try_from(value: i64) -> Result<Self> {
        usize::try_from(value)
            .map(WorkerCount)
            .map_err(|_| KitchenError::NegativeWorkerCount(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenStats {
    pub tick: u64,
    pub bots: usize,
    pub idle_bots: usize,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
}

/// Consistent picture of the whole kitchen taken at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitchenSnapshot {
    pub stats: KitchenStats,
    pub pending: Vec<OrderView>,
    pub processing: Vec<OrderView>,
    pub completed: Vec<OrderView>,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub assigned: Vec<(WorkerId, OrderId)>,
    pub completed: Vec<OrderId>,
}

/// The order kitchen: a priority queue feeding a bot pool, draining into a
/// completion log.
///
/// Every order lives in exactly one of the three and is moved between them by
/// value. All mutation goes through `&mut self`, so one tick or one external
/// call is always applied as a whole.
#[derive(Debug)]
pub struct Kitchen {
    queue: OrderQueue,
    pool: BotPool,
    completed: CompletionLog,
    max_bots: usize,
    next_order_id: u64,
    tick: u64,
}

impl Default for Kitchen {
    fn default() -> Self {
        Self::new()
    }
}

impl Kitchen {
    pub fn new() -> Self {
        Self::with_max_bots(DEFAULT_MAX_BOTS)
    }

    /// Empty kitchen whose pool never grows beyond `max_bots`.
    pub fn with_max_bots(max_bots: usize) -> Self {
        Self {
            queue: OrderQueue::new(),
            pool: BotPool::new(),
            completed: CompletionLog::new(),
            max_bots,
            next_order_id: 1,
            tick: 0,
        }
    }

    /// Kitchen that starts with `bots` idle bots under the default limit.
    pub fn with_bots(bots: usize) -> Result<Self> {
        let mut kitchen = Self::new();
        kitchen.set_worker_count(bots)?;
        Ok(kitchen)
    }

    pub fn create_order(&mut self, is_vip: bool) -> OrderId {
        self.create_order_at(is_vip, Utc::now())
    }

    /// Create an order stamped with `created_at` and queue it.
    pub fn create_order_at(&mut self, is_vip: bool, created_at: DateTime<Utc>) -> OrderId {
        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.queue.enqueue(Order::new(id, is_vip, created_at));
        tracing::info!(order_id = %id, vip = is_vip, pending = self.queue.len(), "Order created");
        id
    }

    /// Cancel a pending order.
    ///
    /// Returns `Ok(false)` for ids that are not known (or already cancelled)
    /// and rejects orders that are already cooking or cooked.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<bool> {
        if self.queue.remove(id).is_some() {
            tracing::info!(order_id = %id, "Order cancelled");
            return Ok(true);
        }
        if let Some(status) = self.status_outside_queue(id) {
            return Err(KitchenError::OrderNotPending { id, status });
        }
        tracing::debug!(order_id = %id, "Cancel ignored, order not found");
        Ok(false)
    }

    fn status_outside_queue(&self, id: OrderId) -> Option<OrderStatus> {
        if self.completed.contains(id) {
            return Some(OrderStatus::Completed);
        }
        self.pool
            .busy_workers()
            .filter_map(|bot| bot.current_order())
            .find(|order| order.id() == id)
            .map(Order::status)
    }

    /// Append one idle bot, unless the pool is already at its limit.
    pub fn add_bot(&mut self) -> Result<WorkerId> {
        self.check_bot_limit(self.pool.len() + 1)?;
        Ok(self.pool.grow())
    }

    fn check_bot_limit(&self, requested: usize) -> Result<()> {
        if requested > self.max_bots {
            return Err(KitchenError::TooManyWorkers {
                requested,
                max: self.max_bots,
            });
        }
        Ok(())
    }

    /// Remove the newest bot, requeueing whatever it was cooking.
    ///
    /// Returns the id of the requeued order, if there was one.
    pub fn remove_bot(&mut self) -> Option<OrderId> {
        let order = self.pool.shrink()?;
        let id = order.id();
        if self.queue.enqueue(order) {
            Some(id)
        } else {
            None
        }
    }

    /// Grow or shrink the pool until it holds exactly `n` bots.
    ///
    /// A count above the bot limit is rejected and leaves the pool untouched.
    pub fn set_worker_count(&mut self, n: usize) -> Result<()> {
        self.check_bot_limit(n)?;
        let before = self.pool.len();
        while self.pool.len() < n {
            self.pool.grow();
        }
        while self.pool.len() > n {
            self.remove_bot();
        }
        if before != n {
            tracing::info!(from = before, to = n, "Bot pool resized");
        }
        Ok(())
    }

    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Utc::now())
    }

    /// Advance the kitchen by one step at time `now`.
    ///
    /// 1. Idle bots, front to back, each take the front of the queue.
    /// 2. Every processing order gains [`PROGRESS_STEP`].
    /// 3. Orders that reached 100 move to the completion log and free their
    ///    bot for the next tick.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        for bot in self.pool.idle_workers_mut() {
            let Some(order) = self.queue.dequeue_front() else {
                break;
            };
            let order_id = order.id();
            if let Err(order) = bot.assign(order) {
                // idle_workers_mut only yields idle bots
                self.queue.enqueue(order);
                continue;
            }
            report.assigned.push((bot.id(), order_id));
        }

        for bot in self.pool.busy_workers_mut() {
            bot.advance(PROGRESS_STEP);
        }

        for bot in self.pool.busy_workers_mut() {
            let Some(mut order) = bot.take_cooked() else {
                continue;
            };
            order.complete(now);
            let order_id = order.id();
            if self.completed.append(order) {
                tracing::info!(order_id = %order_id, worker_id = %bot.id(), tick = self.tick, "Order completed");
                report.completed.push(order_id);
            }
        }

        tracing::trace!(
            tick = self.tick,
            assigned = report.assigned.len(),
            completed = report.completed.len(),
            "Tick processed"
        );
        report
    }

    /// Queued orders in service order.
    pub fn pending_orders(&self) -> Vec<OrderView> {
        self.queue.views()
    }

    /// Orders being cooked, in pool order, each tagged with its bot.
    pub fn processing_orders(&self) -> Vec<OrderView> {
        self.pool
            .busy_workers()
            .filter_map(|bot| bot.order_view())
            .collect()
    }

    /// Cooked orders, most recent first.
    pub fn completed_orders(&self) -> Vec<OrderView> {
        self.completed.views()
    }

    /// Find an order wherever it currently lives.
    pub fn order(&self, id: OrderId) -> Option<OrderView> {
        if let Some(order) = self.queue.get(id) {
            return Some(order.view());
        }
        if let Some(view) = self
            .pool
            .busy_workers()
            .filter_map(|bot| bot.order_view())
            .find(|view| view.id == id)
        {
            return Some(view);
        }
        self.completed.get(id).map(Order::view)
    }

    pub fn worker_count(&self) -> usize {
        self.pool.len()
    }

    pub fn max_bots(&self) -> usize {
        self.max_bots
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn stats(&self) -> KitchenStats {
        let bots = self.pool.len();
        let idle_bots = self.pool.idle_workers().count();
        KitchenStats {
            tick: self.tick,
            bots,
            idle_bots,
            pending: self.queue.len(),
            processing: bots - idle_bots,
            completed: self.completed.len(),
        }
    }

    pub fn snapshot(&self) -> KitchenSnapshot {
        KitchenSnapshot {
            stats: self.stats(),
            pending: self.pending_orders(),
            processing: self.processing_orders(),
            completed: self.completed_orders(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_rejects_negative() {
        assert_eq!(WorkerCount::try_from(3i64).unwrap(), WorkerCount(3));
        assert!(matches!(
            WorkerCount::try_from(-1i64),
            Err(KitchenError::NegativeWorkerCount(-1))
        ));
    }

    #[test]
    fn bot_limit_rejects_oversized_pool() {
        let mut kitchen = Kitchen::with_max_bots(2);
        kitchen.set_worker_count(2).unwrap();
        assert!(matches!(
            kitchen.set_worker_count(3),
            Err(KitchenError::TooManyWorkers { requested: 3, max: 2 })
        ));
        assert!(matches!(
            kitchen.add_bot(),
            Err(KitchenError::TooManyWorkers { requested: 3, max: 2 })
        ));
        assert_eq!(kitchen.worker_count(), 2);
        assert_eq!(kitchen.max_bots(), 2);

        assert!(matches!(
            kitchen.set_worker_count(usize::MAX),
            Err(KitchenError::TooManyWorkers { .. })
        ));
        assert_eq!(kitchen.worker_count(), 2);
    }

    #[test]
    fn with_bots_respects_default_limit() {
        assert!(Kitchen::with_bots(DEFAULT_MAX_BOTS).is_ok());
        assert!(Kitchen::with_bots(DEFAULT_MAX_BOTS + 1).is_err());
    }

    #[test]
    fn order_ids_are_sequential() {
        let mut kitchen = Kitchen::new();
        assert_eq!(kitchen.create_order(false), OrderId(1));
        assert_eq!(kitchen.create_order(true), OrderId(2));
    }

    #[test]
    fn tick_counter_advances() {
        let mut kitchen = Kitchen::new();
        assert_eq!(kitchen.current_tick(), 0);
        let report = kitchen.tick();
        assert_eq!(report.tick, 1);
        assert!(report.assigned.is_empty());
        assert_eq!(kitchen.current_tick(), 1);
    }

    #[test]
    fn assignment_fills_idle_bots_front_to_back() {
        let mut kitchen = Kitchen::with_bots(3).unwrap();
        let a = kitchen.create_order(false);
        let b = kitchen.create_order(false);
        let report = kitchen.tick();
        assert_eq!(
            report.assigned,
            vec![(WorkerId(1), a), (WorkerId(2), b)]
        );
        assert_eq!(kitchen.stats().idle_bots, 1);
    }

    #[test]
    fn freed_bot_waits_for_next_tick() {
        let mut kitchen = Kitchen::with_bots(1).unwrap();
        let first = kitchen.create_order(false);
        let second = kitchen.create_order(false);
        for _ in 0..10 {
            kitchen.tick();
        }
        assert_eq!(kitchen.completed_orders()[0].id, first);
        assert_eq!(kitchen.pending_orders()[0].id, second);
        assert!(kitchen.processing_orders().is_empty());

        let report = kitchen.tick();
        assert_eq!(report.assigned, vec![(WorkerId(1), second)]);
    }

    #[test]
    fn order_lookup_follows_the_order() {
        let mut kitchen = Kitchen::with_bots(1).unwrap();
        let id = kitchen.create_order(true);
        assert_eq!(kitchen.order(id).unwrap().status, OrderStatus::Pending);

        kitchen.tick();
        let view = kitchen.order(id).unwrap();
        assert_eq!(view.status, OrderStatus::Processing);
        assert_eq!(view.worker_id, Some(WorkerId(1)));

        for _ in 0..9 {
            kitchen.tick();
        }
        assert_eq!(kitchen.order(id).unwrap().status, OrderStatus::Completed);
        assert!(kitchen.order(OrderId(99)).is_none());
    }

    #[test]
    fn stats_reflect_state() {
        let mut kitchen = Kitchen::with_bots(2).unwrap();
        kitchen.create_order(false);
        kitchen.create_order(false);
        kitchen.create_order(true);
        kitchen.tick();
        let stats = kitchen.stats();
        assert_eq!(stats.bots, 2);
        assert_eq!(stats.idle_bots, 0);
        assert_eq!(stats.processing, 2);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.completed, 0);
    }
}
