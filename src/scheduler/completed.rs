use std::collections::{HashSet, VecDeque};

use crate::scheduler::order::{Order, OrderId, OrderView};

/// Append-only record of cooked orders, newest first.
#[derive(Debug, Default)]
pub struct CompletionLog {
    orders: VecDeque<Order>,
    ids: HashSet<OrderId>,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished order. Returns false if the id was already logged.
    pub fn append(&mut self, order: Order) -> bool {
        if !self.ids.insert(order.id()) {
            tracing::warn!(order_id = %order.id(), "Order already completed, discarding duplicate");
            return false;
        }
        self.orders.push_front(order);
        true
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.ids.contains(&id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        if !self.contains(id) {
            return None;
        }
        self.orders.iter().find(|o| o.id() == id)
    }

    /// Logged orders, most recently completed first.
    pub fn list(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn views(&self) -> Vec<OrderView> {
        self.orders.iter().map(Order::view).collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn done(id: u64) -> Order {
        let mut order = Order::new(OrderId(id), false, Utc::now());
        order.start_processing();
        order.complete(Utc::now());
        order
    }

    #[test]
    fn newest_first() {
        let mut log = CompletionLog::new();
        log.append(done(1));
        log.append(done(2));
        log.append(done(3));
        let ids: Vec<u64> = log.list().map(|o| o.id().0).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn duplicate_append_is_noop() {
        let mut log = CompletionLog::new();
        assert!(log.append(done(7)));
        assert!(!log.append(done(7)));
        assert_eq!(log.len(), 1);
        assert!(log.contains(OrderId(7)));
    }
}
