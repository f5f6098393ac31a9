use std::collections::VecDeque;

use crate::scheduler::order::{Order, OrderId, OrderView};

/// Orders waiting for a bot, kept VIP-first and FIFO within each tier.
#[derive(Debug, Default)]
pub struct OrderQueue {
    orders: VecDeque<Order>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an order ahead of the first queued order it precedes.
    ///
    /// Returns false, and drops the order, if its id is already queued.
    pub fn enqueue(&mut self, order: Order) -> bool {
        if self.contains(order.id()) {
            tracing::warn!(order_id = %order.id(), "Order already queued, discarding duplicate");
            return false;
        }
        let index = self
            .orders
            .iter()
            .position(|queued| order.precedes(queued))
            .unwrap_or(self.orders.len());
        self.orders.insert(index, order);
        true
    }

    /// Remove and return the highest-priority order.
    pub fn dequeue_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    /// Remove the order with `id`, keeping everything else in place.
    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let index = self.orders.iter().position(|o| o.id() == id)?;
        self.orders.remove(index)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.iter().any(|o| o.id() == id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id() == id)
    }

    /// Queued orders front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
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
