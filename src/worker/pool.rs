use serde::{Deserialize, Serialize};

use crate::scheduler::order::{Order, OrderView};

/// Identifier of a cooking bot, unique within one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub u64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bot-{}", self.0)
    }
}

/// A capacity slot that cooks at most one order at a time.
#[derive(Debug)]
pub struct Bot {
    id: WorkerId,
    current_order: Option<Order>,
}

impl Bot {
    fn new(id: WorkerId) -> Self {
        Self {
            id,
            current_order: None,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn is_idle(&self) -> bool {
        self.current_order.is_none()
    }

    pub fn current_order(&self) -> Option<&Order> {
        self.current_order.as_ref()
    }

    /// Hand an order to an idle bot and start a fresh processing span.
    ///
    /// A busy bot refuses and gives the order back.
    pub fn assign(&mut self, mut order: Order) -> Result<(), Order> {
        if self.current_order.is_some() {
            return Err(order);
        }
        order.start_processing();
        tracing::debug!(worker_id = %self.id, order_id = %order.id(), "Order assigned");
        self.current_order = Some(order);
        Ok(())
    }

    /// Advance the held order, if any.
    pub fn advance(&mut self, step: u32) {
        if let Some(order) = self.current_order.as_mut() {
            order.advance(step);
        }
    }

    /// Release the held order if it has finished cooking.
    pub fn take_cooked(&mut self) -> Option<Order> {
        if self.current_order.as_ref().is_some_and(Order::is_cooked) {
            self.current_order.take()
        } else {
            None
        }
    }

    /// View of the held order tagged with this bot's id.
    pub fn order_view(&self) -> Option<OrderView> {
        self.current_order.as_ref().map(|order| OrderView {
            worker_id: Some(self.id),
            ..order.view()
        })
    }
}

/// Ordered pool of bots. Grows at the end and shrinks from the end.
#[derive(Debug)]
pub struct BotPool {
    bots: Vec<Bot>,
    next_id: u64,
}

impl Default for BotPool {
    fn default() -> Self {
        Self::new()
    }
}

impl BotPool {
    pub fn new() -> Self {
        Self {
            bots: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a new idle bot.
    pub fn grow(&mut self) -> WorkerId {
        let id = WorkerId(self.next_id);
        self.next_id += 1;
        self.bots.push(Bot::new(id));
        tracing::debug!(worker_id = %id, bots = self.bots.len(), "Bot added");
        id
    }

    /// Remove the most recently added bot.
    ///
    /// Any order it was cooking comes back reverted to pending with zero
    /// progress so the caller can requeue it. An empty pool is left as is.
    pub fn shrink(&mut self) -> Option<Order> {
        let bot = self.bots.pop()?;
        tracing::debug!(worker_id = %bot.id, bots = self.bots.len(), "Bot removed");
        let mut order = bot.current_order?;
        order.revert_to_pending();
        tracing::info!(worker_id = %bot.id, order_id = %order.id(), "Order reclaimed");
        Some(order)
    }

    /// Idle bots in pool order.
    pub fn idle_workers(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter().filter(|b| b.is_idle())
    }

    pub fn idle_workers_mut(&mut self) -> impl Iterator<Item = &mut Bot> {
        self.bots.iter_mut().filter(|b| b.is_idle())
    }

    /// Bots currently holding an order, in pool order.
    pub fn busy_workers(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter().filter(|b| !b.is_idle())
    }

    pub fn busy_workers_mut(&mut self) -> impl Iterator<Item = &mut Bot> {
        self.bots.iter_mut().filter(|b| !b.is_idle())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bot> {
        self.bots.iter()
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
