pub mod completed;
pub mod kitchen;
pub mod order;
pub mod queue;

pub use completed::CompletionLog;
pub use kitchen::{
    Kitchen, KitchenSnapshot, KitchenStats, TickReport, WorkerCount, DEFAULT_MAX_BOTS,
};
pub use order::{Order, OrderId, OrderStatus, OrderView, PROGRESS_COMPLETE, PROGRESS_STEP};
pub use queue::OrderQueue;
