use thiserror::Error;

use crate::scheduler::{OrderId, OrderStatus};

#[derive(Error, Debug)]
pub enum KitchenError {
    #[error("Worker count must not be negative, got {0}")]
    NegativeWorkerCount(i64),

    #[error("Worker count {requested} exceeds the limit of {max}")]
    TooManyWorkers { requested: usize, max: usize },

    #[error("Order {id} cannot be cancelled while {status}")]
    OrderNotPending { id: OrderId, status: OrderStatus },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, KitchenError>;
