//! Cooking bots and the pool that holds them.
//!
//! The pool is a stack: [`BotPool::grow`] appends an idle bot and
//! [`BotPool::shrink`] pops the most recently added one, handing back any
//! order it was cooking so the kitchen can requeue it.
//!
//! # Components
//!
//! - [`Bot`]: holds at most one [`Order`](crate::scheduler::Order)
//! - [`BotPool`]: ordered, resizable collection of bots

pub mod pool;

pub use pool::{Bot, BotPool, WorkerId};
