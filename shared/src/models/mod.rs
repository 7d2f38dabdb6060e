//! Database-backed entities
//!
//! Plain serde structs; sqlx derives are enabled through the `db` feature.

pub mod dish;
pub mod order;
pub mod restaurant;
pub mod system_issue;

pub use dish::Dish;
pub use order::{
    AttemptStatus, Order, OrderCreate, OrderLine, OrderLineCreate, OrderStatus, PaymentAttempt,
};
pub use restaurant::Restaurant;
pub use system_issue::{SystemIssue, SystemIssueCreate};
