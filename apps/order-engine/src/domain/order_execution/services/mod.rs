//! Order Execution Domain Services
//!
//! Stateless business logic that doesn't fit in the ticket.

mod order_state_machine;

pub use order_state_machine::OrderStateMachine;
