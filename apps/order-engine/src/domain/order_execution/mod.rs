//! Order Execution Bounded Context
//!
//! Immutable order requests, mutable tickets and the status lifecycle
//! `New -> Submitted -> {Filled | PartiallyFilled -> Filled | Canceled}`,
//! `New -> Invalid`.

pub mod errors;
pub mod request;
pub mod services;
pub mod ticket;
pub mod value_objects;

pub use errors::OrderError;
pub use request::SubmitOrderRequest;
pub use services::OrderStateMachine;
pub use ticket::OrderTicket;
pub use value_objects::{
    OrderDirection, OrderEvent, OrderFee, OrderProperties, OrderResponse, OrderResponseErrorCode,
    OrderStatus, OrderType, TimeInForce,
};
