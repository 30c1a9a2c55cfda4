//! Order Execution Value Objects

mod fill;
mod order_status;
mod order_type;
mod response;
mod time_in_force;

pub use fill::{OrderEvent, OrderFee};
pub use order_status::OrderStatus;
pub use order_type::{OrderDirection, OrderType};
pub use response::{OrderResponse, OrderResponseErrorCode};
pub use time_in_force::{OrderProperties, TimeInForce};
