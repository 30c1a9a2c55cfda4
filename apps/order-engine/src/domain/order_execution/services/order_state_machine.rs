//! Ticket status lifecycle.

use crate::domain::order_execution::errors::OrderError;
use crate::domain::order_execution::value_objects::OrderStatus;
use crate::domain::shared::OrderId;

/// Lifecycle table for ticket statuses.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Statuses reachable in one step from `from`.
    #[must_use]
    pub const fn successors(from: OrderStatus) -> &'static [OrderStatus] {
        match from {
            OrderStatus::New => &[OrderStatus::Submitted, OrderStatus::Invalid],
            OrderStatus::Submitted => &[
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Canceled,
                OrderStatus::Invalid,
            ],
            OrderStatus::PartiallyFilled => &[
                OrderStatus::PartiallyFilled,
                OrderStatus::Filled,
                OrderStatus::Canceled,
            ],
            OrderStatus::Filled | OrderStatus::Canceled | OrderStatus::Invalid => &[],
        }
    }

    /// Whether `from -> to` is one lifecycle step.
    #[must_use]
    pub fn allows(from: OrderStatus, to: OrderStatus) -> bool {
        Self::successors(from).contains(&to)
    }

    /// Check one step for ticket `order_id`.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` if the step is not in the table.
    pub fn check(order_id: OrderId, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::allows(from, to) {
            Ok(())
        } else {
            Err(OrderError::IllegalTransition { order_id, from, to })
        }
    }
}
