//! Ticket lifecycle errors.

use std::fmt;

use rust_decimal::Decimal;

use super::value_objects::OrderStatus;
use crate::domain::shared::OrderId;

/// A ticket was driven through a step its status does not allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Status change outside the lifecycle.
    IllegalTransition {
        /// Ticket id.
        order_id: OrderId,
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Fill against a ticket that is not open.
    NotFillable {
        /// Ticket id.
        order_id: OrderId,
        /// Current status.
        status: OrderStatus,
    },

    /// Fill larger than, or opposite to, the unfilled quantity.
    Overfill {
        /// Ticket id.
        order_id: OrderId,
        /// Signed fill quantity.
        quantity: Decimal,
        /// Signed unfilled quantity.
        remaining: Decimal,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllegalTransition { order_id, from, to } if from.is_terminal() => {
                write!(f, "Order {order_id} is already {from} and cannot become {to}")
            }
            Self::IllegalTransition { order_id, from, to } => {
                write!(f, "Order {order_id} cannot move from {from} to {to}")
            }
            Self::NotFillable { order_id, status } => {
                write!(f, "Order {order_id} cannot fill while {status}")
            }
            Self::Overfill {
                order_id,
                quantity,
                remaining,
            } => write!(
                f,
                "Fill of {quantity} on order {order_id} does not fit the unfilled {remaining}"
            ),
        }
    }
}

impl std::error::Error for OrderError {}
