//! Fatal engine errors.
//!
//! Order rejections are never errors: they come back as an
//! [`OrderResponse`](crate::domain::order_execution::OrderResponse) on the
//! ticket. The variants here stop the run.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::order_execution::{OrderError, OrderType};
use crate::domain::shared::{DomainError, OptionRight};

/// Errors that abort an engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No subscribed contract, American or European, matches a strategy leg.
    #[error(
        "Unable to find the contract for strategy '{strategy}': {right:?} {strike} expiring {expiration}"
    )]
    StrategyContractNotFound {
        /// Strategy name.
        strategy: String,
        /// Leg right.
        right: OptionRight,
        /// Leg strike.
        strike: Decimal,
        /// Leg expiration.
        expiration: NaiveDate,
    },

    /// A strategy leg asked for an order type other than market or limit.
    #[error("Unsupported order type {order_type} for a leg of strategy '{strategy}'")]
    UnsupportedLegOrderType {
        /// Strategy name.
        strategy: String,
        /// Requested leg order type.
        order_type: OrderType,
    },

    /// A limit leg without a limit price.
    #[error("Limit leg of strategy '{strategy}' has no order price")]
    MissingLegPrice {
        /// Strategy name.
        strategy: String,
    },

    /// Settings mutation after the simulation clock started.
    #[error("Setting '{setting}' cannot be changed after the algorithm has started")]
    SettingsLocked {
        /// Name of the setting.
        setting: &'static str,
    },

    /// Configured number that has no decimal representation.
    #[error("Setting '{setting}' has an unrepresentable value {value}")]
    InvalidSetting {
        /// Name of the setting.
        setting: &'static str,
        /// Value as configured.
        value: f64,
    },

    /// Driver call for a symbol that is not subscribed.
    #[error("Security {0} is not subscribed")]
    UnknownSecurity(String),

    /// Ticket state violation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Domain state violation.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
