//! Portfolio Bounded Context
//!
//! The portfolio owns the cash book and the security registry. Securities
//! reference currencies by code, resolved through the cash book on each use.

mod aggregate;
mod cash;
mod target;

pub use aggregate::Portfolio;
pub use cash::{Cash, CashBook};
pub use target::PortfolioTarget;
