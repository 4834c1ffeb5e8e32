//! Search limits and time allocation.

pub mod limiter;
pub mod time_management;
pub mod uci_timer;

pub use self::limiter::{SearchLimiter, SoftStopFactors};
pub use self::time_management::TimeManager;
pub use self::uci_timer::{PreLimits, UCITimer};
