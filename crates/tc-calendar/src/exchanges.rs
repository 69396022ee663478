//! Built-in reference exchange definitions.
//!
//! Each definition is plain data fed through [`ExchangeSchedule::builder`]:
//! category-specific behaviour such as a Friday early close or a late Sunday
//! open lives in the adjustment rules, not in code.
//!
//! [`ExchangeSchedule::builder`]: crate::schedule::ExchangeSchedule::builder

/// 24/7 crypto venues.
pub mod crypto;

/// Forex-style venues: Sunday evening to Friday evening, New York DST.
pub mod forex;

/// Metals-style venues: Sunday late open, Friday early close.
pub mod metals;

pub use crypto::crypto;
pub use forex::forex;
pub use metals::metals;
