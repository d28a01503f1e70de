pub mod clock;
pub mod errors;
pub mod recurrence;
pub mod services;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{CliError, Result, SpendError};
pub use recurrence::{is_due, materialize, next_due_date, select_due, Materialized};
