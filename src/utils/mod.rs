pub mod ids;
pub mod time;
pub mod validate;

pub use ids::{parse_uuid, parse_uuid_opt};
pub use time::{from_timestamp, from_timestamp_opt, today};
pub use validate::{validate_date_range, validate_not_blank, validate_not_future};
