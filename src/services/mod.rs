pub mod attendance;
pub mod events;

pub use attendance::AttendanceService;
pub use events::{AttendanceEvent, BroadcastEventPublisher, EventPublisher};
