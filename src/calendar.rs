//! Calendar value model: masked calendar points and spans.
//!
//! ```text
//!   SemanticInstruction ──apply──▶ CalendarPoint ──▶ "2015-06-03", "XXXX-WXX-1"
//!                          │            │
//!                          │            ├─ set / add / open / mask   (point.rs)
//!                          │            └─ seek / seek_nearest / seek_nth (window.rs)
//!                          └──apply──▶ Duration ──▶ "P2D", "PXY"    (duration.rs)
//! ```
//!
//! All date arithmetic goes through chrono; `shift.rs` only adds month
//! clamping and unit boundaries on top.

#[path = "calendar/duration.rs"]
mod duration;
#[path = "calendar/labels.rs"]
mod labels;
#[path = "calendar/point.rs"]
mod point;
#[path = "calendar/shift.rs"]
mod shift;
#[path = "calendar/window.rs"]
mod window;

pub use duration::{Duration, Fuzz};
pub use labels::{PartOfDay, Season};
pub use point::{CalendarPoint, SlotState};
pub use shift::DurationUnit;
pub use window::SeekWindows;
