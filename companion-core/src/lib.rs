//! companion-core: pure derivation logic for the CareCompanion schedule.
//!
//! Everything here is synchronous, side-effect-free, and safe to re-run:
//! the fetched task and medication lists go in, classified/expanded/bucketed
//! schedule groups come out. Network and rendering live in the companion-api
//! and companion-cli crates.

pub mod bucket;
pub mod bus;
pub mod classify;
pub mod describe;
pub mod expand;
pub mod model;
pub mod schedule;
pub mod time;
pub mod write_target;

pub use bucket::{Buckets, BucketPolicy, ViewMode, bucket, minutes_label};
pub use bus::{ChangeBus, ChangeTopic, Subscription};
pub use classify::{Classification, ItemKind, classify};
pub use describe::{DescriptionMeta, parse_description};
pub use expand::{expand_medication, expand_recurring_task};
pub use model::{
    DoseStatus, Medication, MedicationScheduleEntry, Priority, Recurrence, Task, TaskStatus,
    split_virtual_id, virtual_task_id,
};
pub use schedule::{ItemStatus, ScheduleItem, dose_item_id};
pub use write_target::{EditScope, WriteTarget, resolve_complete_target, resolve_write_target};
