pub mod inventory;
pub mod resize;
pub mod types;
mod utils;

pub use inventory::{list_disks, probe_medium, VmInfo};
pub use resize::{is_supported_provider, ResizeDisk, ResizeError};
pub use types::{DiskDescriptor, GrowthOutcome, MediumProbe, Slot};
pub use utils::{growable_counterpart, parse_capacity, parse_slot};
