pub mod renewal;

pub use renewal::{RenewalScheduler, RenewalSettings, SchedulerHandle, SchedulerState};
