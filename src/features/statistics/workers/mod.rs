mod bnpb_sync_scheduler;

pub use bnpb_sync_scheduler::{next_run_after, BnpbSyncScheduler};
