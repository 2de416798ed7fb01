pub mod daemon;
pub mod idle;
pub mod monitor;
pub mod normalize;
pub mod session_tracker;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::activity::{Activity, Sample};

/// Source of foreground-window observations. `Ok(None)` means "nothing
/// focused right now"; errors are tolerated and treated the same way by the
/// poll loop.
#[async_trait]
pub trait Sampler: Send {
    async fn sample(&mut self) -> Result<Option<Sample>>;
}

/// The tracker's only outward effect: finalized activities are handed here.
/// A re-delivery under an already-seen id extends that activity (merge);
/// implementers should upsert by id.
pub trait ActivitySink: Send {
    fn on_activity(&mut self, activity: &Activity);
}

impl<F: FnMut(&Activity) + Send> ActivitySink for F {
    fn on_activity(&mut self, activity: &Activity) {
        self(activity)
    }
}
