//! Integration tests for the emuhost core
//!
//! Drive the host adapter, session controller, execution thread and frame
//! pacer together the way a real host would.


#[cfg(test)]
pub(crate) mod test_utils {
    use std::sync::Arc;

    use crate::{
        host::{HostAdapter, ReadyStorage},
        pacing::IntervalFramePacer,
        session::SessionController,
        test_utils::RecordingEngine,
    };

    pub type TestHost = HostAdapter<RecordingEngine, IntervalFramePacer<RecordingEngine>, ReadyStorage>;

    /// Build a host UI around an existing (possibly shared) session
    pub fn create_test_host(
        engine: &Arc<RecordingEngine>,
        session: Arc<SessionController<RecordingEngine>>,
    ) -> TestHost {
        HostAdapter::new(
            session,
            IntervalFramePacer::new(engine.clone(), 500),
            ReadyStorage,
        )
    }
}
