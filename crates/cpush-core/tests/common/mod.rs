pub mod scripted_server;

use cpush_core::Sleeper;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records requested sleeps instead of blocking, so backoff schedules can be
/// asserted without waiting them out.
#[derive(Default, Clone)]
pub struct RecordingSleeper {
    slept: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
