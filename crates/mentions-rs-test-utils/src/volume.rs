use mentions_rs_store::{MessageVolumeSource, StoreError, TimeInterval};
use parking_lot::Mutex;

/// Message-volume source returning a fixed total and recording its calls.
#[derive(Default)]
pub struct StubMessageVolume {
    total: u64,
    calls: Mutex<Vec<bool>>,
}

impl StubMessageVolume {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `include_bots` flag of every call so far.
    pub fn calls(&self) -> Vec<bool> {
        self.calls.lock().clone()
    }
}

impl MessageVolumeSource for StubMessageVolume {
    fn total_message_volume(
        &self,
        _interval: &TimeInterval,
        _room_names: &[String],
        _user_names: &[String],
        include_bots: bool,
    ) -> Result<u64, StoreError> {
        self.calls.lock().push(include_bots);
        Ok(self.total)
    }
}
