// A scheduler that has never fired sends at the first opportunity rather
// than idling one interval.
#[derive(Debug, Clone, Copy)]
pub struct SendScheduler {
    send_interval: f64,
    last_send: Option<f64>,
}

impl SendScheduler {
    pub fn new(send_interval: f32) -> Self {
        Self {
            send_interval: send_interval as f64,
            last_send: None,
        }
    }

    pub fn should_send(&self, local_time: f64) -> bool {
        match self.last_send {
            None => true,
            Some(last) => local_time >= last + self.send_interval,
        }
    }

    pub fn mark_sent(&mut self, local_time: f64) {
        self.last_send = Some(local_time);
    }

    pub fn reset(&mut self) {
        self.last_send = None;
    }
}
