use chrono::Utc;

pub trait ClockInterface {
    fn now_millis(&self) -> i64;
}

pub struct SystemClock;

impl ClockInterface for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
