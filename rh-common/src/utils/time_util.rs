use chrono::Local;

pub struct TimeUtil {}

impl TimeUtil {
    pub fn now_str() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}
