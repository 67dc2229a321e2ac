/// Current UTC timestamp in seconds, used for export file names
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
