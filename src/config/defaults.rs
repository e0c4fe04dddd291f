//! Default value functions for configuration (spec §6 "Configuration").

pub fn default_max_clients() -> usize {
    4096
}

pub fn default_timeout_seconds() -> u64 {
    120
}

pub fn default_ping_interval_seconds() -> u64 {
    90
}

pub fn default_messages_per_second() -> u32 {
    2
}

pub fn default_burst() -> u32 {
    5
}

pub fn default_send_queue_len() -> usize {
    100
}

pub fn default_linking_enabled() -> bool {
    false
}
