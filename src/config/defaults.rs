//! Default value functions for configuration.

pub fn default_server_name() -> String {
    "server".to_string()
}

pub fn default_outbound_queue() -> usize {
    64
}

pub fn default_max_frame_bytes() -> usize {
    chitchat_proto::DEFAULT_MAX_FRAME_LEN
}
