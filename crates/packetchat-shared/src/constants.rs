/// Application name
pub const APP_NAME: &str = "packetchat";

/// Durable store key holding the ordered thread list (callsign + last path)
pub const KEY_CALLSIGN_LIST: &str = "callsign_list";

/// Durable store key holding the per-thread message maps
pub const KEY_MESSAGE_LIST: &str = "message_list";

/// Durable store key holding the last-known location per peer
pub const KEY_CALLSIGN_LOCATION: &str = "callsign_location";

/// Routing path used when a send does not name one
pub const DEFAULT_PACKET_PATH: &str = "WIDE1-1,WIDE2-1";

/// Bound of the inbound push-event channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Longest callsign accepted (base call, dash, SSID)
pub const MAX_CALLSIGN_LEN: usize = 9;
