// -
// Wire protocol

/// Envelope field carrying a telemetry update
pub const TELEMETRY_ENVELOPE_FIELD: &str = "networkTableUpdate";

/// Envelope field carrying the auxiliary auto configuration blob
pub const AUTO_CONFIGS_ENVELOPE_FIELD: &str = "autoConfigs";

/// `valueType` sent for a write to an entry that has never received a value
pub const UNKNOWN_VALUE_TYPE: &str = "unknown";

/// Port the bridge listens on
pub const DEFAULT_BRIDGE_URL: &str = "ws://localhost:13102";

// -
// Key tree

pub(crate) const KEY_SEPARATOR: char = '/';

/// Segments starting with this prefix belong to internal namespaces
pub(crate) const HIDDEN_SEGMENT_PREFIX: char = '.';

// -
// History

/// Entry holding the current FMS match number
pub const MATCH_NUMBER_KEY: &str = "/FMSInfo/MatchNumber";

/// Label used when no positive match number is available
pub const TESTING_LABEL: &str = "Testing";

/// Storage key prefix for per-entry history lists
pub(crate) const HISTORY_KEY_PREFIX: &str = "history/";

// -
// Timing

pub(crate) const DEFAULT_RECONNECT_DELAY_IN_MS: u64 = 1000;

pub(crate) const DEFAULT_STALE_AFTER_IN_MS: u64 = 5000;
