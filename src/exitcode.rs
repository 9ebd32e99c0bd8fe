//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (model answer or input is not a roadmap)
pub const DATAERR: i32 = 65;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Service unavailable (inference server unreachable)
pub const UNAVAILABLE: i32 = 69;

/// Input/output error
pub const IOERR: i32 = 74;

/// Remote error in protocol (inference server returned 4xx/5xx)
pub const PROTOCOL: i32 = 76;

/// Configuration error
pub const CONFIG: i32 = 78;
