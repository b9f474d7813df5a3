/// Error code registry for cepdist
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 3000-3999: Provider (collaborator) errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_PATH_ERROR: u16 = 1006;

    // Provider errors (3000-3999)
    pub const PROVIDER_TRANSPORT: u16 = 3001;
    pub const PROVIDER_HTTP_STATUS: u16 = 3002;
    pub const PROVIDER_DECODE: u16 = 3003;
    pub const PROVIDER_UNAVAILABLE: u16 = 3004;
    pub const PROVIDER_OUT_OF_RANGE: u16 = 3005;

    // Validation errors (7000-7999)
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7003;
    pub const VALIDATION_POSTAL_CODE_FORMAT: u16 = 7004;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
    pub const OTHER_IO: u16 = 9001;
}
