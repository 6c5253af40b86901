// Version and build tracking for the agent gateway
// The outbound User-Agent strings are derived from these constants

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BUILD: &str = "0007";

/// User-Agent sent with outbound health-check requests
pub const HEALTH_CHECK_USER_AGENT: &str =
    concat!("agent-gateway-health-check/", env!("CARGO_PKG_VERSION"));

/// User-Agent sent with outbound tool invocations
pub const TOOL_EXECUTION_USER_AGENT: &str = concat!("agent-gateway/", env!("CARGO_PKG_VERSION"));

pub fn version_string() -> String {
    format!("v{}-{}", VERSION, BUILD)
}

pub fn full_version_info() -> String {
    format!("Agent Gateway {} (Build {})", VERSION, BUILD)
}
