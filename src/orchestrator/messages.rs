//! Texts the orchestrator posts to the chat room

/// Activation command
pub const ACTIVATE_COMMAND: &str = "/E";

/// Sentinel marking that the bot is waiting for a command
pub const READY: &str = "Ready for input!";

/// How to start a session
pub const INSTRUCTIONS: &str = "To start the HotSpot enter  :  /E";

/// Reply to anything that is not a command
pub const NOT_UNDERSTOOD: &str = "I do not understand you";

/// Question asked after activation
pub const DURATION_PROMPT: &str = "How long do you need the HotSpot for? (in minutes) :";

/// Posted when the requester cannot be located
pub const NOT_CONNECTED: &str = "You are not connected to WiFi, please connect and try again!";

/// Posted after the availability notice
pub const THUMBS_UP: &str = "\u{1F44D}";

/// Posted once the disable job was issued
pub const DISABLED: &str = "HotSpot has been disabled";

/// Last message of a session
pub const FAREWELL: &str = "Thank you for using our service";

/// Enable job status, verbatim
pub fn job_status(status: &str) -> String {
    format!("HotSpot {}", status)
}

/// How long the hotspot stays up
pub fn availability(minutes: u64) -> String {
    let unit = if minutes == 1 { "minute" } else { "minutes" };
    format!("The HotSpot will be available for {} {}", minutes, unit)
}
