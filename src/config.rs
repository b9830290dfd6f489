/// Environment variable read by [`Config::from_env`].
pub const MEMORY_PROFILE_VAR: &str = "SUBVIEW_MEMORY_PROFILE";

///
/// Per-view configuration, passed when the view core is constructed.
///
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Log registry population on every registry mutation,
    /// at debug level on target `subview::memory_profile`.
    pub memory_profile: bool,
}

impl Config {
    pub fn memory_profile() -> Self {
        Self {
            memory_profile: true,
        }
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        let memory_profile = std::env::var(MEMORY_PROFILE_VAR)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Self { memory_profile }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
