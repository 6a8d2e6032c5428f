//! Explicit configuration for traversal state.

/// Environment variable that decouples the diffuse-color and transparency
/// override flags.
pub const SEPARATE_OVERRIDE_ENV: &str = "COIN_SEPARATE_DIFFUSE_TRANSPARENCY_OVERRIDE";

/// Configuration threaded into every traversal state at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateConfig {
    /// When false (the default), setting the diffuse-color override also
    /// sets the transparency override and vice versa. When true the two
    /// flags are independent.
    pub separate_diffuse_transparency_override: bool,
}

impl StateConfig {
    /// Configuration with the diffuse/transparency override coupling
    /// explicitly chosen.
    pub const fn with_separate_override(separate: bool) -> Self {
        Self {
            separate_diffuse_transparency_override: separate,
        }
    }

    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(SEPARATE_OVERRIDE_ENV).ok().as_deref())
    }

    /// Build the configuration from the raw value of
    /// `COIN_SEPARATE_DIFFUSE_TRANSPARENCY_OVERRIDE`.
    ///
    /// The value is interpreted like C `atoi`: any non-zero leading integer
    /// enables separate overrides; missing or non-numeric values do not.
    pub fn from_env_value(value: Option<&str>) -> Self {
        let separate = value.is_some_and(|v| atoi(v) != 0);
        Self::with_separate_override(separate)
    }
}

/// C `atoi`: leading whitespace, optional sign, then as many digits as present.
fn atoi(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(byte - b'0'));
    }
    if negative { -value } else { value }
}
