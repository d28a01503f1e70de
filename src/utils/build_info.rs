use std::fmt;

/// Build metadata embedded by `build.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_status: &'static str,
    pub timestamp: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
    pub rustc: &'static str,
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn current() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        git_hash: option_env!("SPENDWISE_BUILD_HASH").unwrap_or("unknown"),
        git_status: option_env!("SPENDWISE_BUILD_STATUS").unwrap_or("unknown"),
        timestamp: option_env!("SPENDWISE_BUILD_TIMESTAMP").unwrap_or("unknown"),
        target: option_env!("SPENDWISE_BUILD_TARGET").unwrap_or("unknown"),
        profile: option_env!("SPENDWISE_BUILD_PROFILE").unwrap_or("unknown"),
        rustc: option_env!("SPENDWISE_BUILD_RUSTC").unwrap_or("unknown"),
    }
}

impl BuildInfo {
    /// `label: value` pairs in display order.
    pub fn fields(&self) -> [(&'static str, &'static str); 6] {
        [
            ("commit", self.git_hash),
            ("tree", self.git_status),
            ("built", self.timestamp),
            ("target", self.target),
            ("profile", self.profile),
            ("rustc", self.rustc),
        ]
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spendwise {} ({}", self.version, self.git_hash)?;
        if self.git_status == "dirty" {
            f.write_str(", dirty")?;
        }
        write!(f, ", {})", self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_starts_with_package_version() {
        let info = current();
        assert!(info.to_string().starts_with(&format!("spendwise {VERSION} (")));
        assert_eq!(info.fields().len(), 6);
    }
}
