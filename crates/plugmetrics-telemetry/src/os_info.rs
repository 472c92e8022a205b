//! Operating system information collector
//!
//! Gathers the machine facts that go into every snapshot.
//! Never includes hostname or username.

/// Non-identifying operating system information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsInfo {
    pub name: String,
    pub arch: String,
    pub version: String,
    pub core_count: u32,
}

impl OsInfo {
    /// Collect OS information from the current system.
    pub fn collect() -> Self {
        Self {
            name: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            version: read_os_version(),
            core_count: std::thread::available_parallelism()
                .map(|n| u32::try_from(n.get()).unwrap_or(u32::MAX))
                .unwrap_or(1),
        }
    }
}

fn read_os_version() -> String {
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            std::fs::read_to_string("/proc/version")
                .ok()
                .and_then(|v| v.split_whitespace().nth(2).map(String::from))
        })
        .unwrap_or_default()
}
