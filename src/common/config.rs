/// Configuration for scan behavior
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of records pulled from the source per fetch
    pub fetch_size: usize,

    /// Whether the scan checks that records arrive in non-decreasing key order
    pub verify_key_order: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            fetch_size: 100,
            verify_key_order: true,
        }
    }
}

impl ScanConfig {
    /// Set the fetch size, clamped to at least one record
    pub fn with_fetch_size(mut self, fetch_size: usize) -> Self {
        self.fetch_size = fetch_size.max(1);
        self
    }

    /// Enable or disable key order verification
    pub fn with_verify_key_order(mut self, verify: bool) -> Self {
        self.verify_key_order = verify;
        self
    }
}
