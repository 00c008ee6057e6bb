/// Controls collection decoding behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    /// When true, skipped records keep a copy of their raw object in the report.
    pub keep_skipped_raw: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            keep_skipped_raw: true,
        }
    }
}
