/// Re-export `Config` from `trendlytics-core` for use within this crate.
///
/// All environment-variable parsing lives in `trendlytics-core` so it can be
/// shared with integration tests without depending on the full server.
pub use trendlytics_core::config::Config;
