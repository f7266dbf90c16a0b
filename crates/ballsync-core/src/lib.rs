//! BallSync core library for streaming tracked-object positions.
//!
//! A single TCP connection carries length-prefixed text frames; each frame
//! holds newline-delimited records (id, pixel x/y, color). This crate turns
//! that byte stream into target positions: `source` polls the socket,
//! `protocols::framing` extracts frames, `protocols::records` parses lines,
//! `mapping` projects pixels onto the target plane and `sink` receives the
//! result. `session` glues one poll cycle together.
//!
//! Invariants:
//! - Stream bytes are consumed strictly in arrival order.
//! - A malformed unit (length prefix, frame, line) never halts the stream.
//! - Updates are applied one at a time, last write wins per id.
//!
//! Version française (résumé):
//! Cette crate décode un flux TCP de trames préfixées par leur longueur,
//! analyse les enregistrements texte (id, x, y, couleur) et projette les
//! positions pixel dans le plan cible. Les erreurs restent locales (préfixe,
//! trame ou ligne) et n'interrompent jamais le flux.
//!
//! # Examples
//! ```no_run
//! use ballsync_core::{Config, PollOutcome, Session, TcpSource};
//!
//! let config = Config::default();
//! let mut source = TcpSource::connect(&config.server_address, config.server_port)?;
//! let mut targets = config.target_table();
//! let mut session = Session::new(config.mapper());
//! while session.poll(&mut source, &mut targets)? != PollOutcome::Disconnected {
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod config;
pub mod mapping;
pub mod protocols;
pub mod session;
pub mod sink;
pub mod source;

pub use config::{Config, ConfigError};
pub use mapping::{CoordinateMapper, TargetPosition};
pub use protocols::framing::{FrameDecoder, FramingError, encode_frame};
pub use protocols::records::{BallUpdate, RecordError, parse_payload, parse_record};
pub use session::{CycleSummary, PollOutcome, Session, SessionError, SessionStats};
pub use sink::{PositionSink, TargetSlot, TargetSummary, TargetTable};
pub use source::{ByteSource, SourceError, TcpSource};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Timestamp used when the clock cannot be formatted.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// End-of-session report: where the data came from, what was applied and
/// the final state of every populated target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of report generation.
    pub generated_at: String,
    /// Peer address as `ip:port`.
    pub peer: String,
    pub stats: SessionStats,
    /// Populated targets in id order.
    pub targets: Vec<TargetSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Build a report from a finished session.
///
/// # Examples
/// ```
/// use ballsync_core::{SessionStats, TargetTable, make_report};
///
/// let report = make_report("127.0.0.1:9003", SessionStats::default(), &TargetTable::with_len(2));
/// assert_eq!(report.report_version, ballsync_core::REPORT_VERSION);
/// assert_eq!(report.targets.len(), 2);
/// ```
pub fn make_report(peer: &str, stats: SessionStats, targets: &TargetTable) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "ballsync".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| DEFAULT_GENERATED_AT.to_string()),
        peer: peer.to_string(),
        stats,
        targets: targets.summaries(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_unset_target_fields() {
        let mut table = TargetTable::new([Some("Ball0".to_string()), None, Some("Ball2".to_string())]);
        table.set_position(
            2,
            TargetPosition {
                x: 1.0,
                y: 0.0,
                z: -1.0,
            },
        );
        table.set_label(2, "blue");

        let report = make_report("10.0.0.1:9003", SessionStats::default(), &table);
        let value = serde_json::to_value(&report).expect("report json");

        let targets = value["targets"].as_array().expect("targets array");
        assert_eq!(targets.len(), 2);
        assert!(targets[0].get("position").is_none());
        assert!(targets[0].get("label").is_none());
        assert_eq!(targets[1]["id"], 2);
        assert_eq!(targets[1]["position"]["z"], -1.0);
        assert_eq!(targets[1]["visible"], true);
        assert!(value["generated_at"].as_str().unwrap().contains('T'));
    }
}
