//! Audio stream parameter parsing from the transcoder's banner output

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::ProbeResult;

static FIELD_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#|,|:|Hz|kb/s|\(side\)").expect("valid separator regex"));

const AUDIO_MARKER: &str = "Audio:";

/// Parser for `Stream #0:0: Audio: ...` banner lines
pub struct StreamProber;

impl StreamProber {
    /// Parse the first audio stream line with a recognizable field layout.
    ///
    /// Layouts with a `(side)` channel suffix split into 12 fields, plain
    /// layouts into 11. Any other shape is skipped.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<ProbeResult, DomainError> {
        for line in lines.iter().map(AsRef::as_ref) {
            if !line.contains(AUDIO_MARKER) {
                continue;
            }

            match Self::parse_line(line) {
                Some(result) => {
                    debug!(
                        "probed stream: codec={:?} rate={:?} channels={:?} bitrate={:?}",
                        result.codec, result.sample_rate_hz, result.channels, result.bitrate_kbps
                    );
                    return Ok(result);
                }
                None => debug!("unrecognized audio stream line: {}", line.trim()),
            }
        }

        Err(DomainError::ParseAmbiguity(
            "no audio stream line with a known field layout".to_string(),
        ))
    }

    fn parse_line(line: &str) -> Option<ProbeResult> {
        let fields: Vec<&str> = FIELD_SEPARATORS.split(line).map(str::trim).collect();

        let bitrate_index = match fields.len() {
            12 => 10,
            11 => 9,
            _ => return None,
        };

        Some(ProbeResult {
            codec: fields[4]
                .split_whitespace()
                .next()
                .map(str::to_string),
            sample_rate_hz: fields[5].parse().ok(),
            channels: Self::layout_channels(fields[7]),
            bitrate_kbps: fields[bitrate_index].parse().ok(),
        })
    }

    /// Channel count of a layout name such as `5.1`, `stereo` or `6 channels`
    pub fn layout_channels(layout: &str) -> Option<u32> {
        let layout = layout.trim().to_lowercase();

        match layout.as_str() {
            "mono" => return Some(1),
            "stereo" | "downmix" => return Some(2),
            "quad" => return Some(4),
            "hexagonal" => return Some(6),
            "octagonal" => return Some(8),
            _ => {}
        }

        if let Some(count) = layout.strip_suffix("channels") {
            return count.trim().parse().ok();
        }

        let (main, lfe) = layout.split_once('.')?;
        let main: u32 = main.trim().parse().ok()?;
        let lfe: u32 = lfe.trim().parse().ok()?;
        Some(main + lfe)
    }
}
