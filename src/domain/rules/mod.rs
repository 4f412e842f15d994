// Domain rules - Codec classification and track selection policies

use tracing::{debug, warn};

use crate::domain::model::*;

/// Codec names accepted for conversion, compared case-insensitively
pub const SUPPORTED_FORMATS: [&str; 5] = ["AAC", "EAC3", "E-AC-3", "DTS", "DTS-ES"];

/// Business rules for resolving codec tokens
pub struct CodecClassifier;

impl CodecClassifier {
    /// Map a raw codec token to the normalized codec.
    ///
    /// Unknown tokens come back as `Codec::Other` rather than an error.
    pub fn classify_token(token: &str) -> Codec {
        let normalized = Self::normalize(token);

        if SUPPORTED_FORMATS
            .iter()
            .any(|format| format.eq_ignore_ascii_case(&normalized))
        {
            return match normalized.as_str() {
                "AAC" => Codec::Aac,
                "EAC3" | "E-AC-3" => Codec::Eac3,
                "DTS" => Codec::Dts,
                _ => Codec::DtsEs,
            };
        }

        match normalized.as_str() {
            "AC3" | "AC-3" => Codec::Ac3,
            _ => Codec::Other(token.trim().to_string()),
        }
    }

    /// Classify a parsed track from its kind and both descriptor halves
    pub fn classify_track(kind: TrackKind, codec: &str, codec_info: &str) -> Codec {
        if kind != TrackKind::Audio {
            return Codec::Other(codec.trim().to_string());
        }

        match Self::classify_token(codec) {
            Codec::Dts if codec_info.trim().eq_ignore_ascii_case("ES") => Codec::DtsEs,
            Codec::Other(token) => match Self::classify_token(codec_info) {
                Codec::Other(_) => Codec::Other(token),
                fallback => fallback,
            },
            classified => classified,
        }
    }

    /// Upper-case, drop a Matroska `A_` codec-id prefix and any `/profile` suffix
    fn normalize(token: &str) -> String {
        let upper = token.trim().to_uppercase();
        let stripped = upper.strip_prefix("A_").unwrap_or(&upper);
        stripped
            .split('/')
            .next()
            .unwrap_or(stripped)
            .trim()
            .to_string()
    }
}

/// Business rules for choosing which tracks to convert
pub struct TrackSelector;

impl TrackSelector {
    /// First convertible audio track in track-id order
    pub fn first_supported(snapshot: &ContainerSnapshot) -> Option<u32> {
        snapshot
            .tracks()
            .find(|track| track.is_convertible())
            .map(|track| track.track_id)
    }

    /// Tracks to convert.
    ///
    /// All-tracks mode takes every convertible audio track. An explicit track
    /// is honoured only when it is a convertible audio track, otherwise the
    /// default scan applies. An empty result means nothing to convert.
    pub fn select(
        snapshot: &ContainerSnapshot,
        explicit: Option<u32>,
        all_tracks: bool,
    ) -> Vec<u32> {
        if all_tracks {
            return snapshot
                .tracks()
                .filter(|track| track.is_convertible())
                .map(|track| track.track_id)
                .collect();
        }

        if let Some(track_id) = explicit {
            match snapshot.get(track_id) {
                Some(track) if track.is_convertible() => {
                    debug!("Using requested track {}", track_id);
                    return vec![track_id];
                }
                Some(track) => warn!(
                    "Track {} ({} {}) is not a supported audio track, using first supported track",
                    track_id, track.kind, track.codec
                ),
                None => warn!(
                    "Track {} does not exist, using first supported track",
                    track_id
                ),
            }
        }

        Self::first_supported(snapshot).into_iter().collect()
    }
}

#[cfg(test)]
mod tests;
