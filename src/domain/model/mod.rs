// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::errors::DomainError;

/// Language assumed when the container does not declare one
pub const DEFAULT_LANGUAGE: &str = "eng";

/// Kind of elementary stream inside a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

impl TrackKind {
    /// Map the kind word printed by the inspection tool
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_lowercase().as_str() {
            "video" => TrackKind::Video,
            "audio" => TrackKind::Audio,
            "subtitles" | "subtitle" => TrackKind::Subtitle,
            _ => TrackKind::Other,
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitles",
            TrackKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Normalized audio codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Codec {
    Aac,
    Eac3,
    Ac3,
    Dts,
    DtsEs,
    Other(String),
}

impl Codec {
    /// Whether tracks in this codec are converted
    pub fn is_supported(&self) -> bool {
        matches!(self, Codec::Aac | Codec::Eac3 | Codec::Dts | Codec::DtsEs)
    }

    /// File extension used for an extracted elementary stream
    pub fn extension(&self) -> &'static str {
        match self {
            Codec::Aac => "aac",
            Codec::Eac3 => "eac3",
            Codec::Ac3 => "ac3",
            Codec::Dts | Codec::DtsEs => "dts",
            Codec::Other(_) => "bin",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Aac => write!(f, "AAC"),
            Codec::Eac3 => write!(f, "E-AC-3"),
            Codec::Ac3 => write!(f, "AC-3"),
            Codec::Dts => write!(f, "DTS"),
            Codec::DtsEs => write!(f, "DTS-ES"),
            Codec::Other(token) => write!(f, "{}", token),
        }
    }
}

/// Codec of a track produced by mkv2ac3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetCodec {
    Ac3,
    Aac,
}

impl TargetCodec {
    /// ffmpeg encoder name
    pub fn encoder(&self) -> &'static str {
        match self {
            TargetCodec::Ac3 => "ac3",
            TargetCodec::Aac => "aac",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TargetCodec::Ac3 => "ac3",
            TargetCodec::Aac => "aac",
        }
    }
}

impl fmt::Display for TargetCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetCodec::Ac3 => write!(f, "AC3"),
            TargetCodec::Aac => write!(f, "AAC"),
        }
    }
}

/// Where new tracks are placed relative to the original ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionPolicy {
    /// Before all original tracks
    Initial,
    /// After all original tracks
    #[default]
    Last,
    /// Right after the track it was converted from
    AfterSource,
}

impl PositionPolicy {
    /// Parse position policy from string
    pub fn parse(policy: &str) -> Result<Self, DomainError> {
        match policy.trim().to_lowercase().as_str() {
            "initial" => Ok(PositionPolicy::Initial),
            "last" => Ok(PositionPolicy::Last),
            "afterdts" => Ok(PositionPolicy::AfterSource),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid position: {}. Valid positions: initial, last, afterdts",
                policy
            ))),
        }
    }
}

impl fmt::Display for PositionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionPolicy::Initial => write!(f, "initial"),
            PositionPolicy::Last => write!(f, "last"),
            PositionPolicy::AfterSource => write!(f, "afterdts"),
        }
    }
}

/// One elementary stream of a container
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackRecord {
    pub track_id: u32,
    pub kind: TrackKind,
    /// Raw descriptor as printed by the inspection tool
    pub codec_tag: String,
    pub codec: Codec,
    /// Secondary descriptor, kept for diagnostics
    pub codec_info: String,
    pub language: String,
    pub name: Option<String>,
    pub channels: Option<u32>,
    /// Initial delay in milliseconds
    pub delay: Option<i64>,
    pub default_track: Option<bool>,
}

impl TrackRecord {
    /// Create a record with metadata defaults
    pub fn new(
        track_id: u32,
        kind: TrackKind,
        codec_tag: impl Into<String>,
        codec: Codec,
        codec_info: impl Into<String>,
    ) -> Self {
        Self {
            track_id,
            kind,
            codec_tag: codec_tag.into(),
            codec,
            codec_info: codec_info.into(),
            language: DEFAULT_LANGUAGE.to_string(),
            name: None,
            channels: None,
            delay: None,
            default_track: None,
        }
    }

    pub fn is_audio(&self) -> bool {
        self.kind == TrackKind::Audio
    }

    /// Whether this track is a convertible audio track
    pub fn is_convertible(&self) -> bool {
        self.is_audio() && self.codec.is_supported()
    }

    /// Fill in metadata from the verbose info dump
    pub fn apply_details(&mut self, details: &TrackDetails) {
        if let Some(language) = details.language() {
            self.language = language;
        }
        if let Some(name) = details.name() {
            self.name = Some(name);
        }
        if let Some(channels) = details.channels() {
            self.channels = Some(channels);
        }
        if let Some(flag) = details.default_track() {
            self.default_track = Some(flag);
        }
    }
}

/// Tracks of one container, ordered by track id
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerSnapshot {
    pub source: PathBuf,
    tracks: BTreeMap<u32, TrackRecord>,
}

impl ContainerSnapshot {
    /// Build a snapshot; a later record with a duplicate id replaces the earlier one
    pub fn new(source: impl Into<PathBuf>, records: Vec<TrackRecord>) -> Self {
        let tracks = records
            .into_iter()
            .map(|record| (record.track_id, record))
            .collect();
        Self {
            source: source.into(),
            tracks,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self, track_id: u32) -> Option<&TrackRecord> {
        self.tracks.get(&track_id)
    }

    /// Tracks in track-id order
    pub fn tracks(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks.values()
    }

    pub fn audio_tracks(&self) -> impl Iterator<Item = &TrackRecord> {
        self.tracks.values().filter(|track| track.is_audio())
    }

    /// Whether an AC3 audio track is already present
    pub fn has_ac3(&self) -> bool {
        self.audio_tracks().any(|track| track.codec == Codec::Ac3)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Flat key/value attributes of one track from the verbose info dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackDetails {
    entries: BTreeMap<String, String>,
}

impl TrackDetails {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn channels(&self) -> Option<u32> {
        self.get("Channels")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|channels| *channels > 0)
    }

    /// Track language; newer dumps also carry an IETF tag
    pub fn language(&self) -> Option<String> {
        self.get("Language")
            .or_else(|| self.get("Language (IETF BCP 47)"))
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .map(str::to_string)
    }

    pub fn name(&self) -> Option<String> {
        self.get("Name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Default flag; spelled `Default flag`, `Default track flag` or `"Default track" flag`
    pub fn default_track(&self) -> Option<bool> {
        self.entries.iter().find_map(|(key, value)| {
            let key = key.replace('"', "").to_lowercase();
            if key.starts_with("default") && key.ends_with("flag") {
                match value.trim().to_lowercase().as_str() {
                    "1" | "yes" | "true" => Some(true),
                    "0" | "no" | "false" => Some(false),
                    _ => None,
                }
            } else {
                None
            }
        })
    }
}

/// Parameters of an extracted elementary stream, as reported by the transcoder
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProbeResult {
    pub codec: Option<String>,
    pub sample_rate_hz: Option<u32>,
    pub channels: Option<u32>,
    pub bitrate_kbps: Option<u32>,
}

impl ProbeResult {
    pub fn is_empty(&self) -> bool {
        self.codec.is_none()
            && self.sample_rate_hz.is_none()
            && self.channels.is_none()
            && self.bitrate_kbps.is_none()
    }
}
