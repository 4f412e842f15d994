//! Track listing and info dump parsing

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::domain::errors::DomainError;
use crate::domain::model::{ContainerSnapshot, TrackDetails, TrackKind, TrackRecord};
use crate::domain::rules::CodecClassifier;

static TRACK_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Track ID (\d+): (\w+) \((.*)\)").expect("valid track line regex"));

static MKVMERGE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"track ID for mkvmerge & mkvextract: (\d+)").expect("valid track id regex")
});

/// Parser for the container inspection tool output
pub struct TrackInspector;

impl TrackInspector {
    /// Split a parenthesized codec descriptor into `(codec, codec_info)`.
    ///
    /// `A/B` yields codec `B` and info `A`. Hyphenated DTS descriptors are
    /// the other way round: `DTS-ES` yields codec `DTS` and info `ES`.
    /// Anything else is used for both halves.
    pub fn split_descriptor(descriptor: &str) -> (String, String) {
        let descriptor = descriptor.trim();

        if let Some((info, codec)) = descriptor.rsplit_once('/') {
            return (codec.trim().to_string(), info.trim().to_string());
        }

        if descriptor.contains("DTS") {
            if let Some((codec, info)) = descriptor.split_once('-') {
                return (codec.trim().to_string(), info.trim().to_string());
            }
        }

        (descriptor.to_string(), descriptor.to_string())
    }

    /// Parse one `Track ID <n>: <kind> (<descriptor>)` line
    pub fn parse_track_line(line: &str) -> Option<TrackRecord> {
        let captures = TRACK_LINE.captures(line)?;
        let track_id = captures[1].parse::<u32>().ok()?;
        let kind = TrackKind::parse(&captures[2]);
        let descriptor = captures[3].to_string();

        let (codec_token, codec_info) = Self::split_descriptor(&descriptor);
        let codec = CodecClassifier::classify_track(kind, &codec_token, &codec_info);

        debug!(
            "parsed elementary stream {}: {}, {}, {}",
            track_id, kind, codec_token, codec_info
        );

        Some(TrackRecord::new(track_id, kind, descriptor, codec, codec_info))
    }

    /// Parse the terse track listing.
    ///
    /// Lines that do not describe a track are skipped. Output without a
    /// single track line is reported as `ParseAmbiguity`.
    pub fn parse_track_listing<S: AsRef<str>>(lines: &[S]) -> Result<Vec<TrackRecord>, DomainError> {
        let records: Vec<TrackRecord> = lines
            .iter()
            .filter_map(|line| Self::parse_track_line(line.as_ref()))
            .collect();

        if records.is_empty() {
            return Err(DomainError::ParseAmbiguity(format!(
                "no track lines in {} lines of listing output",
                lines.len()
            )));
        }

        Ok(records)
    }

    /// Collect the attributes of one track from the verbose info dump.
    ///
    /// The dump numbers tracks from 1, so track id `n` is announced as
    /// `Track number: n+1` unless the line names the mkvmerge id explicitly.
    /// A track that is not found yields empty details.
    pub fn parse_track_details<S: AsRef<str>>(lines: &[S], track_id: u32) -> TrackDetails {
        let mut details = TrackDetails::default();
        let mut start_depth: Option<usize> = None;

        for line in lines {
            let line = line.as_ref();
            let Some((depth, entry)) = Self::split_entry(line) else {
                continue;
            };

            match start_depth {
                None => {
                    if Self::announces_track(entry, track_id) {
                        start_depth = Some(depth);
                    }
                }
                Some(start) => {
                    if depth < start || entry == "A track" || entry == "Track" {
                        break;
                    }
                    if let Some((key, value)) = entry.split_once(':') {
                        trace!("track {} attribute {} = {}", track_id, key.trim(), value.trim());
                        details.insert(key.trim(), value.trim());
                    }
                }
            }
        }

        debug!("track {}: {} attributes", track_id, details.len());
        details
    }

    /// Build a snapshot from the terse listing, with audio tracks enriched
    /// from the verbose dump
    pub fn build_snapshot<S: AsRef<str>, T: AsRef<str>>(
        source: &Path,
        listing: &[S],
        info_dump: &[T],
    ) -> Result<ContainerSnapshot, DomainError> {
        let mut records = Self::parse_track_listing(listing)?;

        for record in records.iter_mut().filter(|record| record.is_audio()) {
            let details = Self::parse_track_details(info_dump, record.track_id);
            record.apply_details(&details);
        }

        Ok(ContainerSnapshot::new(source, records))
    }

    /// Split an info dump line into the `+` depth and the entry text
    fn split_entry(line: &str) -> Option<(usize, &str)> {
        let depth = line.find('+')?;
        let entry = line[depth + 1..].trim();
        Some((depth, entry))
    }

    fn announces_track(entry: &str, track_id: u32) -> bool {
        let Some(value) = entry.strip_prefix("Track number:") else {
            return false;
        };

        if let Some(captures) = MKVMERGE_ID.captures(value) {
            return captures[1].parse::<u32>().ok() == Some(track_id);
        }

        let number: String = value
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        number.parse::<u32>().ok() == Some(track_id + 1)
    }
}
