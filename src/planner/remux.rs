//! Remux planning and mkvmerge argument rendering
//!
//! The plan is built from typed directives first and only turned into
//! command-line syntax by [`RemuxPlan::to_args`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::model::{ContainerSnapshot, PositionPolicy, TrackKind, TrackRecord};
use crate::planner::{ConversionOptions, ConversionPlan};

/// Track id of the single track in a transcoded elementary stream file
const NEW_TRACK_ID: u32 = 0;

/// Which audio tracks of an input are kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AudioSelection {
    None,
    Only(Vec<u32>),
}

/// One mkvmerge option, before rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RemuxDirective {
    /// Global `(input index, track id)` order of the output
    TrackOrder(Vec<(usize, u32)>),
    Compression { track: u32, mode: String },
    Language { track: u32, language: String },
    TrackName { track: u32, name: String },
    Sync { track: u32, delay_ms: i64 },
    DefaultTrack { track: u32, default: bool },
    AudioTracks(AudioSelection),
    NoSubtitles,
}

impl RemuxDirective {
    pub fn to_args(&self) -> Vec<String> {
        match self {
            RemuxDirective::TrackOrder(order) => {
                let order = order
                    .iter()
                    .map(|(input, track)| format!("{}:{}", input, track))
                    .collect::<Vec<_>>()
                    .join(",");
                vec!["--track-order".to_string(), order]
            }
            RemuxDirective::Compression { track, mode } => {
                vec!["--compression".to_string(), format!("{}:{}", track, mode)]
            }
            RemuxDirective::Language { track, language } => {
                vec!["--language".to_string(), format!("{}:{}", track, language)]
            }
            RemuxDirective::TrackName { track, name } => {
                vec!["--track-name".to_string(), format!("{}:{}", track, name)]
            }
            RemuxDirective::Sync { track, delay_ms } => {
                vec!["--sync".to_string(), format!("{}:{}", track, delay_ms)]
            }
            RemuxDirective::DefaultTrack { track, default } => vec![
                "--default-track".to_string(),
                format!("{}:{}", track, if *default { "yes" } else { "no" }),
            ],
            RemuxDirective::AudioTracks(AudioSelection::None) => vec!["-A".to_string()],
            RemuxDirective::AudioTracks(AudioSelection::Only(ids)) => {
                let ids = ids
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                vec!["-a".to_string(), ids]
            }
            RemuxDirective::NoSubtitles => vec!["-S".to_string()],
        }
    }
}

/// One input file with the directives that apply to it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemuxInput {
    pub path: PathBuf,
    pub directives: Vec<RemuxDirective>,
}

/// Complete remux command, independent of argument syntax
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemuxPlan {
    pub output: PathBuf,
    pub inputs: Vec<RemuxInput>,
    pub global: Vec<RemuxDirective>,
}

impl RemuxPlan {
    /// mkvmerge arguments: `-o <out>`, per-input directives each followed
    /// by the input path, then global directives. Not quiet, so mkvmerge
    /// keeps printing `Progress: N%`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec!["-o".to_string(), self.output.display().to_string()];

        for input in &self.inputs {
            args.extend(input.directives.iter().flat_map(RemuxDirective::to_args));
            args.push(input.path.display().to_string());
        }

        args.extend(self.global.iter().flat_map(RemuxDirective::to_args));
        args
    }

    pub fn track_order(&self) -> Option<&[(usize, u32)]> {
        self.global.iter().find_map(|directive| match directive {
            RemuxDirective::TrackOrder(order) => Some(order.as_slice()),
            _ => None,
        })
    }
}

/// Builder of the remux step from conversion plans
pub struct RemuxPlanner;

impl RemuxPlanner {
    pub fn build(
        snapshot: &ContainerSnapshot,
        plans: &[ConversionPlan],
        options: &ConversionOptions,
        output: &Path,
    ) -> RemuxPlan {
        let sources: BTreeSet<u32> = plans.iter().map(|plan| plan.source_track).collect();
        let any_default = plans.iter().any(ConversionPlan::has_default_target);

        let included: Vec<&TrackRecord> = snapshot
            .tracks()
            .filter(|track| Self::keeps(track, &sources, options))
            .collect();

        let original = Self::original_input(snapshot, &included, &sources, any_default, options);
        let new_inputs: Vec<RemuxInput> = plans
            .iter()
            .flat_map(|plan| plan.targets.iter())
            .map(|target| {
                let mut directives = vec![RemuxDirective::Language {
                    track: NEW_TRACK_ID,
                    language: target.language.clone(),
                }];
                if let Some(name) = &target.title {
                    directives.push(RemuxDirective::TrackName {
                        track: NEW_TRACK_ID,
                        name: name.clone(),
                    });
                }
                if let Some(delay_ms) = target.delay {
                    directives.push(RemuxDirective::Sync {
                        track: NEW_TRACK_ID,
                        delay_ms,
                    });
                }
                directives.push(RemuxDirective::DefaultTrack {
                    track: NEW_TRACK_ID,
                    default: target.default_track,
                });
                directives.push(RemuxDirective::Compression {
                    track: NEW_TRACK_ID,
                    mode: options.compression.clone(),
                });
                RemuxInput {
                    path: target.path.clone(),
                    directives,
                }
            })
            .collect();

        // Input index of each new file, in plan order
        let new_count = new_inputs.len();
        let (original_index, first_new) = match options.position {
            PositionPolicy::Initial => (new_count, 0),
            PositionPolicy::Last | PositionPolicy::AfterSource => (0, 1),
        };

        let originals: Vec<(usize, u32)> = included
            .iter()
            .map(|track| (original_index, track.track_id))
            .collect();
        let news: Vec<(usize, u32)> = (0..new_count)
            .map(|offset| (first_new + offset, NEW_TRACK_ID))
            .collect();

        let order: Vec<(usize, u32)> = match options.position {
            PositionPolicy::Initial => news.iter().chain(originals.iter()).copied().collect(),
            PositionPolicy::Last => originals.iter().chain(news.iter()).copied().collect(),
            PositionPolicy::AfterSource => Self::after_source_order(
                snapshot,
                plans,
                &included,
                original_index,
                first_new,
            ),
        };

        let inputs: Vec<RemuxInput> = match options.position {
            PositionPolicy::Initial => new_inputs.into_iter().chain(std::iter::once(original)).collect(),
            PositionPolicy::Last | PositionPolicy::AfterSource => {
                std::iter::once(original).chain(new_inputs).collect()
            }
        };

        RemuxPlan {
            output: output.to_path_buf(),
            inputs,
            global: vec![RemuxDirective::TrackOrder(order)],
        }
    }

    /// Whether an original track stays in the output
    fn keeps(track: &TrackRecord, sources: &BTreeSet<u32>, options: &ConversionOptions) -> bool {
        match track.kind {
            TrackKind::Audio => options.retain_source || !sources.contains(&track.track_id),
            TrackKind::Subtitle => !options.no_subtitles,
            TrackKind::Video | TrackKind::Other => true,
        }
    }

    fn original_input(
        snapshot: &ContainerSnapshot,
        included: &[&TrackRecord],
        sources: &BTreeSet<u32>,
        any_default: bool,
        options: &ConversionOptions,
    ) -> RemuxInput {
        let mut directives = Vec::new();

        let others = snapshot
            .audio_tracks()
            .filter(|track| !sources.contains(&track.track_id))
            .count();
        if !options.retain_source || others > 1 {
            let kept: Vec<u32> = included
                .iter()
                .filter(|track| track.is_audio())
                .map(|track| track.track_id)
                .collect();
            directives.push(RemuxDirective::AudioTracks(if kept.is_empty() {
                AudioSelection::None
            } else {
                AudioSelection::Only(kept)
            }));
        }

        if options.no_subtitles {
            directives.push(RemuxDirective::NoSubtitles);
        }

        for track in included {
            if any_default && track.is_audio() {
                directives.push(RemuxDirective::DefaultTrack {
                    track: track.track_id,
                    default: false,
                });
            }
            directives.push(RemuxDirective::Compression {
                track: track.track_id,
                mode: options.compression.clone(),
            });
        }

        RemuxInput {
            path: snapshot.source().to_path_buf(),
            directives,
        }
    }

    /// Originals in track-id order, each converted source followed by its
    /// new tracks; a dropped source still anchors its new tracks
    fn after_source_order(
        snapshot: &ContainerSnapshot,
        plans: &[ConversionPlan],
        included: &[&TrackRecord],
        original_index: usize,
        first_new: usize,
    ) -> Vec<(usize, u32)> {
        let mut order = Vec::new();
        let mut next_new = first_new;
        let mut new_positions = Vec::with_capacity(plans.len());
        for plan in plans {
            new_positions.push((plan.source_track, next_new, plan.targets.len()));
            next_new += plan.targets.len();
        }

        for track in snapshot.tracks() {
            if included.iter().any(|kept| kept.track_id == track.track_id) {
                order.push((original_index, track.track_id));
            }
            for (source, start, count) in &new_positions {
                if *source == track.track_id {
                    order.extend((*start..*start + *count).map(|input| (input, NEW_TRACK_ID)));
                }
            }
        }

        order
    }
}
