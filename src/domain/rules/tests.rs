// Unit tests for domain rules

use super::*;

fn track(track_id: u32, kind: TrackKind, codec: &str) -> TrackRecord {
    let classified = CodecClassifier::classify_track(kind, codec, codec);
    TrackRecord::new(track_id, kind, codec, classified, codec)
}

fn mixed_snapshot() -> ContainerSnapshot {
    ContainerSnapshot::new(
        "movie.mkv",
        vec![
            track(1, TrackKind::Video, "AVC"),
            track(2, TrackKind::Audio, "MP3"),
            track(3, TrackKind::Audio, "DTS"),
            track(4, TrackKind::Subtitle, "SubRip/SRT"),
        ],
    )
}

#[test]
fn test_classify_is_case_insensitive() {
    assert_eq!(CodecClassifier::classify_token("dts"), Codec::Dts);
    assert_eq!(CodecClassifier::classify_token("Dts-Es"), Codec::DtsEs);
    assert_eq!(CodecClassifier::classify_token("aac"), Codec::Aac);
    assert_eq!(CodecClassifier::classify_token("e-ac-3"), Codec::Eac3);
    assert_eq!(CodecClassifier::classify_token("EAC3"), Codec::Eac3);
}

#[test]
fn test_classify_matroska_codec_ids() {
    assert_eq!(CodecClassifier::classify_token("A_DTS"), Codec::Dts);
    assert_eq!(CodecClassifier::classify_token("A_AAC/MPEG4/LC"), Codec::Aac);
    assert_eq!(CodecClassifier::classify_token("A_AC3"), Codec::Ac3);
}

#[test]
fn test_classify_ac3_is_not_supported() {
    let codec = CodecClassifier::classify_token("AC-3");
    assert_eq!(codec, Codec::Ac3);
    assert!(!codec.is_supported());
}

#[test]
fn test_classify_unknown_returns_other() {
    assert_eq!(
        CodecClassifier::classify_token("MP3"),
        Codec::Other("MP3".to_string())
    );
    assert_eq!(
        CodecClassifier::classify_token("TrueHD"),
        Codec::Other("TrueHD".to_string())
    );
}

#[test]
fn test_classify_non_audio_by_kind_only() {
    let codec = CodecClassifier::classify_track(TrackKind::Video, "DTS", "DTS");
    assert_eq!(codec, Codec::Other("DTS".to_string()));
}

#[test]
fn test_classify_dts_es_from_hyphen_split() {
    let codec = CodecClassifier::classify_track(TrackKind::Audio, "DTS", "ES");
    assert_eq!(codec, Codec::DtsEs);
}

#[test]
fn test_classify_falls_back_to_codec_info() {
    let codec = CodecClassifier::classify_track(TrackKind::Audio, "DTS-HD", "A_DTS");
    assert_eq!(codec, Codec::Dts);

    let codec = CodecClassifier::classify_track(TrackKind::Audio, "MP3", "MPEG-1 Layer 3");
    assert_eq!(codec, Codec::Other("MP3".to_string()));
}

#[test]
fn test_default_selection_skips_unsupported_audio() {
    let snapshot = mixed_snapshot();
    assert_eq!(TrackSelector::select(&snapshot, None, false), vec![3]);
}

#[test]
fn test_explicit_unsupported_track_falls_back() {
    let snapshot = mixed_snapshot();
    assert_eq!(TrackSelector::select(&snapshot, Some(2), false), vec![3]);
    assert_eq!(TrackSelector::select(&snapshot, Some(4), false), vec![3]);
    assert_eq!(TrackSelector::select(&snapshot, Some(42), false), vec![3]);
}

#[test]
fn test_explicit_supported_track_is_used() {
    let snapshot = ContainerSnapshot::new(
        "movie.mkv",
        vec![
            track(0, TrackKind::Video, "AVC"),
            track(1, TrackKind::Audio, "DTS"),
            track(2, TrackKind::Audio, "AAC"),
        ],
    );
    assert_eq!(TrackSelector::select(&snapshot, Some(2), false), vec![2]);
}

#[test]
fn test_all_tracks_selects_every_supported_track() {
    let snapshot = ContainerSnapshot::new(
        "movie.mkv",
        vec![
            track(0, TrackKind::Video, "AVC"),
            track(1, TrackKind::Audio, "DTS"),
            track(2, TrackKind::Audio, "AC-3"),
            track(3, TrackKind::Audio, "E-AC-3"),
        ],
    );
    assert_eq!(TrackSelector::select(&snapshot, Some(3), true), vec![1, 3]);
}

#[test]
fn test_no_supported_track_selects_nothing() {
    let snapshot = ContainerSnapshot::new(
        "movie.mkv",
        vec![
            track(0, TrackKind::Video, "AVC"),
            track(1, TrackKind::Audio, "MP3"),
        ],
    );
    assert!(TrackSelector::select(&snapshot, None, false).is_empty());
    assert!(TrackSelector::select(&snapshot, None, true).is_empty());
}
