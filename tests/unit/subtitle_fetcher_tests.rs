/*!
 * Tests for video ID extraction, caption track selection and timed-text parsing
 */

use ytscript::errors::FetchError;
use ytscript::subtitle_fetcher::{
    decode_html_entities, default_title, extract_video_id, is_plausible_video_id, parse_timedtext_xml,
    select_track, CaptionTrack,
};

fn track(language_code: &str, is_generated: bool) -> CaptionTrack {
    CaptionTrack {
        base_url: format!("https://example.com/timedtext?lang={}", language_code),
        language_code: language_code.to_string(),
        name: language_code.to_uppercase(),
        is_generated,
    }
}

fn languages(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_extract_video_id_withSupportedUrlShapes_shouldReturnId() {
    let id = "dQw4w9WgXcQ";
    let inputs = [
        "https://youtu.be/dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXcQ?t=42",
        "youtu.be/dQw4w9WgXcQ",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10s",
        "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
        "www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://www.youtube.com/shorts/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/live/dQw4w9WgXcQ?si=abc",
        "https://www.youtube.com/v/dQw4w9WgXcQ",
        "  dQw4w9WgXcQ  ",
    ];

    for input in inputs {
        assert_eq!(extract_video_id(input).as_deref(), Some(id), "input: {}", input);
    }
}

#[test]
fn test_extract_video_id_withEmptyOrUnknownPath_shouldReturnNone() {
    assert_eq!(extract_video_id(""), None);
    assert_eq!(extract_video_id("   "), None);
    assert_eq!(extract_video_id("https://www.youtube.com/feed/trending"), None);
}

#[test]
fn test_extract_video_id_withOtherHost_shouldKeepInput() {
    assert_eq!(
        extract_video_id("https://example.com/video").as_deref(),
        Some("https://example.com/video")
    );
}

#[test]
fn test_is_plausible_video_id_shouldAcceptIdCharacters() {
    assert!(is_plausible_video_id("dQw4w9WgXcQ"));
    assert!(is_plausible_video_id("a-b_c123"));
    assert!(!is_plausible_video_id("abc"));
    assert!(!is_plausible_video_id("has space"));
}

#[test]
fn test_select_track_withGeneratedAndManual_shouldPreferGeneratedInPriorityOrder() {
    let tracks = vec![track("en", false), track("ja", true), track("en", true), track("ko", false)];

    let chosen = select_track(&tracks, &languages(&["ko", "en", "ja"])).unwrap();

    assert_eq!(chosen.language_code, "en");
    assert!(chosen.is_generated);
}

#[test]
fn test_select_track_withOnlyManualTracks_shouldFollowPriority() {
    let tracks = vec![track("ja", false), track("en", false)];

    let chosen = select_track(&tracks, &languages(&["ko", "en", "ja"])).unwrap();

    assert_eq!(chosen.language_code, "en");
    assert!(!chosen.is_generated);
}

#[test]
fn test_select_track_withNoPreferredLanguage_shouldFallBackToFirst() {
    let tracks = vec![track("de", false), track("fr", true)];

    let chosen = select_track(&tracks, &languages(&["ko"])).unwrap();

    assert_eq!(chosen.language_code, "de");
    assert!(select_track(&[], &languages(&["ko"])).is_none());
}

#[test]
fn test_parse_timedtext_xml_withEntitiesAndMissingDur_shouldDecode() {
    let xml = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
<text start="0.5" dur="2.1">Tom &amp;amp; Jerry</text>
<text start="2.6">it&#39;s &lt;b&gt;bold&lt;/b&gt;
now</text>
<text start="4" dur="1"> </text>
<text start="5.25" dur="1.5">&quot;quoted&quot;</text>
</transcript>"#;

    let entries = parse_timedtext_xml(xml).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].text, "Tom & Jerry");
    assert_eq!(entries[0].start_seconds, 0.5);
    assert_eq!(entries[0].duration_seconds, 2.1);
    assert_eq!(entries[1].text, "it's bold now");
    assert_eq!(entries[1].duration_seconds, 0.0);
    assert_eq!(entries[2].text, "\"quoted\"");
}

#[test]
fn test_parse_timedtext_xml_withSelfClosingElement_shouldKeepNextTiming() {
    let xml = r#"<transcript><text start="1.0" dur="1.0"/><text start="30.0" dur="2.0">Hello there</text><text start="33" dur="1" /></transcript>"#;

    let entries = parse_timedtext_xml(xml).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Hello there");
    assert_eq!(entries[0].start_seconds, 30.0);
    assert_eq!(entries[0].duration_seconds, 2.0);
}

#[test]
fn test_parse_timedtext_xml_withBadStart_shouldReturnParseError() {
    let result = parse_timedtext_xml(r#"<text start="abc" dur="1">x</text>"#);
    assert!(matches!(result, Err(FetchError::Parse(_))));
}

#[test]
fn test_parse_timedtext_xml_withNoTextElements_shouldBeEmpty() {
    assert!(parse_timedtext_xml("<transcript></transcript>").unwrap().is_empty());
}

#[test]
fn test_decode_html_entities_withUnknownEntity_shouldKeepIt() {
    assert_eq!(decode_html_entities("a &foo; b &#x41;"), "a &foo; b A");
    assert_eq!(decode_html_entities("fish & chips"), "fish & chips");
}

#[test]
fn test_default_title_shouldIncludeVideoId() {
    assert_eq!(default_title("abc"), "YouTube Video abc");
}
