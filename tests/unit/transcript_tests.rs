/*!
 * Tests for the caption model, segmentation and script refinement
 */

use ytscript::app_config::SegmentationConfig;
use ytscript::transcript::{
    format_time, has_meaningful_content, refine_script, CaptionEntry, Segmenter, TranscriptDocument,
};

fn default_segmenter() -> Segmenter {
    Segmenter::new(SegmentationConfig::default())
}

fn texts(segmenter: &Segmenter, entries: &[CaptionEntry]) -> Vec<String> {
    segmenter
        .segment(entries)
        .paragraphs
        .into_iter()
        .map(|p| p.text)
        .collect()
}

#[test]
fn test_segment_withLongSilence_shouldStartNewParagraph() {
    let entries = vec![
        CaptionEntry::new("Hello", 0.0, 1.0),
        CaptionEntry::new("world", 1.2, 1.0),
        CaptionEntry::new("New topic", 10.0, 1.0),
    ];

    let segmentation = default_segmenter().segment(&entries);

    let paragraphs: Vec<&str> = segmentation.paragraphs.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(paragraphs, vec!["Hello world", "New topic"]);
    assert_eq!(segmentation.paragraphs[0].start_seconds, 0.0);
    assert_eq!(segmentation.paragraphs[1].start_seconds, 10.0);
    assert_eq!(segmentation.full_script, "Hello world New topic");
}

#[test]
fn test_segment_withGapExactlyAtThreshold_shouldBreak() {
    let entries = vec![
        CaptionEntry::new("first", 0.0, 1.0),
        CaptionEntry::new("second", 6.0, 1.0),
    ];

    assert_eq!(texts(&default_segmenter(), &entries), vec!["first", "second"]);
}

#[test]
fn test_segment_withEveryGapTooLong_shouldGiveOneParagraphPerEntry() {
    let entries: Vec<CaptionEntry> = (0..5)
        .map(|i| CaptionEntry::new(format!("line {}", i), i as f64 * 20.0, 1.0))
        .collect();

    assert_eq!(default_segmenter().segment(&entries).paragraphs.len(), 5);
}

#[test]
fn test_segment_withOverlappingCaptions_shouldMerge() {
    let entries = vec![
        CaptionEntry::new("overlapping", 0.0, 4.0),
        CaptionEntry::new("captions", 2.0, 4.0),
    ];

    assert_eq!(texts(&default_segmenter(), &entries), vec!["overlapping captions"]);
}

#[test]
fn test_segment_withCharacterCap_shouldSplitBeforeOverflow() {
    let segmenter = Segmenter::new(SegmentationConfig {
        max_gap_secs: 5.0,
        max_paragraph_chars: 11,
    });
    let entries = vec![
        CaptionEntry::new("Hello", 0.0, 1.0),
        CaptionEntry::new("world", 1.0, 1.0),
        CaptionEntry::new("again", 2.0, 1.0),
    ];

    assert_eq!(texts(&segmenter, &entries), vec!["Hello world", "again"]);
}

#[test]
fn test_segment_withOversizedEntry_shouldKeepItWhole() {
    let segmenter = Segmenter::new(SegmentationConfig {
        max_gap_secs: 5.0,
        max_paragraph_chars: 4,
    });
    let entries = vec![
        CaptionEntry::new("hi", 0.0, 1.0),
        CaptionEntry::new("a very long caption", 1.0, 1.0),
    ];

    assert_eq!(texts(&segmenter, &entries), vec!["hi", "a very long caption"]);
}

#[test]
fn test_segment_withMixedInput_shouldReassembleToFullScript() {
    let segmenter = Segmenter::new(SegmentationConfig {
        max_gap_secs: 3.0,
        max_paragraph_chars: 40,
    });
    let entries = vec![
        CaptionEntry::new("  spaced\n out  ", 0.0, 1.0),
        CaptionEntry::new("", 1.0, 1.0),
        CaptionEntry::new("next words here", 1.5, 1.0),
        CaptionEntry::new("after a pause", 9.0, 2.0),
        CaptionEntry::new("and a rather long sentence that overflows", 11.0, 2.0),
        CaptionEntry::new("end", 13.0, 1.0),
    ];

    let segmentation = segmenter.segment(&entries);

    assert_eq!(segmentation.reassemble(), segmentation.full_script);
    assert!(segmentation.paragraphs.iter().all(|p| !p.text.is_empty()));
    assert!(segmentation.full_script.starts_with("spaced out next words here"));
}

#[test]
fn test_segment_withNoEntries_shouldBeEmpty() {
    let segmentation = default_segmenter().segment(&[]);

    assert!(segmentation.paragraphs.is_empty());
    assert_eq!(segmentation.full_script, "");
}

#[test]
fn test_captionEntry_withMultilineText_shouldNormaliseAndFormat() {
    let entry = CaptionEntry::new("two\nlines   here", 3723.5, 2.0);

    assert_eq!(entry.text, "two lines here");
    assert_eq!(entry.end_seconds(), 3725.5);
    assert_eq!(entry.to_string(), "[01:02:03] two lines here");
}

#[test]
fn test_format_time_withVariousValues_shouldPadAndTruncate() {
    assert_eq!(format_time(0.0), "00:00:00");
    assert_eq!(format_time(59.99), "00:00:59");
    assert_eq!(format_time(3600.0), "01:00:00");
    assert_eq!(format_time(-5.0), "00:00:00");
}

#[test]
fn test_refine_script_withMarkersAndRepeats_shouldClean() {
    assert_eq!(refine_script("[음악] Hello. Hello. World.."), "Hello. World.");
    assert_eq!(refine_script("[Music] just music"), "just music");
    assert_eq!(refine_script("   "), "");
}

#[test]
fn test_has_meaningful_content_withFewCharacters_shouldBeFalse() {
    assert!(!has_meaningful_content(&[CaptionEntry::new("[♪♪♪] ok", 0.0, 1.0)]));
    assert!(has_meaningful_content(&[CaptionEntry::new(
        "this caption has plenty of letters",
        0.0,
        1.0
    )]));
}

#[test]
fn test_transcriptDocument_applyTranslations_shouldRequireMatchingLength() {
    let entries = vec![
        CaptionEntry::new("Hello", 0.0, 1.0),
        CaptionEntry::new("New topic", 10.0, 1.0),
    ];
    let mut doc = TranscriptDocument::build("Title", "abc123", entries, &default_segmenter());

    let inputs = doc.translation_inputs();
    assert_eq!(inputs, vec!["Hello New topic", "Hello", "New topic"]);

    assert!(!doc.apply_translations(vec!["only one".to_string()]));
    assert!(!doc.is_translated());
    assert!(doc.translated_paragraphs.is_none());

    assert!(doc.apply_translations(vec!["a".into(), "b".into(), "c".into()]));
    assert_eq!(doc.translated_full_script.as_deref(), Some("a"));
    assert_eq!(doc.translated_paragraphs.as_ref().map(Vec::len), Some(doc.paragraphs.len()));
}

#[test]
fn test_transcriptDocument_withShortScript_shouldReportInsufficientCaptions() {
    let short = TranscriptDocument::build(
        "t",
        "id",
        vec![CaptionEntry::new("tiny", 0.0, 1.0)],
        &default_segmenter(),
    );
    assert!(short.has_insufficient_captions());

    let long = TranscriptDocument::build(
        "t",
        "id",
        vec![CaptionEntry::new("a caption that is comfortably longer than thirty characters", 0.0, 1.0)],
        &default_segmenter(),
    );
    assert!(!long.has_insufficient_captions());
}
