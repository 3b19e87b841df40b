/*!
 * Tests for document rendering and writing
 */

use anyhow::Result;
use chrono::{Local, TimeZone};
use ytscript::app_config::SegmentationConfig;
use ytscript::document_writer::{
    render_txt, script_blocks, timestamp_blocks, Block, DocumentWriter, SCRIPT_SUFFIX, TIMESTAMP_SUFFIX,
};
use ytscript::transcript::{CaptionEntry, Segmenter, TranscriptDocument};
use crate::common;

const GENERATED_AT: &str = "2024-05-01 12:30:00";

fn sample_document() -> TranscriptDocument {
    TranscriptDocument::build(
        "Rust: Errors?",
        "abc123def45",
        common::sample_entries(),
        &Segmenter::new(SegmentationConfig::default()),
    )
}

fn translated_document() -> TranscriptDocument {
    let mut doc = sample_document();
    let translations = vec![
        "번역된 전체 스크립트".to_string(),
        "첫 번째 문단".to_string(),
        "두 번째 문단".to_string(),
    ];
    assert!(doc.apply_translations(translations));
    doc
}

#[test]
fn test_timestamp_blocks_shouldListEveryEntryWithTime() {
    let doc = sample_document();

    let text = render_txt(&timestamp_blocks(&doc, GENERATED_AT));

    assert!(text.starts_with("Rust: Errors?\n\n생성 시간: 2024-05-01 12:30:00\n\n"));
    assert!(text.contains("==== 타임스탬프 포함 자막 ====\n\n"));
    assert!(text.contains("[00:00:00] Welcome back to the channel everyone.\n"));
    assert!(text.contains("[00:00:15] Let us start with the question mark operator.\n"));
    assert!(!text.contains("※"));
    assert!(text.ends_with("an error.\n"));
}

#[test]
fn test_script_blocks_withoutTranslation_shouldOmitTranslatedSections() {
    let doc = sample_document();

    let text = render_txt(&script_blocks(&doc, GENERATED_AT));

    assert!(text.contains("==== 전체 스크립트 ====\n\n"));
    assert!(text.contains("==== 문단별 정리 스크립트 ====\n\n"));
    assert!(text.contains("[00:00:00] Welcome back to the channel everyone. Today we are"));
    assert!(text.contains("\n---\n"));
    assert!(!text.contains("번역된 전체 스크립트"));
    assert!(!text.contains("[번역]"));
}

#[test]
fn test_script_blocks_withTranslation_shouldAddTranslatedSections() {
    let doc = translated_document();

    let blocks = script_blocks(&doc, GENERATED_AT);
    let text = render_txt(&blocks);

    assert!(text.contains("==== 번역된 전체 스크립트 (한국어) ====\n\n번역된 전체 스크립트\n"));
    assert!(text.contains("[번역] 첫 번째 문단"));
    assert!(text.contains("[번역] 두 번째 문단"));

    let italic_paragraphs = blocks
        .iter()
        .filter(|b| matches!(b, Block::Paragraph { style, .. } if style.italic))
        .count();
    assert_eq!(italic_paragraphs, 2);

    let rules = blocks.iter().filter(|b| matches!(b, Block::Rule)).count();
    assert_eq!(rules, doc.paragraphs.len() - 1);
}

#[test]
fn test_blocks_withThinCaptions_shouldShowNotice() {
    let doc = TranscriptDocument::build(
        "Short",
        "id",
        vec![CaptionEntry::new("hi", 0.0, 1.0)],
        &Segmenter::new(SegmentationConfig::default()),
    );

    let text = render_txt(&timestamp_blocks(&doc, GENERATED_AT));

    assert!(text.contains("※ 이 동영상에는 충분한 자막이 없습니다."));
}

#[test]
fn test_write_shouldCreateFourNamedFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("downloads");
    let generated_at = Local
        .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
        .single()
        .expect("valid local time");
    let writer = DocumentWriter::with_timestamp(&out_dir, generated_at);

    let files = writer.write(&translated_document())?;

    assert_eq!(files.timestamp_docx, out_dir.join(format!("Rust Errors_{}.docx", TIMESTAMP_SUFFIX)));
    assert_eq!(files.script_txt, out_dir.join(format!("Rust Errors_{}.txt", SCRIPT_SUFFIX)));
    for path in files.all() {
        assert!(path.is_file(), "missing {}", path.display());
        assert!(std::fs::metadata(path)?.len() > 0);
    }
    assert_eq!(common::count_files(&out_dir), 4);

    let script = std::fs::read_to_string(&files.script_txt)?;
    assert!(script.contains("생성 시간: 2024-05-01 12:30:00"));
    assert!(script.contains("[번역] 첫 번째 문단"));

    // .docx files are zip archives
    let docx = std::fs::read(&files.script_docx)?;
    assert_eq!(&docx[..2], b"PK");
    Ok(())
}

#[test]
fn test_write_withLongKoreanTitle_shouldFitFileNameLimit() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let doc = TranscriptDocument::build(
        "가".repeat(90),
        "abc123def45",
        common::sample_entries(),
        &Segmenter::new(SegmentationConfig::default()),
    );

    let files = DocumentWriter::new(temp_dir.path()).write(&doc)?;

    assert_eq!(common::count_files(temp_dir.path()), 4);
    for path in files.all() {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        assert!(name.len() <= 255, "{} bytes", name.len());
        assert!(name.starts_with("가가가"));
    }
    Ok(())
}
