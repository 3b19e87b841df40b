/*!
 * End-to-end runs of the controller with in-memory captions and mock translation
 */

use anyhow::Result;
use ytscript::app_controller::Controller;
use ytscript::errors::FetchError;
use ytscript::providers::mock::MockProvider;
use ytscript::transcript::CaptionEntry;
use ytscript::translation_service::TranslationService;
use crate::common::{self, MockCaptionSource};

const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

fn mock_translator(provider: MockProvider) -> TranslationService<MockProvider> {
    TranslationService::with_provider(provider, common::fast_translation_config())
}

#[test]
fn test_run_withoutTranslation_shouldWriteFourDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("downloads");
    let controller = Controller::with_config(common::test_config(&out_dir))?;
    let source = MockCaptionSource::with_entries("Rust Errors", common::sample_entries());

    let files = tokio_test::block_on(controller.run_with(
        VIDEO_URL,
        &source,
        None::<&TranslationService<MockProvider>>,
    ))?;

    assert_eq!(source.calls(), 1);
    assert_eq!(common::count_files(&out_dir), 4);
    for path in files.all() {
        assert!(path.is_file());
    }

    let timestamps = std::fs::read_to_string(&files.timestamp_txt)?;
    assert!(timestamps.contains("[00:00:02] Today we are looking at Rust error handling."));

    let script = std::fs::read_to_string(&files.script_txt)?;
    assert!(!script.contains("[번역]"));
    Ok(())
}

#[test]
fn test_run_withNoCaptions_shouldFailWithoutWritingFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let out_dir = temp_dir.path().join("downloads");
    let controller = Controller::with_config(common::test_config(&out_dir))?;
    let source = MockCaptionSource::without_captions();

    let result = tokio_test::block_on(controller.run_with(
        VIDEO_URL,
        &source,
        Some(&mock_translator(MockProvider::working())),
    ));

    let err = result.expect_err("run should fail without captions");
    assert!(matches!(err.downcast_ref::<FetchError>(), Some(FetchError::NotFound { .. })));
    assert!(!out_dir.exists() || common::count_files(&out_dir) == 0);
    Ok(())
}

#[test]
fn test_run_withFailingTranslation_shouldStillWriteUntranslatedDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let source = MockCaptionSource::with_entries("Rust Errors", common::sample_entries());
    let translator = mock_translator(MockProvider::failing());

    let files = tokio_test::block_on(controller.run_with(VIDEO_URL, &source, Some(&translator)))?;

    assert!(translator.provider().request_count() > 0);
    assert_eq!(common::count_files(temp_dir.path()), 4);

    let script = std::fs::read_to_string(&files.script_txt)?;
    assert!(script.contains("==== 전체 스크립트 ===="));
    assert!(!script.contains("번역된 전체 스크립트"));
    assert!(!script.contains("[번역]"));
    Ok(())
}

#[test]
fn test_run_withWorkingTranslation_shouldIncludeTranslatedSections() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let source = MockCaptionSource::with_entries("Rust Errors", common::sample_entries());
    let translator = mock_translator(MockProvider::working());

    let files = tokio_test::block_on(controller.run_with(VIDEO_URL, &source, Some(&translator)))?;

    // Refined script plus two paragraphs
    assert_eq!(translator.provider().request_count(), 3);

    let script = std::fs::read_to_string(&files.script_txt)?;
    assert!(script.contains("==== 번역된 전체 스크립트 (한국어) ====\n\n[KO] Welcome back"));
    assert!(script.contains("[번역] [KO] Welcome back to the channel everyone."));
    assert!(script.contains("[번역] [KO] Let us start with the question mark operator."));
    Ok(())
}

#[test]
fn test_run_withKoreanCaptions_shouldSkipTranslation() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let entries = vec![
        CaptionEntry::new("안녕하세요 여러분, 오늘은 러스트의 오류 처리에 대해 알아보겠습니다.", 0.0, 3.0),
        CaptionEntry::new("물음표 연산자부터 시작해 봅시다.", 3.5, 2.0),
    ];
    let source = MockCaptionSource::with_entries("러스트 강의", entries);
    let translator = mock_translator(MockProvider::working());

    let files = tokio_test::block_on(controller.run_with(VIDEO_URL, &source, Some(&translator)))?;

    assert_eq!(translator.provider().request_count(), 0);
    assert!(files.script_txt.ends_with("러스트 강의_전체스크립트.txt"));
    Ok(())
}

#[test]
fn test_run_withKoreanMusicMarkers_shouldDetectLanguageOnRefinedScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let mut entries: Vec<CaptionEntry> = (0..20)
        .map(|i| CaptionEntry::new("[음악]", i as f64, 1.0))
        .collect();
    entries.push(CaptionEntry::new("Hello everyone and welcome to the show", 20.5, 3.0));
    let source = MockCaptionSource::with_entries("Intro", entries);
    let translator = mock_translator(MockProvider::working());

    let files = tokio_test::block_on(controller.run_with(VIDEO_URL, &source, Some(&translator)))?;

    assert!(translator.provider().request_count() > 0);
    let script = std::fs::read_to_string(&files.script_txt)?;
    assert!(script.contains("[KO] Hello everyone and welcome to the show"));
    Ok(())
}

#[test]
fn test_run_withShortScript_shouldSkipTranslationAndFlagDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let source = MockCaptionSource::with_entries("", vec![CaptionEntry::new("Thanks for watching", 0.0, 2.0)]);
    let translator = mock_translator(MockProvider::working());

    let files = tokio_test::block_on(controller.run_with("dQw4w9WgXcQ", &source, Some(&translator)))?;

    assert_eq!(translator.provider().request_count(), 0);
    assert!(files.timestamp_txt.ends_with("dQw4w9WgXcQ_타임스탬프.txt"));
    let timestamps = std::fs::read_to_string(&files.timestamp_txt)?;
    assert!(timestamps.contains("※ 이 동영상에는 충분한 자막이 없습니다."));
    Ok(())
}

#[test]
fn test_run_withEmptyInput_shouldFailBeforeFetching() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::test_config(temp_dir.path()))?;
    let source = MockCaptionSource::with_entries("unused", common::sample_entries());

    let result = tokio_test::block_on(controller.run_with(
        "   ",
        &source,
        None::<&TranslationService<MockProvider>>,
    ));

    assert!(result.is_err());
    assert_eq!(source.calls(), 0);
    Ok(())
}
