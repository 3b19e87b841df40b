use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::app_config::SegmentationConfig;

// @module: Transcript model, segmentation and script refinement

// @const: Bracketed music markers inserted by automatic captions
static MUSIC_MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(?:음악|Music|music|MUSIC)\]").unwrap()
});

// @const: Runs of periods
static REPEATED_DOTS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.+").unwrap());

/// Below this many alphanumeric characters the captions carry little content
pub const MIN_MEANINGFUL_CHARS: usize = 20;

/// Scripts shorter than this are flagged in documents and never translated
pub const MIN_SCRIPT_CHARS: usize = 30;

// @struct: Single timed caption fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    // @field: Caption text, whitespace-normalised
    pub text: String,

    // @field: Start of the caption in seconds
    pub start_seconds: f64,

    // @field: Display duration in seconds
    pub duration_seconds: f64,
}

impl CaptionEntry {
    /// Creates a caption entry, collapsing any whitespace in the text
    pub fn new(text: impl AsRef<str>, start_seconds: f64, duration_seconds: f64) -> Self {
        Self {
            text: normalize_whitespace(text.as_ref()),
            start_seconds,
            duration_seconds,
        }
    }

    /// Time at which the caption stops being displayed
    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }

    /// Start time rendered as `HH:MM:SS`
    pub fn format_start_time(&self) -> String {
        format_time(self.start_seconds)
    }
}

impl fmt::Display for CaptionEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.format_start_time(), self.text)
    }
}

/// Group of consecutive caption entries forming one spoken unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphBlock {
    /// Merged text of the entries
    pub text: String,

    /// Start of the first merged entry
    pub start_seconds: f64,
}

/// Output of the segmenter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Every entry's text joined with single spaces
    pub full_script: String,

    /// Paragraph blocks in playback order
    pub paragraphs: Vec<ParagraphBlock>,
}

impl Segmentation {
    /// Paragraph texts joined back together; equals `full_script`
    pub fn reassemble(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Groups caption entries into paragraphs.
///
/// Consecutive entries share a paragraph while the silence between one
/// entry's end and the next entry's start stays below `max_gap_secs` and the
/// paragraph stays within `max_paragraph_chars`. Overlapping captions always
/// merge. An entry longer than the cap is kept whole in its own paragraph.
pub struct Segmenter {
    config: SegmentationConfig,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Segment entries into paragraphs and the flattened full script
    pub fn segment(&self, entries: &[CaptionEntry]) -> Segmentation {
        let mut paragraphs: Vec<ParagraphBlock> = Vec::new();
        let mut current: Option<(ParagraphBlock, usize)> = None;
        let mut previous_end: Option<f64> = None;
        let mut script_parts: Vec<&str> = Vec::with_capacity(entries.len());

        for entry in entries {
            let text = entry.text.trim();
            if text.is_empty() {
                continue;
            }
            script_parts.push(text);
            let text_chars = text.chars().count();

            let gap_breach = previous_end
                .map(|end| entry.start_seconds - end >= self.config.max_gap_secs)
                .unwrap_or(false);

            current = match current.take() {
                Some((mut block, chars))
                    if !gap_breach && chars + 1 + text_chars <= self.config.max_paragraph_chars =>
                {
                    block.text.push(' ');
                    block.text.push_str(text);
                    Some((block, chars + 1 + text_chars))
                }
                open => {
                    if let Some((block, _)) = open {
                        paragraphs.push(block);
                    }
                    Some((
                        ParagraphBlock {
                            text: text.to_string(),
                            start_seconds: entry.start_seconds,
                        },
                        text_chars,
                    ))
                }
            };

            previous_end = Some(entry.end_seconds());
        }

        if let Some((block, _)) = current {
            paragraphs.push(block);
        }

        Segmentation {
            full_script: script_parts.join(" "),
            paragraphs,
        }
    }
}

/// Everything produced for one video, ready to be written out
#[derive(Debug, Clone)]
pub struct TranscriptDocument {
    pub title: String,
    pub video_id: String,
    pub timestamped_entries: Vec<CaptionEntry>,
    pub full_script: String,
    /// Cleaned-up script shown in the combined document
    pub refined_script: String,
    pub paragraphs: Vec<ParagraphBlock>,
    pub translated_full_script: Option<String>,
    pub translated_paragraphs: Option<Vec<String>>,
}

impl TranscriptDocument {
    /// Builds an untranslated document from fetched entries
    pub fn build(
        title: impl Into<String>,
        video_id: impl Into<String>,
        entries: Vec<CaptionEntry>,
        segmenter: &Segmenter,
    ) -> Self {
        let segmentation = segmenter.segment(&entries);
        let refined_script = refine_script(&segmentation.full_script);

        Self {
            title: title.into(),
            video_id: video_id.into(),
            timestamped_entries: entries,
            full_script: segmentation.full_script,
            refined_script,
            paragraphs: segmentation.paragraphs,
            translated_full_script: None,
            translated_paragraphs: None,
        }
    }

    /// Texts handed to the translator: the refined script, then every paragraph
    pub fn translation_inputs(&self) -> Vec<String> {
        std::iter::once(self.refined_script.clone())
            .chain(self.paragraphs.iter().map(|p| p.text.clone()))
            .collect()
    }

    /// Stores translations produced for `translation_inputs`.
    ///
    /// Returns false and leaves the document untranslated when the count
    /// does not line up with the inputs.
    pub fn apply_translations(&mut self, mut translated: Vec<String>) -> bool {
        if translated.len() != self.paragraphs.len() + 1 {
            return false;
        }
        let script = translated.remove(0);
        self.translated_full_script = Some(script);
        self.translated_paragraphs = Some(translated);
        true
    }

    pub fn is_translated(&self) -> bool {
        self.translated_full_script.is_some()
    }

    /// Whether the captions are too thin to be useful
    pub fn has_insufficient_captions(&self) -> bool {
        self.timestamped_entries.is_empty() || self.full_script.trim().chars().count() < MIN_SCRIPT_CHARS
    }
}

/// Collapse every run of whitespace (including newlines) into one space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format seconds as `HH:MM:SS`, dropping fractions
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Remove music markers, repeated sentences and duplicate periods
pub fn refine_script(text: &str) -> String {
    let without_markers = normalize_whitespace(&MUSIC_MARKER_REGEX.replace_all(text, ""));

    let mut unique: Vec<&str> = Vec::new();
    for sentence in without_markers.split(". ") {
        if !sentence.is_empty() && !unique.contains(&sentence) {
            unique.push(sentence);
        }
    }

    let joined = unique.join(". ");
    let collapsed = REPEATED_DOTS_REGEX.replace_all(&joined, ".");

    normalize_whitespace(collapsed.trim())
}

/// True when the captions contain enough letters or digits to be worth reading
pub fn has_meaningful_content(entries: &[CaptionEntry]) -> bool {
    let count: usize = entries
        .iter()
        .map(|e| e.text.chars().filter(|c| c.is_alphanumeric()).count())
        .sum();
    count >= MIN_MEANINGFUL_CHARS
}
