/*!
 * Rendering of transcript documents.
 *
 * Each document is first described as a list of blocks, then rendered to
 * plain text and to Word (.docx), so both formats always carry the same
 * content.
 */

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use docx_rs::{AlignmentType, Docx, Paragraph, Run};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::transcript::{format_time, TranscriptDocument};

pub const TIMESTAMP_SUFFIX: &str = "타임스탬프";
pub const SCRIPT_SUFFIX: &str = "전체스크립트";

const GENERATED_AT_LABEL: &str = "생성 시간";
const INSUFFICIENT_CAPTIONS_NOTICE: &str = "※ 이 동영상에는 충분한 자막이 없습니다.";
const NO_CAPTIONS_TEXT: &str = "자막이 없습니다.";
const TIMESTAMP_SECTION: &str = "타임스탬프 포함 자막";
const SCRIPT_SECTION: &str = "전체 스크립트";
const TRANSLATED_SCRIPT_SECTION: &str = "번역된 전체 스크립트 (한국어)";
const PARAGRAPH_SECTION: &str = "문단별 정리 스크립트";
const NO_PARAGRAPHS_TEXT: &str = "자막이 없거나 문단 분리가 불가능합니다.";
const TRANSLATION_PREFIX: &str = "[번역]";
const PARAGRAPH_RULE: &str = "---";

/// Horizontal alignment of a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Justify,
}

/// Character formatting of a text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub align: Align,
    pub bold: bool,
    pub italic: bool,
}

/// Format-independent piece of a document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Level 1 is the document title, level 2 a section
    Heading { text: String, level: u8 },
    /// Single line, followed directly by the next line in text output
    Line { text: String, style: TextStyle },
    /// Paragraph, followed by a blank line in text output
    Paragraph { text: String, style: TextStyle },
    /// Separator between paragraphs
    Rule,
    /// Empty spacer paragraph, only visible in .docx output
    Blank,
}

/// Incrementally assembles a block list
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    blocks: Vec<Block>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, text: impl Into<String>, level: u8) -> Self {
        self.blocks.push(Block::Heading { text: text.into(), level });
        self
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(Block::Line {
            text: text.into(),
            style: TextStyle::default(),
        });
        self
    }

    pub fn paragraph(mut self, text: impl Into<String>, style: TextStyle) -> Self {
        self.blocks.push(Block::Paragraph { text: text.into(), style });
        self
    }

    pub fn rule(mut self) -> Self {
        self.blocks.push(Block::Rule);
        self
    }

    pub fn blank(mut self) -> Self {
        self.blocks.push(Block::Blank);
        self
    }

    /// Title, generation time and the thin-captions notice shared by both documents
    fn preamble(self, doc: &TranscriptDocument, generated_at: &str) -> Self {
        let centered = TextStyle {
            align: Align::Center,
            ..TextStyle::default()
        };
        let mut builder = self
            .heading(doc.title.clone(), 1)
            .paragraph(format!("{}: {}", GENERATED_AT_LABEL, generated_at), centered)
            .blank();

        if doc.has_insufficient_captions() {
            builder = builder.paragraph(
                INSUFFICIENT_CAPTIONS_NOTICE,
                TextStyle {
                    bold: true,
                    ..TextStyle::default()
                },
            );
        }
        builder
    }

    pub fn build(self) -> Vec<Block> {
        self.blocks
    }
}

/// Blocks of the timestamped transcript document
pub fn timestamp_blocks(doc: &TranscriptDocument, generated_at: &str) -> Vec<Block> {
    let mut builder = DocumentBuilder::new()
        .preamble(doc, generated_at)
        .heading(TIMESTAMP_SECTION, 2);

    if doc.timestamped_entries.is_empty() {
        builder = builder.line(NO_CAPTIONS_TEXT);
    }
    for entry in &doc.timestamped_entries {
        builder = builder.line(entry.to_string());
    }

    builder.build()
}

/// Blocks of the combined script document
pub fn script_blocks(doc: &TranscriptDocument, generated_at: &str) -> Vec<Block> {
    let justified = TextStyle {
        align: Align::Justify,
        ..TextStyle::default()
    };
    let script = if doc.refined_script.trim().is_empty() {
        NO_CAPTIONS_TEXT.to_string()
    } else {
        doc.refined_script.clone()
    };

    let mut builder = DocumentBuilder::new()
        .preamble(doc, generated_at)
        .heading(SCRIPT_SECTION, 2)
        .paragraph(script, justified);

    if let Some(translated) = &doc.translated_full_script {
        builder = builder
            .heading(TRANSLATED_SCRIPT_SECTION, 2)
            .paragraph(translated.clone(), justified);
    }

    builder = builder.heading(PARAGRAPH_SECTION, 2);
    if doc.paragraphs.is_empty() {
        builder = builder.line(NO_PARAGRAPHS_TEXT);
    }

    let translations = doc.translated_paragraphs.as_deref().unwrap_or_default();
    let last = doc.paragraphs.len().saturating_sub(1);
    for (i, paragraph) in doc.paragraphs.iter().enumerate() {
        builder = builder.paragraph(
            format!("[{}] {}", format_time(paragraph.start_seconds), paragraph.text),
            justified,
        );

        if let Some(translated) = translations.get(i).filter(|t| !t.trim().is_empty()) {
            builder = builder.paragraph(
                format!("{} {}", TRANSLATION_PREFIX, translated),
                TextStyle {
                    italic: true,
                    ..justified
                },
            );
        }

        if i < last {
            builder = builder.rule();
        }
    }

    builder.build()
}

/// Render blocks as UTF-8 text
pub fn render_txt(blocks: &[Block]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            Block::Heading { text, level } if *level <= 1 => {
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::Heading { text, .. } => {
                if !out.is_empty() && !out.ends_with("\n\n") {
                    out.push('\n');
                }
                out.push_str(&format!("==== {} ====\n\n", text));
            }
            Block::Line { text, .. } => {
                out.push_str(text);
                out.push('\n');
            }
            Block::Paragraph { text, .. } => {
                out.push_str(text);
                out.push_str("\n\n");
            }
            Block::Rule => {
                out.push_str(PARAGRAPH_RULE);
                out.push_str("\n\n");
            }
            Block::Blank => {}
        }
    }

    out.truncate(out.trim_end().len());
    out.push('\n');
    out
}

fn styled_run(text: &str, style: TextStyle) -> Run {
    let mut run = Run::new().add_text(text);
    if style.bold {
        run = run.bold();
    }
    if style.italic {
        run = run.italic();
    }
    run
}

fn styled_paragraph(run: Run, align: Align) -> Paragraph {
    let paragraph = Paragraph::new().add_run(run);
    match align {
        Align::Left => paragraph,
        Align::Center => paragraph.align(AlignmentType::Center),
        Align::Justify => paragraph.align(AlignmentType::Both),
    }
}

/// Render blocks as a Word document
pub fn render_docx(blocks: &[Block]) -> Docx {
    blocks.iter().fold(Docx::new(), |docx, block| {
        let paragraph = match block {
            Block::Heading { text, level } => {
                // Sizes are in half-points
                let size = if *level <= 1 { 32 } else { 26 };
                let run = Run::new().add_text(text.as_str()).bold().size(size);
                let align = if *level <= 1 { Align::Center } else { Align::Left };
                styled_paragraph(run, align)
            }
            Block::Line { text, style } | Block::Paragraph { text, style } => {
                styled_paragraph(styled_run(text, *style), style.align)
            }
            Block::Rule => Paragraph::new().add_run(Run::new().add_text(PARAGRAPH_RULE)),
            Block::Blank => Paragraph::new(),
        };
        docx.add_paragraph(paragraph)
    })
}

/// Paths of every file written for one video
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFiles {
    pub timestamp_docx: PathBuf,
    pub timestamp_txt: PathBuf,
    pub script_docx: PathBuf,
    pub script_txt: PathBuf,
}

impl WrittenFiles {
    pub fn all(&self) -> [&Path; 4] {
        [
            self.timestamp_docx.as_path(),
            self.timestamp_txt.as_path(),
            self.script_docx.as_path(),
            self.script_txt.as_path(),
        ]
    }
}

/// Writes the document pairs for a transcript into one directory
pub struct DocumentWriter {
    output_dir: PathBuf,
    generated_at: DateTime<Local>,
}

impl DocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_timestamp(output_dir, Local::now())
    }

    pub fn with_timestamp(output_dir: impl Into<PathBuf>, generated_at: DateTime<Local>) -> Self {
        Self {
            output_dir: output_dir.into(),
            generated_at,
        }
    }

    fn generated_at(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Write both document pairs
    pub fn write(&self, doc: &TranscriptDocument) -> Result<WrittenFiles> {
        FileManager::ensure_dir(&self.output_dir)?;

        let (timestamp_docx, timestamp_txt) = self.write_timestamp_documents(doc)?;
        let (script_docx, script_txt) = self.write_script_documents(doc)?;

        info!("Documents written to {}", self.output_dir.display());
        Ok(WrittenFiles {
            timestamp_docx,
            timestamp_txt,
            script_docx,
            script_txt,
        })
    }

    /// Write `<title>_타임스탬프.docx` and `.txt`
    pub fn write_timestamp_documents(&self, doc: &TranscriptDocument) -> Result<(PathBuf, PathBuf)> {
        let blocks = timestamp_blocks(doc, &self.generated_at());
        self.write_pair(doc, TIMESTAMP_SUFFIX, &blocks)
    }

    /// Write `<title>_전체스크립트.docx` and `.txt`
    pub fn write_script_documents(&self, doc: &TranscriptDocument) -> Result<(PathBuf, PathBuf)> {
        let blocks = script_blocks(doc, &self.generated_at());
        self.write_pair(doc, SCRIPT_SUFFIX, &blocks)
    }

    fn write_pair(&self, doc: &TranscriptDocument, suffix: &str, blocks: &[Block]) -> Result<(PathBuf, PathBuf)> {
        let docx_path = FileManager::document_path(&self.output_dir, &doc.title, &doc.video_id, suffix, "docx");
        let txt_path = FileManager::document_path(&self.output_dir, &doc.title, &doc.video_id, suffix, "txt");

        let file = FileManager::create_file(&docx_path)?;
        render_docx(blocks)
            .build()
            .pack(file)
            .map_err(|e| anyhow!("Failed to write Word document {}: {}", docx_path.display(), e))?;
        debug!("Wrote {}", docx_path.display());

        FileManager::write_to_file(&txt_path, &render_txt(blocks))?;
        debug!("Wrote {}", txt_path.display());

        Ok((docx_path, txt_path))
    }
}
