use std::fmt;
use std::str::FromStr;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    #[default]
    Pdf,
    Txt,
    Json,
}

impl DocumentKind {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Txt => "txt",
            DocumentKind::Json => "json",
        }
    }

    pub fn file_name(self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "pdf" => Ok(DocumentKind::Pdf),
            "txt" | "text" => Ok(DocumentKind::Txt),
            "json" => Ok(DocumentKind::Json),
            other => Err(format!("Unknown document format: {}", other)),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Turns text into the bytes of a downloadable file.
pub trait DocumentRenderer: Send + Sync {
    fn render(&self, title: &str, text: &str, kind: DocumentKind) -> Result<Vec<u8>, RenderError>;
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const FONT_SIZE: f32 = 11.0;
const LINE_HEIGHT: f32 = 6.0;
const WRAP_COLUMNS: usize = 90;

/// Characters outside Latin-1 that the builtin fonts' WinAnsi encoding still has.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

fn win_ansi_encodable(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | ' '..='~' | '\u{a0}'..='\u{ff}') || WIN_ANSI_EXTRAS.contains(c)
}

#[derive(Clone, Default)]
pub struct DocumentService;

impl DocumentService {
    pub fn new() -> Self {
        Self
    }

    fn render_pdf(&self, title: &str, text: &str) -> Result<Vec<u8>, RenderError> {
        // The builtin font drops what it cannot encode, so refuse instead of losing text.
        if let Some(c) = text.chars().find(|c| !win_ansi_encodable(*c)) {
            return Err(RenderError::Pdf(format!("character {:?} cannot be encoded with the builtin font", c)));
        }

        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        let mut current = doc.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT - MARGIN;

        for line in wrap_lines(text, WRAP_COLUMNS) {
            if y < MARGIN {
                let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
                current = doc.get_page(page).get_layer(layer);
                y = PAGE_HEIGHT - MARGIN;
            }
            current.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
            y -= LINE_HEIGHT;
        }

        doc.save_to_bytes().map_err(|e| RenderError::Pdf(e.to_string()))
    }

    /// Text that already is JSON is pretty-printed as is; anything else is wrapped.
    fn render_json(&self, title: &str, text: &str) -> Result<Vec<u8>, RenderError> {
        let value = serde_json::from_str::<Value>(text)
            .unwrap_or_else(|_| serde_json::json!({ "title": title, "content": text }));
        Ok(serde_json::to_vec_pretty(&value)?)
    }
}

impl DocumentRenderer for DocumentService {
    fn render(&self, title: &str, text: &str, kind: DocumentKind) -> Result<Vec<u8>, RenderError> {
        match kind {
            DocumentKind::Pdf => self.render_pdf(title, text),
            DocumentKind::Txt => Ok(text.as_bytes().to_vec()),
            DocumentKind::Json => self.render_json(title, text),
        }
    }
}

/// Splits on line breaks and wraps long lines at word boundaries.
fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.lines() {
        let mut line = String::new();
        for word in raw.split_whitespace() {
            let needed = line.chars().count() + word.chars().count() + usize::from(!line.is_empty());
            if needed > columns && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    lines
}
