use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{ChunkedRetry, RenderEngine};
use crate::error::{Result, TexPilotError};

const BEGIN_DOCUMENT: &str = "\\begin{document}";
const END_DOCUMENT: &str = "\\end{document}";
const SECTION_STARTS: &[&str] = &["\\part", "\\chapter", "\\section"];

/// Chunked retry that renders a document piece by piece and concatenates the output.
pub struct ChunkingRenderer {
    engine: Arc<dyn RenderEngine>,
    max_chars: usize,
}

impl ChunkingRenderer {
    pub fn new(engine: Arc<dyn RenderEngine>, max_chars: usize) -> Self {
        Self {
            engine,
            max_chars: max_chars.max(1),
        }
    }
}

#[async_trait]
impl ChunkedRetry for ChunkingRenderer {
    async fn process_in_chunks(&self, input: &str, args: &str) -> Result<String> {
        let chunks = split_into_chunks(input, self.max_chars);
        if chunks.is_empty() {
            return Err(TexPilotError::InvalidInput(
                "nothing to convert".to_string(),
            ));
        }

        info!(chunks = chunks.len(), "Processing document in chunks");
        let mut outputs = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!(chunk = idx + 1, chars = chunk.chars().count(), "Rendering chunk");
            outputs.push(self.engine.render(chunk, args).await?);
        }
        Ok(outputs.join("\n"))
    }
}

/// Split LaTeX source into self-contained chunks of at most `max_chars` body characters.
///
/// Sections are preferred split points, then blank-line paragraphs. A single
/// paragraph longer than `max_chars` becomes its own chunk. The preamble, when
/// present, is re-attached to every chunk.
pub fn split_into_chunks(input: &str, max_chars: usize) -> Vec<String> {
    let (preamble, body) = split_preamble(input);

    let mut pieces = Vec::new();
    for segment in split_sections(body) {
        if char_len(&segment) <= max_chars {
            pieces.push(segment);
        } else {
            pieces.extend(split_paragraphs(&segment));
        }
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if !current.is_empty() && char_len(&current) + char_len(&piece) > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&piece);
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .map(|c| match preamble {
            Some(pre) => format!("{}\n{}\n{}\n", pre, c.trim_end(), END_DOCUMENT),
            None => c,
        })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_preamble(input: &str) -> (Option<&str>, &str) {
    let Some(begin) = input.find(BEGIN_DOCUMENT) else {
        return (None, input);
    };
    let body_start = begin + BEGIN_DOCUMENT.len();
    let preamble = &input[..body_start];
    let rest = &input[body_start..];
    let body = match rest.rfind(END_DOCUMENT) {
        Some(end) => &rest[..end],
        None => rest,
    };
    (Some(preamble.trim_end()), body)
}

fn split_sections(body: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for line in body.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let starts_section = SECTION_STARTS.iter().any(|s| trimmed.starts_with(s));
        if starts_section && !current.trim().is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn split_paragraphs(segment: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in segment.split_inclusive('\n') {
        current.push_str(line);
        if line.trim().is_empty() && !current.trim().is_empty() {
            paragraphs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}
