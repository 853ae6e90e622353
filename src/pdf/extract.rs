//! Per-page text extraction with character counts and token estimates.

use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::ui::format_number;

use super::PdfError;

/// Extraction result for one page file
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub source: PathBuf,
    pub text_path: PathBuf,
    pub char_count: usize,
    pub token_estimate: u64,
}

/// Result of a completed extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractSummary {
    pub files: Vec<PageText>,
    pub total_chars: usize,
    pub total_tokens: u64,
}

impl ExtractSummary {
    /// Integer-divided average tokens per page; `None` with no files.
    pub fn average_tokens(&self) -> Option<u64> {
        if self.files.is_empty() {
            None
        } else {
            Some(self.total_tokens / self.files.len() as u64)
        }
    }
}

/// Character-count token estimate: `max(1, floor(chars / chars_per_token))`.
/// The ratio is a replaceable policy constant, not a real tokenizer.
pub fn token_estimate(char_count: usize, chars_per_token: f64) -> u64 {
    let estimate = (char_count as f64 / chars_per_token).floor() as u64;
    estimate.max(1)
}

/// Extract text from every page file in the pages directory, writing one
/// `.txt` file per page and accumulating totals.
///
/// Page files are processed in lexicographic filename order, which equals
/// page order under the zero-padded naming scheme. A page that fails to
/// parse fails the whole run.
pub fn extract(config: &ExtractConfig, quiet: bool) -> Result<ExtractSummary, PdfError> {
    let pages_dir = &config.pages_dir;
    if !pages_dir.is_dir() {
        return Err(PdfError::InvalidFile(format!(
            "Not a directory: {}",
            pages_dir.display()
        )));
    }

    std::fs::create_dir_all(&config.text_dir)?;

    let mut pdf_files = Vec::new();
    for entry in std::fs::read_dir(pages_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "pdf") {
            pdf_files.push(path);
        }
    }
    pdf_files.sort();
    debug!(pages = pdf_files.len(), "scanning page files");

    if !quiet {
        println!("Extracting text from {} pages...", pdf_files.len());
    }

    let mut files = Vec::with_capacity(pdf_files.len());
    let mut total_chars = 0usize;
    let mut total_tokens = 0u64;

    for path in &pdf_files {
        let text = pdf_extract::extract_text(path)
            .map_err(|e| PdfError::Format(format!("{}: {}", path.display(), e)))?;

        let stem = path
            .file_stem()
            .ok_or_else(|| PdfError::InvalidFile(format!("No file name: {}", path.display())))?;
        let text_name = format!("{}.txt", stem.to_string_lossy());
        let text_path = config.text_dir.join(&text_name);
        std::fs::write(&text_path, &text)?;

        let char_count = text.chars().count();
        let tokens = token_estimate(char_count, config.chars_per_token);
        total_chars += char_count;
        total_tokens += tokens;

        if !quiet {
            println!(
                "  {}: {} chars, ~{} tokens",
                text_name,
                format_number(char_count as u64),
                format_number(tokens)
            );
        }
        files.push(PageText {
            source: path.clone(),
            text_path,
            char_count,
            token_estimate: tokens,
        });
    }

    let summary = ExtractSummary {
        files,
        total_chars,
        total_tokens,
    };

    if !quiet {
        println!();
        println!("Text extraction complete!");
        println!("Total characters: {}", format_number(total_chars as u64));
        println!("Total estimated tokens: {}", format_number(total_tokens));
        if let Some(average) = summary.average_tokens() {
            println!("Average tokens per page: {}", format_number(average));
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitConfig;
    use crate::pdf::layout::{Block, DocumentPlan, Renderer};
    use crate::pdf::split;
    use tempfile::tempdir;

    #[test]
    fn test_token_estimate_formula() {
        assert_eq!(token_estimate(38, 3.8), 10);
        assert_eq!(token_estimate(100, 3.8), 26); // floor(26.3)
        assert_eq!(token_estimate(3, 3.8), 1); // floored to 0, clamped
    }

    #[test]
    fn test_token_estimate_floor_is_one() {
        assert_eq!(token_estimate(0, 3.8), 1);
        assert_eq!(token_estimate(1, 3.8), 1);
    }

    #[test]
    fn test_token_estimate_alternate_ratio() {
        assert_eq!(token_estimate(100, 4.0), 25);
        assert_eq!(token_estimate(100, 2.0), 50);
    }

    #[test]
    fn test_extract_missing_pages_dir() {
        let config = ExtractConfig {
            pages_dir: PathBuf::from("/nonexistent/pages"),
            text_dir: PathBuf::from("/tmp/unused_text"),
            chars_per_token: 3.8,
        };
        assert!(matches!(
            extract(&config, true),
            Err(PdfError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_extract_empty_pages_dir() {
        let dir = tempdir().unwrap();
        let pages_dir = dir.path().join("pages");
        std::fs::create_dir_all(&pages_dir).unwrap();

        let config = ExtractConfig {
            pages_dir,
            text_dir: dir.path().join("text"),
            chars_per_token: 3.8,
        };
        let summary = extract(&config, true).unwrap();

        assert!(summary.files.is_empty());
        assert_eq!(summary.total_chars, 0);
        assert_eq!(summary.total_tokens, 0);
        assert_eq!(summary.average_tokens(), None);
        assert!(config.text_dir.is_dir());
    }

    #[test]
    fn test_extract_corrupt_page_fails_run() {
        let dir = tempdir().unwrap();
        let pages_dir = dir.path().join("pages");
        std::fs::create_dir_all(&pages_dir).unwrap();
        std::fs::write(pages_dir.join("page_001.pdf"), b"garbage").unwrap();

        let config = ExtractConfig {
            pages_dir,
            text_dir: dir.path().join("text"),
            chars_per_token: 3.8,
        };
        assert!(matches!(extract(&config, true), Err(PdfError::Format(_))));
    }

    #[test]
    fn test_extract_from_split_pages() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("doc.pdf");

        let mut plan = DocumentPlan::default();
        plan.push(Block::Paragraph(
            "The quick brown fox jumps over the lazy dog.".to_string(),
        ));
        plan.push(Block::PageBreak);
        plan.push(Block::Paragraph(
            "Pack my box with five dozen liquor jugs.".to_string(),
        ));

        let mut renderer = Renderer::new();
        for block in &plan.blocks {
            renderer.render_block(block).unwrap();
        }
        renderer.finish().unwrap().save(&input).unwrap();

        let split_config = SplitConfig {
            input,
            pages_dir: dir.path().join("pages"),
        };
        split(&split_config, true).unwrap();

        let config = ExtractConfig {
            pages_dir: split_config.pages_dir.clone(),
            text_dir: dir.path().join("text"),
            chars_per_token: 3.8,
        };
        let summary = extract(&config, true).unwrap();

        assert_eq!(summary.files.len(), 2);
        assert!(summary.total_chars > 0);
        assert!(summary.total_tokens >= 2);
        assert!(summary.average_tokens().unwrap() >= 1);

        let first = std::fs::read_to_string(dir.path().join("text/page_001.txt")).unwrap();
        assert!(first.contains("quick brown fox"));
        let second = std::fs::read_to_string(dir.path().join("text/page_002.txt")).unwrap();
        assert!(second.contains("liquor jugs"));

        // One text file per page file, nothing skipped.
        for page in &summary.files {
            assert!(page.text_path.exists());
            assert!(page.token_estimate >= 1);
        }
    }
}
