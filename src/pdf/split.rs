//! Split a multi-page document into independent single-page files.

use lopdf::Document;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::SplitConfig;

use super::{format_kb, PdfError};

/// Highest page count the `page_{n:03d}.pdf` naming scheme can hold
/// without colliding. Larger documents are rejected outright rather than
/// silently truncated.
pub const PAGE_NAME_LIMIT: usize = 999;

/// One single-page output file
#[derive(Debug, Clone, Serialize)]
pub struct PageFile {
    /// 1-based page number, matching the source page order
    pub index: u32,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of a completed split
#[derive(Debug, Clone, Serialize)]
pub struct SplitSummary {
    pub source: PathBuf,
    pub pages_dir: PathBuf,
    pub pages: Vec<PageFile>,
}

/// Split the source document into `page_{n:03d}.pdf` files.
///
/// Each output is the source document with every other page deleted and
/// unreferenced objects pruned, so page resources survive intact. Output
/// bytes depend only on the source bytes: re-running over the same source
/// produces byte-identical files.
pub fn split(config: &SplitConfig, quiet: bool) -> Result<SplitSummary, PdfError> {
    let input = &config.input;
    if !input.exists() {
        return Err(PdfError::InvalidFile(format!(
            "File not found: {}",
            input.display()
        )));
    }
    if !input.is_file() {
        return Err(PdfError::InvalidFile(format!(
            "Not a file: {}",
            input.display()
        )));
    }

    let doc = Document::load(input)?;
    let page_map = doc.get_pages();
    let total = page_map.len();
    debug!(source = %input.display(), pages = total, "loaded source document");

    if total > PAGE_NAME_LIMIT {
        return Err(PdfError::PageLimit {
            pages: total,
            limit: PAGE_NAME_LIMIT,
        });
    }

    std::fs::create_dir_all(&config.pages_dir)?;

    if !quiet {
        println!("Splitting {} into {} pages...", input.display(), total);
    }

    let page_numbers: Vec<u32> = page_map.keys().copied().collect();
    let mut pages = Vec::with_capacity(total);
    for &number in &page_numbers {
        let delete: Vec<u32> = page_numbers
            .iter()
            .copied()
            .filter(|&n| n != number)
            .collect();

        let mut single = doc.clone();
        single.delete_pages(&delete);
        single.prune_objects();
        single.renumber_objects();

        let filename = format!("page_{:03}.pdf", number);
        let path = config.pages_dir.join(&filename);
        single.save(&path)?;

        let bytes = std::fs::metadata(&path)?.len();
        if !quiet {
            println!("  Created {} ({} KB)", filename, format_kb(bytes));
        }
        pages.push(PageFile {
            index: number,
            path,
            bytes,
        });
    }

    if !quiet {
        println!();
        println!(
            "Split complete! {} pages saved to {}/",
            total,
            config.pages_dir.display()
        );
        println!();
        println!("Directory contents:");
        for (name, bytes) in list_page_files(config)? {
            println!("  {} ({} KB)", name, format_kb(bytes));
        }
    }

    Ok(SplitSummary {
        source: input.clone(),
        pages_dir: config.pages_dir.clone(),
        pages,
    })
}

/// Sorted `(filename, size)` listing of the PDF files in the pages
/// directory.
fn list_page_files(config: &SplitConfig) -> Result<Vec<(String, u64)>, PdfError> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(&config.pages_dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "pdf") {
            let name = entry.file_name().to_string_lossy().into_owned();
            let bytes = entry.metadata()?.len();
            entries.push((name, bytes));
        }
    }
    entries.sort();
    Ok(entries)
}
