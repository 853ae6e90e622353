//! Document assembly: compose a block plan from the section catalog, render
//! it, and write the output file.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::DocumentConfig;
use crate::content::{self, Catalog};
use crate::utils::progress::ProgressReporter;

use super::layout::{Block, DocumentPlan, Renderer, StatsTable};
use super::{format_mb, PdfError};

const DOCUMENT_TITLE: &str = "Comprehensive AI Research Document";
const DOCUMENT_SUBTITLE: &str = "Advanced Machine Learning and Deep Learning Techniques";
const DOCUMENT_TAGLINE: &str =
    "A detailed exploration of neural networks, transformers, optimization, and applications";

/// Result of a completed build
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub path: PathBuf,
    pub bytes: u64,
    pub pages: usize,
    pub paragraphs: usize,
}

/// Compose the full document plan: title block, then `cycles` passes over
/// the catalog, each section contributing a cycle-labeled heading, its
/// expanded paragraphs, the statistics table and a narrative block, ending
/// with a page break.
pub fn compose(catalog: &Catalog, config: &DocumentConfig) -> DocumentPlan {
    let mut plan = DocumentPlan::default();

    plan.push(Block::Title(DOCUMENT_TITLE.to_string()));
    plan.push(Block::Spacer(20.0));
    plan.push(Block::Subtitle(DOCUMENT_SUBTITLE.to_string()));
    plan.push(Block::Spacer(20.0));
    plan.push(Block::Tagline(DOCUMENT_TAGLINE.to_string()));
    plan.push(Block::PageBreak);

    for cycle in 0..config.cycles {
        for section in &catalog.sections {
            plan.push(Block::Heading(format!(
                "{} - Volume {}",
                section.title,
                cycle + 1
            )));
            plan.push(Block::Spacer(12.0));

            for paragraph in content::expand(&section.sentences, config.repetitions) {
                plan.push(Block::Paragraph(paragraph));
                plan.push(Block::Spacer(6.0));
            }

            plan.push(Block::Table(metrics_table()));
            plan.push(Block::Spacer(15.0));
            plan.push(Block::Narrative(narrative_text(cycle)));
            plan.push(Block::Spacer(10.0));
            plan.push(Block::PageBreak);
        }
    }

    plan
}

/// Compose, render and save the document, reporting the final size.
pub fn build(
    catalog: &Catalog,
    config: &DocumentConfig,
    quiet: bool,
) -> Result<BuildSummary, PdfError> {
    let plan = compose(catalog, config);
    let paragraphs = plan.paragraph_count();
    debug!(
        blocks = plan.blocks.len(),
        paragraphs,
        cycles = config.cycles,
        repetitions = config.repetitions,
        "composed document plan"
    );

    let progress = if quiet {
        ProgressReporter::quiet("Rendering", plan.blocks.len())
    } else {
        ProgressReporter::new("Rendering", plan.blocks.len())
    };

    let mut renderer = Renderer::new();
    for block in &plan.blocks {
        renderer.render_block(block)?;
        progress.inc();
    }
    progress.finish();

    let pages = renderer.page_count();
    let mut doc = renderer.finish()?;
    doc.save(&config.output)?;

    let bytes = std::fs::metadata(&config.output)?.len();
    info!(path = %config.output.display(), bytes, pages, "document written");

    if !quiet {
        println!("Generated PDF: {}", config.output.display());
        println!("File size: {} MB", format_mb(bytes));
    }

    Ok(BuildSummary {
        path: config.output.clone(),
        bytes,
        pages,
        paragraphs,
    })
}

/// The fixed placeholder metrics table attached to every section-cycle.
/// The numbers are literal filler, not computed from anything.
fn metrics_table() -> StatsTable {
    let header = ["Metric", "Baseline", "Improved", "Enhancement", "Significance"];
    let rows = [
        ["Accuracy", "87.2%", "94.7%", "+7.5%", "p<0.001"],
        ["F1-Score", "0.832", "0.923", "+0.091", "p<0.001"],
        ["Precision", "0.845", "0.935", "+0.090", "p<0.001"],
        ["Recall", "0.819", "0.912", "+0.093", "p<0.001"],
        ["Training Time", "24.3h", "18.7h", "-23.0%", "p<0.01"],
        ["Memory Usage", "8.2GB", "6.8GB", "-17.1%", "p<0.01"],
        ["Inference Speed", "45ms", "32ms", "-28.9%", "p<0.001"],
        ["Energy Consumption", "120W", "95W", "-20.8%", "p<0.05"],
    ];

    StatsTable {
        header: header.iter().map(|s| s.to_string()).collect(),
        rows: rows
            .iter()
            .map(|row| row.iter().map(|s| s.to_string()).collect())
            .collect(),
    }
}

/// Narrative block repeated after every table. The only cycle-dependent
/// content is the dataset count, `cycle + 5`.
fn narrative_text(cycle: usize) -> String {
    format!(
        "Comprehensive experimental validation was conducted across {} different datasets \
         with rigorous cross-validation protocols. The results demonstrate consistent \
         improvements across all evaluation metrics with high statistical significance. \
         Implementation details include optimization strategies, distributed training \
         approaches, and production deployment considerations. The methodology encompasses \
         data preprocessing, feature engineering, model architecture design, hyperparameter \
         optimization, and performance evaluation using industry-standard benchmarks. \
         Advanced techniques employed include gradient clipping, learning rate scheduling, \
         batch normalization, dropout regularization, weight decay, early stopping, and \
         ensemble methods. The computational infrastructure utilized high-performance GPU \
         clusters with efficient data loading pipelines and distributed training frameworks \
         for scalable machine learning workflows. Statistical analysis reveals significant \
         improvements (p < 0.001) across all major evaluation metrics with large effect \
         sizes (Cohen's d > 1.2) indicating practical significance for real-world deployment \
         scenarios. Confidence intervals are narrow, demonstrating consistent performance \
         across different experimental conditions and random seeds.",
        cycle + 5
    )
}
