pub mod json;
pub mod text;

use crate::cli::OutputFormat;
use crate::types::RunSummary;

pub fn render(summary: &RunSummary, format: OutputFormat, stack_trace: bool) {
    match format {
        OutputFormat::Text => text::render(summary, stack_trace),
        OutputFormat::Json => json::render(summary),
    }
}
