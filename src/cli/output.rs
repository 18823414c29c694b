pub use codejudge_core::format::OutputFormat;
use clap::ValueEnum;
use codejudge_core::report::ReportOutput;

/// Which report files `report` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
    Both,
}

impl From<ReportFormat> for ReportOutput {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Markdown => ReportOutput::Markdown,
            ReportFormat::Json => ReportOutput::Json,
            ReportFormat::Both => ReportOutput::Both,
        }
    }
}
