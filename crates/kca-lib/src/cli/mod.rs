mod analyze;
mod args;
mod params;
mod resolved_command;

pub use analyze::{AnalyzeSummary, ProcessedPackage, analyze_with, run_analyze};
pub use args::{Args, Command, parse_args};
pub use params::AnalyzeParams;
pub use resolved_command::resolve_command;
