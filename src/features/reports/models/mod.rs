mod report;

pub use report::{BucketCount, Report, ReportCategory, ReportSeverity};
