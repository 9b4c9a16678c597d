pub mod evaluation_report;
pub mod training_report;
