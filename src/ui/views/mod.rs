pub mod dashboard;
pub mod project_detail;
