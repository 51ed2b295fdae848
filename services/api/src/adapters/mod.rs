pub mod content_http;
pub mod diagnostics;
pub mod progress_http;

pub use content_http::HttpContentSource;
pub use diagnostics::TracingDiagnostics;
pub use progress_http::HttpProgressTracker;
