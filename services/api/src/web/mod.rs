pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible
// to the binary that builds the web server router.
pub use middleware::require_viewer;
pub use rest::{
    calendar_handler, download_handler, export_csv_handler, preview_handler, toggle_done_handler,
    toggle_week_handler,
};
