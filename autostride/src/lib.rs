pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    analyze_file, apply_overrides, load_config, output_path_for, render_classes, render_rules,
    summary_line,
};
