pub mod constants;
pub mod filename;
pub mod numeric;
pub mod progress;

pub use constants::*;
pub use filename::{archive_output_dir, generate_default_output_dir, table_path};
pub use numeric::parse_decimal;
pub use progress::ProgressReporter;
