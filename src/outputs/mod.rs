//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: writes the export as a pretty-printed JSON file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── jugru_talks.json    # `jugru` and `jugru --with-logo`
//! └── ontiko_talks.json   # `ontiko`
//! ```

pub mod json;
