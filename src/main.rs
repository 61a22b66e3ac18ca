//! # signer CLI
//!
//! Command-line driver for the signer pipeline.
//!
//! ## Usage
//! ```bash
//! signer sign 0 1 1 2 3 5 8
//! signer sign --input items.txt --slow-delay-ms 10 --output json
//! ```

mod cli;

use signer_pipeline::Result;

fn main() -> Result<()> {
    signer_pipeline::init_tracing();
    cli::run()
}
