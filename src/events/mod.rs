//! # Events Module
//!
//! Progress events emitted while a pipeline runs.
//!
//! ## Design
//! The executor emits events through a channel, so any front end (CLI,
//! tests, a log forwarder) can subscribe without the core knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver {
//!         if let Event::Stage(StageEvent::Completed(report)) = event {
//!             println!("{report}");
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(items, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
