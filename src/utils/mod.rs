//! Utility modules for the Marquee API.
//!
//! - [`background`]: Tracked background tasks awaited on shutdown
//! - [`email`]: Account notification emails over SMTP
//! - [`params`]: Path id extractor and query-string readers
//! - [`password`]: bcrypt hashing off the async runtime

pub mod background;
pub mod email;
pub mod params;
pub mod password;
