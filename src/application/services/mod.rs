//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (HttpTransport, FileSystem)
//! but are themselves concrete structs, not traits.

mod roadmap;

pub use roadmap::RoadmapService;
