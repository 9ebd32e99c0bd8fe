//! roadmapgen: ask a local Ollama model for a learning roadmap and parse the
//! JSON answer into a [`RoadmapNode`] tree.
//!
//! ```no_run
//! use std::sync::Arc;
//! use roadmapgen::{RoadmapService, ReqwestTransport, Settings};
//!
//! let settings = Arc::new(Settings::default());
//! let transport = Arc::new(ReqwestTransport::new(settings.request_timeout())?);
//! let service = RoadmapService::new(settings, transport);
//! let roadmap = service.generate_roadmap("Learn Rust in three months")?;
//! println!("{roadmap}");
//! # Ok::<(), roadmapgen::ApplicationError>(())
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{ApplicationError, ApplicationResult, RoadmapService};
pub use config::Settings;
pub use domain::{
    extract_answer, parse_tree, parse_tree_with, ChildrenPolicy, GenerateRequest, PromptBuilder,
    RoadmapNode, SchemaError,
};
pub use infrastructure::traits::{HttpResponse, HttpTransport, ReqwestTransport};
