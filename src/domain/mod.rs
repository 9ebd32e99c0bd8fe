//! Domain layer: roadmap tree, parsing and prompt construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod node;
pub mod parser;
pub mod prompt;

pub use arena::{NodeData, RoadmapArena};
pub use error::SchemaError;
pub use node::RoadmapNode;
pub use parser::{
    extract_answer, parse_tree, parse_tree_with, strip_code_fence, ChildrenPolicy, ParseResult,
    MAX_ROADMAP_DEPTH,
};
pub use prompt::{GenerateRequest, PromptBuilder, ROADMAP_INSTRUCTIONS};
