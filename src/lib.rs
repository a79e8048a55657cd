pub mod dom;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod net;

pub use dom::range::ResolvedRange;
pub use dom::{DocumentTree, DomTree, NodePath};
pub use engine::{Anchor, AnchorConfig, AnchorEngine};
pub use error::{AnchorError, DirectiveError};
pub use fragment::{SurroundingContext, TextDirective, TextMatch};
