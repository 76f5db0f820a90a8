//! Combinator-based incremental parser (spec §4.3): parse functions build
//! a persistent computation tree; after a point edit, [`reparse_after_edit`]
//! reuses untouched sub-computations instead of reparsing the document from
//! scratch.

mod combinators;
mod cursor;
mod edit;
mod token;
mod tree;

pub use combinators::{map, map_with_input, or, recover_from_failure, then, then_maybe, then_not, ParseFn, ParseOutcome};
pub use cursor::TrackingCursor;
pub use edit::{parse_all, reparse_after_edit, Edit};
pub use token::ComputedToken;
pub use tree::{find_reusable, join, tokens_intersecting_range, Computation, ComputationTokenQuery};
