//! GitHub / GitHub Enterprise search and pull request CLI.
//!
//! The library backs two binaries: `ghsearch` (paginated search against the
//! repository, code, and commit search endpoints, with filter/sort/group
//! reports) and `ghpr` (one-shot pull request mutations). Data flows
//! strictly downward: settings resolution → request building → pagination →
//! normalization → transforms → report assembly.

pub mod api;
pub mod config;
pub mod normalize;
pub mod pr;
pub mod report;
pub mod search;
pub mod transform;
