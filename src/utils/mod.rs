//! JSON manipulation helpers shared across the payload-template processor,
//! the `ResultPath` merge step, and the mock engine's partial-match rule.

pub mod json_ext;
