//! Analysis flows over extracted resumes and self-reported signals.
//!
//! Each flow degrades per upstream step: a failed model call is replaced by the
//! matching canned result from `fallback` and the response carries `fallback: true`.

pub mod career;
pub mod competitiveness;
pub mod fallback;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod quantizer;
pub mod resume;
pub mod roadmap;
