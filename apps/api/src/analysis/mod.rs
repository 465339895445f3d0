// Analysis extraction engine.
// Normalizes provider payloads, then pulls scores and bulleted sections out of the
// free-form evaluation text. Everything here except `handlers` and the timed animation
// driver is synchronous and pure.

pub mod animator;
pub mod extractor;
pub mod handlers;
pub mod normalizer;
pub mod payload;
pub mod report;
pub mod score;
pub mod sections;
