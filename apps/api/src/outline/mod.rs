// Outline generation: topic (+ reference images) → paged outline.
// All provider calls go through llm_client via the TextGenerationClient trait.

pub mod generator;
pub mod handlers;
pub mod parser;
pub mod prompts;
