//! These models represent the events produced by a multi-agent conversation run
//!
//! The conversation runtime emits a loosely typed stream: messages, tool call requests,
//! tool call results, memory lookups and a terminal task result. Its wire form is JSON with a
//! `type` discriminator. We convert each value into the closed [`event::Event`] enum as soon as
//! it arrives; anything that does not fit a known shape is kept as [`event::RawEvent`] so the
//! renderers can still show it.
pub mod event;
pub mod tool;
