//! # placehub-domain
//!
//! Pure domain model for the placehub places API.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **Place** record (a named location with city and state)
//! - Define the typed, already-checked inputs for creating and updating places
//!   ([`place::NewPlace`], [`place::PlaceChanges`])
//! - Derive URL-safe **slugs** from human-readable names
//! - Describe **pagination** requests and pages of results
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod page;
pub mod place;
pub mod slug;
