//! Inbound adapters that translate user input into domain calls while keeping
//! terminal details at the edge.
//!
//! The command-line front end lives under [`cli`].

pub mod cli;
