//! libdfs — client-side file chunking and reconstruction.
//!
//! Mirrors what the original system's `client.py` did inline: split a file
//! into fixed-size chunks, ask the coordinator for a placement plan, push
//! chunks to their assigned hosts, and — on the way back — fetch the
//! current chunk map and reassemble chunks in index order. None of this is
//! part of the coordinator/storage-node wire contract; it's a convention
//! the client applies on top of it.

pub mod checksum;
pub mod client;

pub use client::{DfsClient, UploadSummary};
