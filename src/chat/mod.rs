// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat layer: conversation state and transcripts

pub mod record;
pub mod session;

pub use record::{ChatRecord, MemoryTranscripts, TranscriptStore};
pub use session::{ChatSession, PreparedRequest};
