// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! AI provider layer
//!
//! The provider contract, its HTTP implementations, and the registry that
//! resolves providers by name.

pub mod message;
pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod registry;

pub use message::{ChatMessage, Role};
pub use provider::{stream_with_callback, AiProvider, ChunkStream, ProviderInfo};
pub use registry::{ProviderDescriptor, ProviderRegistry, KNOWN_PROVIDERS};
