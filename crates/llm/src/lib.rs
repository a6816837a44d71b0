//! Completion capability for SciMentor.
//!
//! A provider-agnostic, text-in/text-out abstraction over language models.
//! Callers depend only on the [`LlmClient`] trait; concrete providers are
//! created through [`create_client`].
//!
//! # Providers
//! - **OpenAI**: legacy completions endpoint (default, `gpt-3.5-turbo-instruct`)
//! - **Ollama**: local LLM runtime
//! - **Scripted**: deterministic in-memory client for tests
//!
//! # Example
//! ```no_run
//! use scimentor_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("What is photosynthesis?", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, ProviderType};
pub use providers::{OllamaClient, OpenAiClient, ScriptedClient};
