//! BioMCP
//!
//! A Model Context Protocol (MCP) server and CLI for biomedical APIs.
//! Enables LLM agents to search PubMed articles (PubTator3), clinical trials
//! (ClinicalTrials.gov) and genetic variants (MyVariant.info).
//!
//! # Features
//!
//! - **9 MCP Tools**: article, trial and variant search and retrieval
//! - **Cached**: raw response bodies cached on disk for a week, keyed by a
//!   SHA-256 of method, URL and canonical parameters
//! - **Readable**: any JSON result renders to deterministic Markdown
//! - **Resources**: usage notes and a research persona served as MCP resources
//! - **Health**: one-shot reachability report for every upstream endpoint
//!
//! # Example
//!
//! ```no_run
//! use biomcp::{config::Config, formatters::ResponseFormat, tools::ToolContext, variants};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = ToolContext::from_config(Config::from_env()?)?;
//!     let query = variants::VariantQuery::gene("BRAF");
//!     println!("{}", variants::search_variants(&ctx, &query, ResponseFormat::Markdown).await?);
//!     ctx.client.close().await;
//!     Ok(())
//! }
//! ```

pub mod articles;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod health;
pub mod models;
pub mod resources;
pub mod server;
pub mod tools;
pub mod trials;
pub mod variants;

pub use client::HttpClient;
pub use config::Config;
pub use error::{RequestError, ToolError};
