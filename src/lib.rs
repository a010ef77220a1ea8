//! # legal-mcp
//!
//! Semantic search over German federal law (gesetze-im-internet.de).
//!
//! Statutory sections are imported from the official XML archives, embedded
//! with an Ollama model, and stored in Postgres with pgvector. Search embeds
//! the query once and ranks stored sections by cosine distance. Results are
//! exposed via a CLI (`legal-mcp`), an HTTP API, and an MCP Streamable HTTP
//! bridge for AI tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────┐   ┌────────────┐
//! │ gesetze-im-      │──▶│   Import    │──▶│  Postgres  │
//! │ internet.de XML  │   │ Parse+Embed │   │  pgvector  │
//! └──────────────────┘   └──────┬──────┘   └─────┬──────┘
//!                               │                │
//!                        ┌──────▼──────┐   ┌─────▼──────┐
//!                        │   Ollama    │   │  HTTP API  │
//!                        │ /api/embed  │   │   (axum)   │
//!                        └─────────────┘   └─────┬──────┘
//!                                                │
//!                                   ┌────────────┤
//!                                   ▼            ▼
//!                             ┌──────────┐  ┌──────────┐
//!                             │   CLI    │  │   MCP    │
//!                             └──────────┘  └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! legal-mcp init                # create schema
//! legal-mcp serve api           # start HTTP API
//! legal-mcp import bgb          # import a legal code
//! legal-mcp search "Schadensersatz bei Vertragsverletzung"
//! legal-mcp serve mcp           # start MCP bridge
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML + environment configuration |
//! | [`error`] | Error taxonomy and HTTP mapping |
//! | [`models`] | Request/response types and validation |
//! | [`embedding`] | Ollama embedding client |
//! | [`store`] | pgvector-backed persistence |
//! | [`catalog`] | gesetze-im-internet catalog (gii-toc.xml) |
//! | [`import`] | Archive download, norm parsing, batch embedding |
//! | [`server`] | HTTP API (axum) with CORS |
//! | [`client`] | HTTP client used by CLI and MCP bridge |
//! | [`mcp`] | MCP Streamable HTTP bridge |
//! | [`db`] | Database connection |
//! | [`migrate`] | Versioned schema migrations |

pub mod catalog;
pub mod client;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod get;
pub mod import;
pub mod list;
pub mod mcp;
pub mod migrate;
pub mod models;
pub mod output;
pub mod search;
pub mod server;
pub mod store;
