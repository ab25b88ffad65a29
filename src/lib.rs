//! # Articles API
//!
//! A small HTTP service for storing articles (a title and a body), with two
//! interchangeable storage backends.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────┐
//!   HTTP ───────▶│    server    │◀──── seed file (bulk load)
//!                └──────┬───────┘
//!                       │ Arc<dyn ArticleStore>
//!            ┌──────────┴──────────┐
//!            ▼                     ▼
//!      ┌───────────┐        ┌─────────────┐
//!      │ FileStore │        │ SqliteStore │
//!      │ JSON file │        │  sqlx pool  │
//!      └───────────┘        └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export DATABASE_URL=sqlite:./data/articles.sqlite
//! articles init                 # create the articles table
//! articles load                 # bulk-load the seed file
//! articles serve                # start the HTTP server
//! articles scrub data/articles_5.json   # strip the newsletter footer
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and `DATABASE_URL` resolution |
//! | [`models`] | Article types |
//! | [`error`] | Storage error type |
//! | [`store`] | Backend trait plus file and SQLite implementations |
//! | [`db`] | Connection pool |
//! | [`migrate`] | Table creation |
//! | [`jsonfile`] | JSON file decoding and atomic rewrites |
//! | [`seed`] | Bulk loader |
//! | [`scrub`] | Boilerplate removal from the JSON file |
//! | [`server`] | HTTP API |

pub mod config;
pub mod db;
pub mod error;
pub mod jsonfile;
pub mod migrate;
pub mod models;
pub mod scrub;
pub mod seed;
pub mod server;
pub mod store;
