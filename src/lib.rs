//! # rust_profile_db - Employee Profile CRUD over MongoDB
//!
//! A small interactive tool that manages an "employee profile" spread across
//! four MongoDB collections, joined by employee id:
//! - **Typed Store Facade**: All reads and writes go through [`store::ProfileStore`]
//! - **Cascade Writes**: Create/delete fan out across four collections, best effort
//! - **Server-Side Join**: The full profile view is a three-stage `$lookup` pipeline
//! - **Interactive Menu**: Numbered menu on stdin mapped to the store operations
//!
//! ## Architecture Overview
//!
//! The binary consists of three layers:
//!
//! 1. **Menu Layer** (`menu` module): Line-oriented prompts and result formatting
//! 2. **Store Layer** (`store` module): Typed records, requests, and the four operations
//! 3. **Config Layer** (`config` module): Connection URI resolution and timeouts
//!
//! ## Key Components
//!
//! - **ProfileStore**: Facade holding the client handle, opened once and passed down
//! - **CascadeReport**: Per-collection outcomes of the fan-out writes, never swallowed
//! - **LookupStage**: Typed builder for the `$lookup` join stages
//!
//! ## Data Model
//!
//! One `Employee` record plus zero-or-more `Department`/`Developer`/`Tester`
//! records sharing the same employee id. The four collections are written
//! independently with no transaction spanning them; a partial profile after a
//! failure is reported, not rolled back.
//!
//! ## Usage Example
//!
//! ```bash
//! # Connect using MONGO_URI from the environment or a .env file
//! MONGO_URI=mongodb://localhost:27017 cargo run -- --database unified_demo
//!
//! # Reset the collections to the bundled sample data first
//! cargo run -- --database unified_demo --seed
//! ```

/// Connection settings: URI resolution, database name, timeouts
pub mod config;

/// Interactive numbered menu over stdin/stdout
pub mod menu;

/// Typed ProfileStore facade over the MongoDB driver
pub mod store;
