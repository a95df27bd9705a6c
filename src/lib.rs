//! Route Metadata Compiler - Route registrations and diagnostics from endpoint declarations.
//!
//! This library compiles routing metadata out of declaratively-shaped Rust
//! types. It uses static code analysis to find endpoint, group, and validator
//! declarations, reads each type's `configure` procedure as data, checks the
//! result for conflicts, and synthesizes the registration source that wires
//! every conflict-free route into a router.
//!
//! # Declaration Shapes
//!
//! Three shapes are recognized, keyed by the implemented trait's name:
//!
//! ```ignore
//! impl Endpoint for CreateUser {
//!     type Request = CreateUserRequest;
//!     type Response = CreateUserResponse;
//!
//!     fn configure(route: RouteBuilder) -> RouteBuilder {
//!         route.post("/").in_group::<UsersGroup>().bind_body()
//!     }
//! }
//!
//! impl EndpointGroup for UsersGroup {
//!     fn configure(group: GroupBuilder) -> GroupBuilder {
//!         group.mount("/api/v1/users")
//!     }
//! }
//!
//! impl Validator for CreateUserValidator {
//!     type Target = CreateUserRequest;
//! }
//! ```
//!
//! The `configure` bodies are never executed. Their builder call chains are
//! pattern-matched for a fixed vocabulary (`get`, `post`, `mount`,
//! `in_group`, `bind_body`, `named`, `tagged`, and the rest), so a
//! declaration means exactly what it says no matter how the calls are
//! ordered or nested.
//!
//! # Architecture
//!
//! The library is organized into modules that mirror the compilation stages:
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`ast`] - Lowers `configure` bodies into a comparable expression tree
//! 4. [`detector`] - Classifies type declarations into capability shapes
//! 5. [`extractor`] - Pattern-matches call chains into raw route metadata
//! 6. [`resolver`] - Checks invariants and resolves cross-declaration references
//! 7. [`naming`] - Derives deterministic route symbols and tags
//! 8. [`diagnostics`] - The closed catalogue of structured findings
//! 9. [`codegen`] - Synthesizes the two generated registration procedures
//! 10. [`cache`] - Reuses per-file extractions and whole runs across edits
//! 11. [`pipeline`] - Ties the stages together behind one entry point
//! 12. [`serializer`] - Serializes the analysis report to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use routegen::cancel::CancelToken;
//! use routegen::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let pipeline = Pipeline::new();
//! let output = pipeline
//!     .run(Path::new("./my-api-project"), &CancelToken::new())
//!     .unwrap();
//!
//! for route in &output.resolved.endpoints {
//!     println!(
//!         "{} {} -> {}",
//!         route.verb.method_name(),
//!         route.effective_pattern,
//!         route.symbol
//!     );
//! }
//! for diagnostic in output.resolved.diagnostics.iter() {
//!     eprintln!("{}", diagnostic);
//! }
//!
//! // The synthesized registration source.
//! println!("{}", output.generated.combined());
//! ```
//!
//! Re-running the pipeline after an edit reuses every extraction whose file
//! did not change, and skips resolution entirely when no extraction changed
//! in value. A cancelled [`cancel::CancelToken`] aborts between declarations
//! with no partial output.
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod location;
pub mod ast;
pub mod detector;
pub mod extractor;
pub mod diagnostics;
pub mod naming;
pub mod resolver;
pub mod codegen;
pub mod cache;
pub mod cancel;
pub mod pipeline;
pub mod serializer;
pub mod error;
