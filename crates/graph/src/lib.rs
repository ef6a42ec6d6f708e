//! # Dependency Graph
//!
//! File-level dependency graph for Java projects, built by syntactic symbol
//! resolution over project-local sources.
//!
//! ## Architecture
//!
//! ```text
//! source text
//!     │
//!     ├──> JavaSyntax (tree-sitter-java)
//!     │      ├─ package + top-level types  ──> DeclarationIndex (FQN → file)
//!     │      └─ Reference visitor          ──> UsageRecord
//!     │
//!     ├──> DependencyResolver (shared, read-only index)
//!     │      ├─ 1. explicit imports
//!     │      ├─ 2. wildcard imports
//!     │      ├─ 3. same package
//!     │      └─ 4. suffix match (index order)
//!     │
//!     └──> DependencyGraph (petgraph)
//!            └─ Edges: file → file, labelled with the resolving phase
//! ```
//!
//! ```
//! use depchunk_graph::GraphBuilder;
//! use std::path::Path;
//!
//! let mut builder = GraphBuilder::new().unwrap();
//! builder.add_source("p/A.java", "package p; class A extends B {}");
//! builder.add_source("p/B.java", "package p; class B {}");
//! let project = builder.build();
//!
//! let deps = project.graph.dependencies(Path::new("p/A.java")).unwrap();
//! assert_eq!(deps, vec![Path::new("p/B.java")]);
//! ```

mod builder;
mod error;
mod graph;
mod index;
mod resolver;
mod syntax;
mod types;
mod usage;

pub use builder::{GraphBuilder, ResolvedProject};
pub use error::{GraphError, Result};
pub use graph::DependencyGraph;
pub use index::{DeclarationIndex, DeclarationIndexBuilder, FqnCollision};
pub use resolver::{DependencyResolver, Resolution, ResolvedName};
pub use syntax::{CompilationUnit, ImportDecl, JavaSyntax, Reference};
pub use types::{qualify, DependencyEdge, ParseFailure, ResolutionPhase, SourceFile};
pub use usage::UsageRecord;
