// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! indexer-engine: the Indexer Pipeline and Scan Engine, plus the
//! Embedding Service and document-processor seams they run behind.

pub mod embedding;
pub mod pipeline;
pub mod processor;
pub mod scan;

pub use embedding::{EmbeddingService, HashingEmbeddingService};
pub use pipeline::{
    BulkDeleteOutcome, BulkDeletePreview, IndexOptions, IndexOutcome, IndexerPipeline, SearchHit,
    SearchOptions,
};
pub use processor::{
    DefaultFileTypePolicy, FileTypeAction, FileTypePolicy, PlainTextProcessor, Processor,
    ProcessedDocument,
};
pub use scan::{DryRunOutcome, ScanCounters, ScanEngine, ScanRequest, ScanResult};
