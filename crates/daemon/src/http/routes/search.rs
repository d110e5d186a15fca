// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::State;
use axum::{Extension, Json};
use indexer_core::Requester;
use indexer_engine::SearchOptions;
use indexer_wire::{SearchRequest, SearchResponse, SearchResult};

use crate::http::error::ApiResult;
use crate::http::state::AppState;

/// `POST /search`.
pub async fn search(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Json(body): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let options = SearchOptions {
        top_k: body.top_k as i64,
        min_score: body.min_score,
        use_hybrid: body.use_hybrid,
        alpha: body.alpha,
    };
    let hits = state.daemon.pipeline.search(&body.query, &requester, options).await?;

    let results = hits
        .into_iter()
        .map(|hit| SearchResult {
            chunk_id: hit.chunk.id.unwrap_or_default(),
            document_id: hit.chunk.document_id.as_str().to_string(),
            source_uri: hit.chunk.source_uri,
            text: hit.chunk.text,
            score: hit.score,
            metadata: hit.chunk.metadata,
        })
        .collect();

    Ok(Json(SearchResponse { results }))
}
