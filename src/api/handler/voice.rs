use std::sync::Arc;

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::api::middleware::verify_token::AuthUser;
use crate::api::server::{AppState, JsonBody, JsonResult};
use crate::assistant;
use crate::constants::VOICE_HISTORY_LIMIT;
use crate::db::prelude::{Repository, VoiceInteraction, VoiceRepository};

#[derive(Debug, Deserialize)]
pub struct VoiceMessage {
    pub message: String,
    /// Accepted for client compatibility; replies don't vary by agent.
    #[serde(default)]
    pub agent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub response: String,
    /// Base64 audio, or null when speech synthesis is unavailable
    pub audio_content: Option<String>,
}

#[instrument(skip(state, body), fields(user_id = %user.id, agent_id = ?body.agent_id))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<VoiceMessage>,
) -> JsonResult<VoiceResponse> {
    let reply = assistant::reply_to(&body.message);
    let audio_content = state.speech.synthesize(reply).await;

    VoiceRepository::new(state.db_pool)
        .insert(user.id, &body.message, reply)
        .await?;

    Ok(Json(VoiceResponse {
        response: reply.to_string(),
        audio_content,
    }))
}

#[instrument(skip(state), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> JsonResult<Vec<VoiceInteraction>> {
    let interactions = VoiceRepository::new(state.db_pool)
        .recent_for_user(user.id, VOICE_HISTORY_LIMIT)
        .await?;

    Ok(Json(interactions))
}
