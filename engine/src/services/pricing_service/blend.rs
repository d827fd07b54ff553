// Blend RPC handlers.

use super::helpers::{parse_id, to_blend_field, to_proto_blend};
use super::MyPricingEngine;
use crate::blend::{Blend, BlendEdit, BlendEditOutcome};
use crate::error::EngineError;
use crate::services::proto::{BlendEditRequest, BlendResponse, MoveKind, MoveRequest, ProductRequest};
use shared::models::UserId;
use tonic::{Response, Status};

pub(super) fn blend_response(blend: &Blend) -> BlendResponse {
    BlendResponse {
        blend: Some(to_proto_blend(blend)),
        accepted: true,
        restored: String::new(),
        product_id: String::new(),
    }
}

pub async fn handle_get_blend(engine: &MyPricingEngine, user: &UserId) -> Result<Response<BlendResponse>, Status> {
    let response = engine.with_workspace(user, |workspace| blend_response(&workspace.blend)).await;
    Ok(Response::new(response))
}

pub async fn handle_commit_edit(
    engine: &MyPricingEngine,
    user: &UserId,
    req: BlendEditRequest,
) -> Result<Response<BlendResponse>, Status> {
    let edit = BlendEdit::new(parse_id(&req.product_id, "product")?, to_blend_field(req.field)?, req.raw);
    let response = engine
        .with_workspace(user, |workspace| {
            let response = match workspace.blend.commit_edit(&edit)? {
                BlendEditOutcome::Applied => blend_response(&workspace.blend),
                BlendEditOutcome::Rejected { restored } => {
                    tracing::warn!(user = %user, product_id = %edit.product_id, raw = %edit.raw, "Blend edit rejected");
                    BlendResponse {
                        accepted: false,
                        restored,
                        ..blend_response(&workspace.blend)
                    }
                }
            };
            Ok::<_, EngineError>(response)
        })
        .await?;
    Ok(Response::new(response))
}

pub async fn handle_add_product(engine: &MyPricingEngine, user: &UserId) -> Result<Response<BlendResponse>, Status> {
    let response = engine
        .with_workspace(user, |workspace| {
            let id = workspace.blend.add_product();
            BlendResponse {
                product_id: id.to_string(),
                ..blend_response(&workspace.blend)
            }
        })
        .await;
    Ok(Response::new(response))
}

pub async fn handle_remove_product(
    engine: &MyPricingEngine,
    user: &UserId,
    req: ProductRequest,
) -> Result<Response<BlendResponse>, Status> {
    let id = parse_id(&req.id, "product")?;
    let response = engine
        .with_workspace(user, |workspace| {
            workspace.blend.remove_product(id)?;
            Ok::<_, EngineError>(blend_response(&workspace.blend))
        })
        .await?;
    Ok(Response::new(response))
}

pub async fn handle_move_product(
    engine: &MyPricingEngine,
    user: &UserId,
    req: MoveRequest,
) -> Result<Response<BlendResponse>, Status> {
    let id = parse_id(&req.id, "product")?;
    let kind = MoveKind::try_from(req.kind)
        .map_err(|_| EngineError::InvalidArgument(format!("Unknown move kind {}", req.kind)))?;
    let response = engine
        .with_workspace(user, |workspace| {
            let blend = &mut workspace.blend;
            match kind {
                MoveKind::ToIndex => blend.move_to_index(id, req.target_index as usize),
                MoveKind::Up => blend.move_up(id),
                MoveKind::Down => blend.move_down(id),
            }?;
            Ok::<_, EngineError>(blend_response(blend))
        })
        .await?;
    Ok(Response::new(response))
}
