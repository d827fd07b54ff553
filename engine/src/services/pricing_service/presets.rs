// Preset RPC handlers. Snapshots are taken from, and loaded into, the
// caller's workspace.

use super::blend::blend_response;
use super::helpers::{from_proto_kind, parse_id, to_proto_preset};
use super::ledger::ledger_response;
use super::{MyPricingEngine, Workspace};
use crate::blend::Blend;
use crate::gateways::PresetUpdate;
use crate::ledger::Ledger;
use crate::services::proto::{
    DeletePresetResponse, ListPresetsRequest, ListPresetsResponse, LoadPresetResponse, PresetRequest, PresetResponse,
    SavePresetRequest, UpdatePresetRequest,
};
use shared::models::{PresetKind, PresetSnapshot, UserId};
use tonic::{Response, Status};

fn snapshot_of(workspace: &Workspace, kind: PresetKind) -> PresetSnapshot {
    match kind {
        PresetKind::Ledger => PresetSnapshot::Ledger(workspace.ledger.state().clone()),
        PresetKind::Blend => PresetSnapshot::Blend {
            products: workspace.blend.products().to_vec(),
        },
    }
}

pub async fn handle_list_presets(
    engine: &MyPricingEngine,
    user: &UserId,
    req: ListPresetsRequest,
) -> Result<Response<ListPresetsResponse>, Status> {
    let kind = from_proto_kind(req.kind)?;
    let presets = engine.presets.list(user, kind).await?;
    Ok(Response::new(ListPresetsResponse {
        presets: presets.iter().map(to_proto_preset).collect(),
    }))
}

pub async fn handle_save_preset(
    engine: &MyPricingEngine,
    user: &UserId,
    req: SavePresetRequest,
) -> Result<Response<PresetResponse>, Status> {
    let kind = from_proto_kind(req.kind)?;
    let snapshot = engine.with_workspace(user, |workspace| snapshot_of(workspace, kind)).await;
    let preset = engine.presets.create(user, &req.name, snapshot).await?;
    Ok(Response::new(PresetResponse {
        preset: Some(to_proto_preset(&preset)),
    }))
}

pub async fn handle_update_preset(
    engine: &MyPricingEngine,
    user: &UserId,
    req: UpdatePresetRequest,
) -> Result<Response<PresetResponse>, Status> {
    let id = parse_id(&req.id, "preset")?;
    let snapshot = if req.replace_snapshot {
        let kind = engine.presets.get(user, id).await?.snapshot.kind();
        Some(engine.with_workspace(user, |workspace| snapshot_of(workspace, kind)).await)
    } else {
        None
    };
    let update = PresetUpdate {
        name: Some(req.name).filter(|name| !name.is_empty()),
        snapshot,
    };
    let preset = engine.presets.update(user, id, update).await?;
    Ok(Response::new(PresetResponse {
        preset: Some(to_proto_preset(&preset)),
    }))
}

pub async fn handle_delete_preset(
    engine: &MyPricingEngine,
    user: &UserId,
    req: PresetRequest,
) -> Result<Response<DeletePresetResponse>, Status> {
    let id = parse_id(&req.id, "preset")?;
    engine.presets.delete(user, id).await?;
    Ok(Response::new(DeletePresetResponse { deleted: true }))
}

pub async fn handle_load_preset(
    engine: &MyPricingEngine,
    user: &UserId,
    req: PresetRequest,
) -> Result<Response<LoadPresetResponse>, Status> {
    let id = parse_id(&req.id, "preset")?;
    let preset = engine.presets.get(user, id).await?;
    let summary = Some(to_proto_preset(&preset));
    let calculator = &engine.calculator;

    let response = engine
        .with_workspace(user, |workspace| match preset.snapshot {
            PresetSnapshot::Ledger(state) => {
                workspace.ledger = Ledger::from_state(state, calculator);
                LoadPresetResponse {
                    preset: summary,
                    ledger: ledger_response(&workspace.ledger).ledger,
                    blend: None,
                }
            }
            PresetSnapshot::Blend { products } => {
                workspace.blend = Blend::from_products(products);
                LoadPresetResponse {
                    preset: summary,
                    ledger: None,
                    blend: blend_response(&workspace.blend).blend,
                }
            }
        })
        .await;
    tracing::info!(user = %user, preset_id = %id, "Loaded preset");
    Ok(Response::new(response))
}
