// Ledger RPC handlers.

use super::helpers::{from_proto_representation, parse_id, to_edit_target, to_proto_ledger};
use super::{MyPricingEngine, Workspace};
use crate::data::export::{ledger_csv_string, share_summary};
use crate::error::EngineError;
use crate::ledger::{EditOutcome, FieldEdit, Ledger, LedgerCommand};
use crate::services::proto::{
    AddConceptRequest, ConceptRequest, ExportLedgerResponse, LedgerEditRequest, LedgerResponse, MoveKind, MoveRequest,
    RenameConceptRequest,
};
use shared::models::UserId;
use tonic::{Response, Status};

pub(super) fn ledger_response(ledger: &Ledger) -> LedgerResponse {
    LedgerResponse {
        ledger: Some(to_proto_ledger(&ledger.render(None))),
        accepted: true,
        restored: String::new(),
        concept_id: String::new(),
    }
}

async fn apply_command(
    engine: &MyPricingEngine,
    user: &UserId,
    command: LedgerCommand,
) -> Result<Response<LedgerResponse>, Status> {
    let response = engine
        .with_workspace(user, |workspace: &mut Workspace| {
            workspace.ledger.apply(command)?;
            Ok::<_, EngineError>(ledger_response(&workspace.ledger))
        })
        .await?;
    Ok(Response::new(response))
}

pub async fn handle_get_ledger(engine: &MyPricingEngine, user: &UserId) -> Result<Response<LedgerResponse>, Status> {
    let response = engine.with_workspace(user, |workspace| ledger_response(&workspace.ledger)).await;
    Ok(Response::new(response))
}

pub async fn handle_commit_edit(
    engine: &MyPricingEngine,
    user: &UserId,
    req: LedgerEditRequest,
) -> Result<Response<LedgerResponse>, Status> {
    let target = to_edit_target(req.field, &req.concept_id)?;
    let representation = from_proto_representation(req.representation)?;
    let edit = FieldEdit::new(target, representation, req.raw);

    let response = engine
        .with_workspace(user, |workspace| {
            let outcome = workspace.ledger.commit_edit(&edit)?;
            let response = match outcome {
                EditOutcome::Applied { echo } => LedgerResponse {
                    ledger: Some(to_proto_ledger(&workspace.ledger.render(Some(&echo)))),
                    ..ledger_response(&workspace.ledger)
                },
                EditOutcome::Rejected { restored } => {
                    tracing::warn!(user = %user, field = ?edit.target, raw = %edit.raw, "Ledger edit rejected");
                    LedgerResponse {
                        accepted: false,
                        restored,
                        ..ledger_response(&workspace.ledger)
                    }
                }
            };
            Ok::<_, EngineError>(response)
        })
        .await?;
    Ok(Response::new(response))
}

pub async fn handle_add_concept(
    engine: &MyPricingEngine,
    user: &UserId,
    req: AddConceptRequest,
) -> Result<Response<LedgerResponse>, Status> {
    let name = if req.name.trim().is_empty() {
        engine.calculator.new_concept_name.clone()
    } else {
        req.name
    };
    let response = engine
        .with_workspace(user, |workspace| {
            let id = workspace.ledger.add_concept(name);
            LedgerResponse {
                concept_id: id.to_string(),
                ..ledger_response(&workspace.ledger)
            }
        })
        .await;
    Ok(Response::new(response))
}

pub async fn handle_remove_concept(
    engine: &MyPricingEngine,
    user: &UserId,
    req: ConceptRequest,
) -> Result<Response<LedgerResponse>, Status> {
    let id = parse_id(&req.id, "concept")?;
    apply_command(engine, user, LedgerCommand::RemoveConcept { id }).await
}

pub async fn handle_rename_concept(
    engine: &MyPricingEngine,
    user: &UserId,
    req: RenameConceptRequest,
) -> Result<Response<LedgerResponse>, Status> {
    let id = parse_id(&req.id, "concept")?;
    apply_command(engine, user, LedgerCommand::RenameConcept { id, name: req.name }).await
}

pub async fn handle_move_concept(
    engine: &MyPricingEngine,
    user: &UserId,
    req: MoveRequest,
) -> Result<Response<LedgerResponse>, Status> {
    let id = parse_id(&req.id, "concept")?;
    let command = match MoveKind::try_from(req.kind) {
        Ok(MoveKind::ToIndex) => LedgerCommand::MoveToIndex {
            id,
            index: req.target_index as usize,
        },
        Ok(MoveKind::Up) => LedgerCommand::MoveUp { id },
        Ok(MoveKind::Down) => LedgerCommand::MoveDown { id },
        Err(_) => return Err(EngineError::InvalidArgument(format!("Unknown move kind {}", req.kind)).into()),
    };
    apply_command(engine, user, command).await
}

pub async fn handle_toggle_decimal_places(
    engine: &MyPricingEngine,
    user: &UserId,
) -> Result<Response<LedgerResponse>, Status> {
    apply_command(engine, user, LedgerCommand::ToggleDecimalPlaces).await
}

pub async fn handle_export_ledger(
    engine: &MyPricingEngine,
    user: &UserId,
) -> Result<Response<ExportLedgerResponse>, Status> {
    let snapshot = engine.with_workspace(user, |workspace| workspace.ledger.snapshot()).await;
    let csv = ledger_csv_string(&snapshot)?;
    let snapshot_json = serde_json::to_string(&snapshot).map_err(EngineError::from)?;
    tracing::info!(user = %user, rows = snapshot.rows.len(), "Exported ledger");
    Ok(Response::new(ExportLedgerResponse {
        csv,
        share_text: share_summary(&snapshot),
        snapshot_json,
    }))
}
