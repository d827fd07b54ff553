// engine/src/services/pricing_service/mod.rs
// MyPricingEngine owns one workspace per authenticated user and dispatches
// each RPC to its handler module.

use super::proto::{
    AddConceptRequest, BlendEditRequest, BlendRequest, BlendResponse, ConceptRequest, DeletePresetResponse,
    ExportLedgerResponse, LedgerEditRequest, LedgerRequest, LedgerResponse, ListPresetsRequest, ListPresetsResponse,
    LoadPresetResponse, MoveRequest, PresetRequest, PresetResponse, ProductRequest, ReferencePricesRequest,
    ReferencePricesResponse, RenameConceptRequest, SavePresetRequest, UpdatePresetRequest,
};
use super::PricingEngine;
use crate::blend::Blend;
use crate::config::CalculatorSettings;
use crate::data::market_data::MarketDataStore;
use crate::gateways::{AuthGateway, PresetGateway};
use crate::ledger::Ledger;
use shared::models::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::{Request, Response, Status};

pub mod blend;
pub mod helpers;
pub mod ledger;
pub mod presets;
pub mod reference_prices;

/// One user's calculator state.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub ledger: Ledger,
    pub blend: Blend,
}

impl Workspace {
    pub fn new(calculator: &CalculatorSettings) -> Self {
        Workspace {
            ledger: Ledger::new(calculator),
            blend: Blend::new(),
        }
    }
}

pub struct MyPricingEngine {
    workspaces: Arc<RwLock<HashMap<UserId, Workspace>>>,
    presets: Arc<dyn PresetGateway>,
    auth: Arc<dyn AuthGateway>,
    market_data_store: Arc<RwLock<MarketDataStore>>,
    calculator: CalculatorSettings,
}

impl MyPricingEngine {
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        presets: Arc<dyn PresetGateway>,
        market_data_store: Arc<RwLock<MarketDataStore>>,
        calculator: CalculatorSettings,
    ) -> Self {
        MyPricingEngine {
            workspaces: Arc::new(RwLock::new(HashMap::new())),
            presets,
            auth,
            market_data_store,
            calculator,
        }
    }

    async fn authenticate<T>(&self, request: &Request<T>) -> Result<UserId, Status> {
        helpers::authenticate(self.auth.as_ref(), request).await
    }

    /// Runs `f` against the user's workspace, creating it on first use.
    pub(crate) async fn with_workspace<R>(&self, user: &UserId, f: impl FnOnce(&mut Workspace) -> R) -> R {
        let mut workspaces = self.workspaces.write().await;
        let workspace = workspaces.entry(user.clone()).or_insert_with(|| {
            tracing::info!(user = %user, "Creating workspace");
            Workspace::new(&self.calculator)
        });
        f(workspace)
    }
}

#[tonic::async_trait]
impl PricingEngine for MyPricingEngine {
    async fn get_ledger(&self, request: Request<LedgerRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_get_ledger(self, &user).await
    }

    async fn commit_ledger_edit(&self, request: Request<LedgerEditRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        let req_payload = request.into_inner();
        tracing::debug!(user = %user, field = req_payload.field, raw = %req_payload.raw, "Received CommitLedgerEdit");
        ledger::handle_commit_edit(self, &user, req_payload).await
    }

    async fn add_concept(&self, request: Request<AddConceptRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_add_concept(self, &user, request.into_inner()).await
    }

    async fn remove_concept(&self, request: Request<ConceptRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        let req_payload = request.into_inner();
        tracing::debug!(user = %user, concept_id = %req_payload.id, "Received RemoveConcept");
        ledger::handle_remove_concept(self, &user, req_payload).await
    }

    async fn rename_concept(&self, request: Request<RenameConceptRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_rename_concept(self, &user, request.into_inner()).await
    }

    async fn move_concept(&self, request: Request<MoveRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_move_concept(self, &user, request.into_inner()).await
    }

    async fn toggle_decimal_places(&self, request: Request<LedgerRequest>) -> Result<Response<LedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_toggle_decimal_places(self, &user).await
    }

    async fn export_ledger(&self, request: Request<LedgerRequest>) -> Result<Response<ExportLedgerResponse>, Status> {
        let user = self.authenticate(&request).await?;
        ledger::handle_export_ledger(self, &user).await
    }

    async fn get_blend(&self, request: Request<BlendRequest>) -> Result<Response<BlendResponse>, Status> {
        let user = self.authenticate(&request).await?;
        blend::handle_get_blend(self, &user).await
    }

    async fn commit_blend_edit(&self, request: Request<BlendEditRequest>) -> Result<Response<BlendResponse>, Status> {
        let user = self.authenticate(&request).await?;
        let req_payload = request.into_inner();
        tracing::debug!(user = %user, product_id = %req_payload.product_id, "Received CommitBlendEdit");
        blend::handle_commit_edit(self, &user, req_payload).await
    }

    async fn add_blend_product(&self, request: Request<BlendRequest>) -> Result<Response<BlendResponse>, Status> {
        let user = self.authenticate(&request).await?;
        blend::handle_add_product(self, &user).await
    }

    async fn remove_blend_product(&self, request: Request<ProductRequest>) -> Result<Response<BlendResponse>, Status> {
        let user = self.authenticate(&request).await?;
        blend::handle_remove_product(self, &user, request.into_inner()).await
    }

    async fn move_blend_product(&self, request: Request<MoveRequest>) -> Result<Response<BlendResponse>, Status> {
        let user = self.authenticate(&request).await?;
        blend::handle_move_product(self, &user, request.into_inner()).await
    }

    async fn list_presets(&self, request: Request<ListPresetsRequest>) -> Result<Response<ListPresetsResponse>, Status> {
        let user = self.authenticate(&request).await?;
        presets::handle_list_presets(self, &user, request.into_inner()).await
    }

    async fn save_preset(&self, request: Request<SavePresetRequest>) -> Result<Response<PresetResponse>, Status> {
        let user = self.authenticate(&request).await?;
        let req_payload = request.into_inner();
        tracing::info!(user = %user, name = %req_payload.name, kind = req_payload.kind, "Received SavePreset");
        presets::handle_save_preset(self, &user, req_payload).await
    }

    async fn update_preset(&self, request: Request<UpdatePresetRequest>) -> Result<Response<PresetResponse>, Status> {
        let user = self.authenticate(&request).await?;
        presets::handle_update_preset(self, &user, request.into_inner()).await
    }

    async fn delete_preset(&self, request: Request<PresetRequest>) -> Result<Response<DeletePresetResponse>, Status> {
        let user = self.authenticate(&request).await?;
        presets::handle_delete_preset(self, &user, request.into_inner()).await
    }

    async fn load_preset(&self, request: Request<PresetRequest>) -> Result<Response<LoadPresetResponse>, Status> {
        let user = self.authenticate(&request).await?;
        presets::handle_load_preset(self, &user, request.into_inner()).await
    }

    async fn get_reference_prices(
        &self,
        request: Request<ReferencePricesRequest>,
    ) -> Result<Response<ReferencePricesResponse>, Status> {
        self.authenticate(&request).await?;
        reference_prices::handle_get_reference_prices(self).await
    }
}
