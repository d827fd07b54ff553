// Authentication and conversions between domain types and protobuf messages.

use crate::blend::{Blend, BlendField};
use crate::error::EngineError;
use crate::gateways::AuthGateway;
use crate::ledger::{ConceptView, DisplayRow, EditTarget, LedgerView};
use crate::services::proto;
use chrono::{DateTime, Utc};
use shared::models::{
    Instrument, InstrumentQuote, Preset, PresetKind, PricePoint, ReferencePrices, Representation, RepresentationSet,
    UserId,
};
use tonic::{Request, Status};
use uuid::Uuid;

/// The token from `authorization: Bearer <token>`, or "" when absent.
pub fn bearer_token<T>(request: &Request<T>) -> &str {
    request
        .metadata()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or("")
}

pub async fn authenticate<T>(auth: &dyn AuthGateway, request: &Request<T>) -> Result<UserId, Status> {
    auth.authenticate(bearer_token(request)).await.map_err(|e| {
        tracing::warn!(error = %e, "Rejected unauthenticated request");
        Status::from(e)
    })
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, EngineError> {
    Uuid::parse_str(raw.trim()).map_err(|e| EngineError::InvalidArgument(format!("Invalid {} id '{}': {}", what, raw, e)))
}

pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_proto_representation(value: i32) -> Result<Representation, EngineError> {
    let representation = proto::Representation::try_from(value)
        .map_err(|_| EngineError::InvalidArgument(format!("Unknown representation {}", value)))?;
    Ok(match representation {
        proto::Representation::MxnPerLiter => Representation::MxnPerLiter,
        proto::Representation::MxnTotal => Representation::MxnTotal,
        proto::Representation::UsdTotal => Representation::UsdTotal,
        proto::Representation::UsdPerGallon => Representation::UsdPerGallon,
    })
}

pub fn to_proto_representation(representation: Representation) -> i32 {
    let proto_representation = match representation {
        Representation::MxnPerLiter => proto::Representation::MxnPerLiter,
        Representation::MxnTotal => proto::Representation::MxnTotal,
        Representation::UsdTotal => proto::Representation::UsdTotal,
        Representation::UsdPerGallon => proto::Representation::UsdPerGallon,
    };
    proto_representation as i32
}

pub fn to_edit_target(field: i32, concept_id: &str) -> Result<EditTarget, EngineError> {
    let field = proto::LedgerField::try_from(field)
        .map_err(|_| EngineError::InvalidArgument(format!("Unknown ledger field {}", field)))?;
    Ok(match field {
        proto::LedgerField::Concept => EditTarget::Concept(parse_id(concept_id, "concept")?),
        proto::LedgerField::BasePrice => EditTarget::BasePrice,
        proto::LedgerField::Margin => EditTarget::Margin,
        proto::LedgerField::Gallons => EditTarget::Gallons,
        proto::LedgerField::Liters => EditTarget::Liters,
        proto::LedgerField::ExchangeRate => EditTarget::ExchangeRate,
    })
}

pub fn to_blend_field(field: i32) -> Result<BlendField, EngineError> {
    let field = proto::BlendField::try_from(field)
        .map_err(|_| EngineError::InvalidArgument(format!("Unknown blend field {}", field)))?;
    Ok(match field {
        proto::BlendField::Name => BlendField::Name,
        proto::BlendField::Price => BlendField::Price,
        proto::BlendField::Percentage => BlendField::Percentage,
    })
}

pub fn from_proto_kind(value: i32) -> Result<PresetKind, EngineError> {
    match proto::PresetKind::try_from(value) {
        Ok(proto::PresetKind::Ledger) => Ok(PresetKind::Ledger),
        Ok(proto::PresetKind::Blend) => Ok(PresetKind::Blend),
        Err(_) => Err(EngineError::InvalidArgument(format!("Unknown preset kind {}", value))),
    }
}

pub fn to_proto_kind(kind: PresetKind) -> i32 {
    match kind {
        PresetKind::Ledger => proto::PresetKind::Ledger as i32,
        PresetKind::Blend => proto::PresetKind::Blend as i32,
    }
}

pub fn to_proto_values(set: &RepresentationSet) -> proto::Values {
    proto::Values {
        mxn_per_liter: set.mxn_per_liter,
        mxn_total: set.mxn_total,
        usd_total: set.usd_total,
        usd_per_gallon: set.usd_per_gallon,
    }
}

pub fn to_proto_display(row: &DisplayRow) -> proto::DisplayValues {
    proto::DisplayValues {
        mxn_per_liter: row.mxn_per_liter.clone(),
        mxn_total: row.mxn_total.clone(),
        usd_total: row.usd_total.clone(),
        usd_per_gallon: row.usd_per_gallon.clone(),
    }
}

fn to_proto_concept(concept: &ConceptView) -> proto::ConceptRow {
    proto::ConceptRow {
        id: concept.id.to_string(),
        name: concept.name.clone(),
        is_base: concept.is_base,
        input_type: to_proto_representation(concept.input_type),
        values: Some(to_proto_values(&concept.values)),
        display: Some(to_proto_display(&concept.display)),
    }
}

pub fn to_proto_ledger(view: &LedgerView) -> proto::LedgerView {
    proto::LedgerView {
        exchange_rate: view.exchange_rate,
        exchange_rate_display: view.exchange_rate_display.clone(),
        gallons: view.gallons,
        gallons_display: view.gallons_display.clone(),
        liters: view.liters,
        liters_display: view.liters_display.clone(),
        decimal_places: view.decimal_places.digits() as u32,
        concepts: view.concepts.iter().map(to_proto_concept).collect(),
        totals: Some(to_proto_values(&view.totals)),
        totals_display: Some(to_proto_display(&view.totals_display)),
        margin: Some(to_proto_values(&view.margin)),
        margin_input_type: to_proto_representation(view.margin_input_type),
        margin_display: Some(to_proto_display(&view.margin_display)),
        sale_price: Some(to_proto_values(&view.sale_price)),
        sale_price_display: Some(to_proto_display(&view.sale_price_display)),
    }
}

pub fn to_proto_blend(blend: &Blend) -> proto::BlendView {
    let summary = blend.summary();
    proto::BlendView {
        products: blend
            .products()
            .iter()
            .map(|p| proto::BlendProduct {
                id: p.id.to_string(),
                name: p.name.clone(),
                price: p.price,
                percentage: p.percentage,
            })
            .collect(),
        total_percentage: summary.total_percentage,
        valid: summary.valid,
        blended_price: summary.blended_price,
        warning: summary.warning.unwrap_or_default(),
    }
}

pub fn to_proto_preset(preset: &Preset) -> proto::PresetSummary {
    proto::PresetSummary {
        id: preset.id.to_string(),
        name: preset.name.clone(),
        kind: to_proto_kind(preset.snapshot.kind()),
        created_at: to_millis(preset.created_at),
        updated_at: to_millis(preset.updated_at),
    }
}

fn to_proto_point(point: &PricePoint) -> proto::PricePoint {
    proto::PricePoint {
        date: to_millis(point.date),
        price: point.price,
    }
}

pub fn to_proto_quote(instrument: Instrument, quote: &InstrumentQuote) -> proto::InstrumentQuote {
    proto::InstrumentQuote {
        instrument: instrument.key().to_string(),
        symbol: quote.symbol.clone(),
        price: quote.price,
        change: quote.change,
        change_percent: quote.change_percent,
        timestamp: to_millis(quote.timestamp),
        currency: quote.currency.clone(),
        historical: quote.historical.iter().map(to_proto_point).collect(),
    }
}

pub fn to_proto_quotes(prices: &ReferencePrices) -> Vec<proto::InstrumentQuote> {
    prices
        .quotes
        .iter()
        .map(|(instrument, quote)| to_proto_quote(*instrument, quote))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        let mut request = Request::new(());
        assert_eq!(bearer_token(&request), "");
        request.metadata_mut().insert("authorization", "Bearer abc123".parse().unwrap());
        assert_eq!(bearer_token(&request), "abc123");
        request.metadata_mut().insert("authorization", "Basic abc123".parse().unwrap());
        assert_eq!(bearer_token(&request), "");
    }

    #[test]
    fn test_representation_mapping_is_symmetric() {
        for representation in Representation::ALL {
            assert_eq!(
                from_proto_representation(to_proto_representation(representation)).unwrap(),
                representation
            );
        }
        assert!(matches!(from_proto_representation(42), Err(EngineError::InvalidArgument(_))));
    }

    #[test]
    fn test_concept_target_requires_valid_id() {
        let field = proto::LedgerField::Concept as i32;
        assert!(matches!(to_edit_target(field, "not-a-uuid"), Err(EngineError::InvalidArgument(_))));
        let id = Uuid::new_v4();
        assert_eq!(to_edit_target(field, &id.to_string()).unwrap(), EditTarget::Concept(id));
        assert_eq!(
            to_edit_target(proto::LedgerField::Liters as i32, "").unwrap(),
            EditTarget::Liters
        );
    }
}
