// End-to-end behaviour of the pricing core through the public API.

use engine::blend::{Blend, BlendEdit, BlendField};
use engine::config::CalculatorSettings;
use engine::conversion::{PricingContext, LITERS_PER_GALLON};
use engine::data::export::{ledger_csv_string, share_summary};
use engine::ledger::{EditOutcome, EditTarget, FieldEdit, Ledger, LedgerCommand};
use shared::models::{LedgerState, PresetSnapshot, Representation};

fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} to be within {} of {}",
        actual,
        tolerance,
        expected
    );
}

fn commit(ledger: &mut Ledger, edit: FieldEdit) -> EditOutcome {
    ledger.commit_edit(&edit).unwrap()
}

fn quoted_ledger() -> Ledger {
    let mut ledger = Ledger::new(&CalculatorSettings::default());
    commit(&mut ledger, FieldEdit::unpriced(EditTarget::ExchangeRate, "17.1234"));
    commit(&mut ledger, FieldEdit::unpriced(EditTarget::Gallons, "8,000"));
    commit(&mut ledger, FieldEdit::new(EditTarget::BasePrice, Representation::UsdPerGallon, "2.35"));
    ledger
}

#[test]
fn every_row_is_internally_consistent() {
    let mut ledger = quoted_ledger();
    let freight = ledger.add_concept("Freight");
    let tax = ledger.add_concept("Tax");
    commit(&mut ledger, FieldEdit::new(EditTarget::Concept(freight), Representation::MxnTotal, "12,500"));
    commit(&mut ledger, FieldEdit::new(EditTarget::Concept(tax), Representation::MxnPerLiter, "0.85"));
    commit(&mut ledger, FieldEdit::new(EditTarget::Margin, Representation::UsdPerGallon, "0.12"));

    let ctx = ledger.context();
    let view = ledger.render(None);
    let rows = view
        .concepts
        .iter()
        .map(|c| c.values)
        .chain([view.totals, view.margin, view.sale_price]);
    for values in rows {
        for from in Representation::ALL {
            for to in Representation::ALL {
                assert_close(ctx.convert(values.get(from), from, to), values.get(to));
            }
        }
    }
}

#[test]
fn volume_edits_keep_gallons_and_liters_linked() {
    let mut ledger = quoted_ledger();
    commit(&mut ledger, FieldEdit::unpriced(EditTarget::Liters, "10,000"));
    assert_close(ledger.state().liters, 10_000.0);
    assert_close(ledger.state().gallons * LITERS_PER_GALLON, 10_000.0);

    // the base stays canonical in USD per gallon
    assert_close(ledger.base_values().usd_per_gallon, 2.35);
}

#[test]
fn unset_rate_and_volume_yield_zero_not_nan() {
    let ctx = PricingContext::new(0.0, 0.0);
    for from in Representation::ALL {
        for to in Representation::ALL {
            let converted = ctx.convert(123.0, from, to);
            assert!(converted.is_finite());
            if from != to {
                assert_eq!(converted, 0.0, "{:?} -> {:?}", from, to);
            }
        }
    }
}

#[test]
fn rejected_edits_leave_state_untouched() {
    let mut ledger = quoted_ledger();
    let before = ledger.state().clone();
    for raw in ["abc", "1.2.3", "12abc"] {
        let outcome = commit(&mut ledger, FieldEdit::new(EditTarget::BasePrice, Representation::UsdPerGallon, raw));
        assert_eq!(outcome, EditOutcome::Rejected { restored: "2.3500".to_string() });
    }
    assert_eq!(ledger.state(), &before);
}

#[test]
fn ledger_survives_preset_round_trip() {
    let mut ledger = quoted_ledger();
    let freight = ledger.add_concept("Freight");
    commit(&mut ledger, FieldEdit::new(EditTarget::Concept(freight), Representation::UsdTotal, "900"));
    ledger.apply(LedgerCommand::MoveToIndex { id: freight, index: 0 }).unwrap();

    let snapshot = PresetSnapshot::Ledger(ledger.state().clone());
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: PresetSnapshot = serde_json::from_str(&json).unwrap();
    let PresetSnapshot::Ledger(state) = restored else {
        panic!("expected a ledger snapshot");
    };
    let reloaded = Ledger::from_state(state, &CalculatorSettings::default());
    assert_eq!(reloaded.concepts()[0].name, "Freight");
    let (before, after) = (ledger.snapshot(), reloaded.snapshot());
    assert_eq!(after.rows.len(), before.rows.len());
    for r in Representation::ALL {
        assert_close(after.sale_price.get(r), before.sale_price.get(r));
    }
}

#[test]
fn legacy_ledger_json_loads() {
    let json = r#"{
        "exchangeRate": 20,
        "basePrice": 2.5,
        "gallons": 100,
        "liters": 0,
        "concepts": [{"id": "7a0e3f6c-8a54-4a8e-9a45-5f2b0a1a9b11", "name": "Fee", "value": 3, "inputType": "mxnLtr"}],
        "margin": 1,
        "marginInputType": "usd",
        "decimalPlaces": 2
    }"#;
    let state: LedgerState = serde_json::from_str(json).unwrap();
    let ledger = Ledger::from_state(state, &CalculatorSettings::default());
    assert_eq!(ledger.concepts().len(), 2);
    assert!(ledger.concepts()[0].is_base);
    assert_close(ledger.state().liters, 378.541);
    assert_eq!(ledger.state().margin_input_type, Representation::UsdTotal);
}

#[test]
fn export_matches_render() {
    let ledger = quoted_ledger();
    let snapshot = ledger.snapshot();
    let csv = ledger_csv_string(&snapshot).unwrap();
    assert_eq!(csv.lines().count(), 5);
    assert!(csv.contains("Molecule Price,"));
    let summary = share_summary(&snapshot);
    let view = ledger.render(None);
    assert!(summary.ends_with(&format!("Total Cost: {} MXN", view.totals_display.mxn_total)));
}

#[test]
fn blend_weighted_average() {
    let mut blend = Blend::new();
    let ids: Vec<_> = blend.products().iter().map(|p| p.id).collect();
    let third = blend.add_product();
    for (id, price, percentage) in [(ids[0], "21.50", "60"), (ids[1], "22.00", "30"), (third, "23", "10")] {
        blend.commit_edit(&BlendEdit::new(id, BlendField::Price, price)).unwrap();
        blend.commit_edit(&BlendEdit::new(id, BlendField::Percentage, percentage)).unwrap();
    }
    let summary = blend.summary();
    assert!(summary.valid);
    assert_close(summary.blended_price, 21.8);

    blend.remove_product(third).unwrap();
    let summary = blend.summary();
    assert!(!summary.valid);
    assert_eq!(summary.blended_price, 0.0);
    assert!(summary.warning.unwrap().contains("90.00%"));
}
