use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Add;
use uuid::Uuid;

pub type ConceptId = Uuid;
pub type ProductId = Uuid;
pub type PresetId = Uuid;
pub type UserId = String;

/// One of the four units a price can be displayed or edited in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Representation {
    #[default]
    #[serde(rename = "mxnPerLiter", alias = "mxnLtr")]
    MxnPerLiter,
    #[serde(rename = "mxnTotal", alias = "mxn")]
    MxnTotal,
    #[serde(rename = "usdTotal", alias = "usd")]
    UsdTotal,
    #[serde(rename = "usdPerGallon", alias = "usdGal")]
    UsdPerGallon,
}

impl Representation {
    pub const ALL: [Representation; 4] = [
        Representation::MxnPerLiter,
        Representation::MxnTotal,
        Representation::UsdTotal,
        Representation::UsdPerGallon,
    ];

    /// Column header used by the CSV export.
    pub fn label(self) -> &'static str {
        match self {
            Representation::MxnPerLiter => "MXN/L",
            Representation::MxnTotal => "MXN",
            Representation::UsdTotal => "USD",
            Representation::UsdPerGallon => "USD/Gal",
        }
    }
}

/// The single stored `(value, inputType)` pair of a priced entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceInput {
    pub value: f64,
    pub representation: Representation,
}

impl PriceInput {
    pub fn new(value: f64, representation: Representation) -> Self {
        Self { value, representation }
    }
}

/// All four representations of one price. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepresentationSet {
    pub mxn_per_liter: f64,
    pub mxn_total: f64,
    pub usd_total: f64,
    pub usd_per_gallon: f64,
}

impl RepresentationSet {
    pub fn get(&self, representation: Representation) -> f64 {
        match representation {
            Representation::MxnPerLiter => self.mxn_per_liter,
            Representation::MxnTotal => self.mxn_total,
            Representation::UsdTotal => self.usd_total,
            Representation::UsdPerGallon => self.usd_per_gallon,
        }
    }

    pub fn from_fn(mut f: impl FnMut(Representation) -> f64) -> Self {
        Self {
            mxn_per_liter: f(Representation::MxnPerLiter),
            mxn_total: f(Representation::MxnTotal),
            usd_total: f(Representation::UsdTotal),
            usd_per_gallon: f(Representation::UsdPerGallon),
        }
    }
}

impl Add for RepresentationSet {
    type Output = RepresentationSet;

    fn add(self, rhs: RepresentationSet) -> RepresentationSet {
        RepresentationSet::from_fn(|r| self.get(r) + rhs.get(r))
    }
}

impl std::iter::Sum for RepresentationSet {
    fn sum<I: Iterator<Item = RepresentationSet>>(iter: I) -> Self {
        iter.fold(RepresentationSet::default(), Add::add)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    #[serde(default = "Uuid::new_v4")]
    pub id: ConceptId,
    pub name: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub input_type: Representation,
    #[serde(default)]
    pub is_base: bool,
}

impl Concept {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value: 0.0,
            input_type: Representation::MxnPerLiter,
            is_base: false,
        }
    }

    /// The base concept's value lives in `LedgerState::base_price`; its own
    /// `value` / `input_type` are never read.
    pub fn base(name: impl Into<String>) -> Self {
        Self {
            input_type: Representation::UsdPerGallon,
            is_base: true,
            ..Self::new(name)
        }
    }

    pub fn canonical(&self) -> PriceInput {
        PriceInput::new(self.value, self.input_type)
    }
}

/// Display precision for priced cells. Serialized as the number 2 or 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DecimalPlaces {
    Two,
    #[default]
    Four,
}

impl DecimalPlaces {
    pub fn digits(self) -> usize {
        match self {
            DecimalPlaces::Two => 2,
            DecimalPlaces::Four => 4,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            DecimalPlaces::Two => DecimalPlaces::Four,
            DecimalPlaces::Four => DecimalPlaces::Two,
        }
    }
}

impl TryFrom<u8> for DecimalPlaces {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(DecimalPlaces::Two),
            4 => Ok(DecimalPlaces::Four),
            other => Err(format!("decimal places must be 2 or 4, got {}", other)),
        }
    }
}

impl From<DecimalPlaces> for u8 {
    fn from(value: DecimalPlaces) -> Self {
        value.digits() as u8
    }
}

fn usd_per_gallon() -> Representation {
    Representation::UsdPerGallon
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    /// MXN per USD; 0 means unset.
    #[serde(default)]
    pub exchange_rate: f64,
    /// Canonical base price, always USD per gallon.
    #[serde(default)]
    pub base_price: f64,
    /// Column the base price was last edited in. Display only.
    #[serde(default = "usd_per_gallon")]
    pub base_price_input_type: Representation,
    #[serde(default)]
    pub gallons: f64,
    #[serde(default)]
    pub liters: f64,
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub margin: f64,
    #[serde(default)]
    pub margin_input_type: Representation,
    #[serde(default)]
    pub decimal_places: DecimalPlaces,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            exchange_rate: 0.0,
            base_price: 0.0,
            base_price_input_type: Representation::UsdPerGallon,
            gallons: 0.0,
            liters: 0.0,
            concepts: Vec::new(),
            margin: 0.0,
            margin_input_type: Representation::MxnPerLiter,
            decimal_places: DecimalPlaces::Four,
        }
    }
}

impl LedgerState {
    pub fn margin_input(&self) -> PriceInput {
        PriceInput::new(self.margin, self.margin_input_type)
    }

    pub fn base_input(&self) -> PriceInput {
        PriceInput::new(self.base_price, Representation::UsdPerGallon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendProduct {
    #[serde(default = "Uuid::new_v4")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
    /// 0 to 100.
    #[serde(default)]
    pub percentage: f64,
}

impl BlendProduct {
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            price: 0.0,
            percentage: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetKind {
    Ledger,
    Blend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PresetSnapshot {
    Ledger(LedgerState),
    Blend { products: Vec<BlendProduct> },
}

impl PresetSnapshot {
    pub fn kind(&self) -> PresetKind {
        match self {
            PresetSnapshot::Ledger(_) => PresetKind::Ledger,
            PresetSnapshot::Blend { .. } => PresetKind::Blend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: PresetId,
    pub user_id: UserId,
    pub name: String,
    pub snapshot: PresetSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference instruments polled from market data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Instrument {
    Gasoline,
    HeatingOil,
    UsdMxn,
}

impl Instrument {
    pub const ALL: [Instrument; 3] = [Instrument::Gasoline, Instrument::HeatingOil, Instrument::UsdMxn];

    pub fn symbol(self) -> &'static str {
        match self {
            Instrument::Gasoline => "RB=F",
            Instrument::HeatingOil => "HO=F",
            Instrument::UsdMxn => "USDMXN=X",
        }
    }

    /// Stable name used on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Instrument::Gasoline => "gasoline",
            Instrument::HeatingOil => "heatingOil",
            Instrument::UsdMxn => "usdMxn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentQuote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub historical: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePrices {
    pub quotes: BTreeMap<Instrument, InstrumentQuote>,
    pub fetched_at: DateTime<Utc>,
}
