//! Input and output records for the landed-cost engine.

use serde::{Deserialize, Serialize};

use super::rates::{RateError, RateTable};

/// ISO container types plus the synthetic less-than-container-load entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerType {
    #[serde(rename = "20GP")]
    Gp20,
    #[serde(rename = "40GP")]
    Gp40,
    #[serde(rename = "40HC")]
    Hc40,
    #[serde(rename = "LCL")]
    Lcl,
}

impl ContainerType {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerType::Gp20 => "20GP",
            ContainerType::Gp40 => "40GP",
            ContainerType::Hc40 => "40HC",
            ContainerType::Lcl => "LCL",
        }
    }

    /// Sealed boxes have a rated capacity and per-type tariff lines; LCL is
    /// loose cargo and has neither.
    pub fn is_sealed(&self) -> bool {
        !matches!(self, ContainerType::Lcl)
    }
}

/// How the container plan is decided: picked from the shipment volume, or
/// pinned to one type by the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ContainerChoice {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(untagged)]
    Forced(ContainerType),
}

impl ContainerChoice {
    /// Lenient parse of a document/UI label. Unknown labels fall back to
    /// automatic selection.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "20GP" => ContainerChoice::Forced(ContainerType::Gp20),
            "40GP" => ContainerChoice::Forced(ContainerType::Gp40),
            "40HC" => ContainerChoice::Forced(ContainerType::Hc40),
            "LCL" => ContainerChoice::Forced(ContainerType::Lcl),
            _ => ContainerChoice::Auto,
        }
    }
}

/// Incoterm the unit prices are quoted under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PricingMode {
    /// Ex Works: buyer pays domestic China shipping on top.
    #[default]
    Exw,
    /// Free On Board: domestic shipping is already in the unit price.
    Fob,
    /// Cost, Insurance & Freight: freight and insurance are in the price.
    Cif,
}

impl PricingMode {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "FOB" => PricingMode::Fob,
            "CIF" => PricingMode::Cif,
            _ => PricingMode::Exw,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PricingMode::Exw => "EXW",
            PricingMode::Fob => "FOB",
            PricingMode::Cif => "CIF",
        }
    }
}

/// Whether a margin/commission value is a fraction of its base or a flat
/// USD amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountMode {
    #[default]
    Percentage,
    Fixed,
}

impl AmountMode {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "fixed" => AmountMode::Fixed,
            _ => AmountMode::Percentage,
        }
    }
}

/// A named one-off cost attached to an item (certification or fixed cost).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub name: String,
    pub cost: f64,
}

/// One shipment line in canonical form.
///
/// Produced by the document boundary adapter; the engine trusts the fields
/// to be plain numbers (it still maps non-finite values to zero) and treats
/// lines with non-positive quantity, price or volume as not yet filled in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteItem {
    pub id: String,
    pub description: String,
    pub quantity: f64,
    /// Price per unit in USD under the selected pricing mode.
    pub unit_price: f64,
    /// Volume per unit in cubic meters.
    pub cbm_per_unit: f64,
    /// Weight per unit in kilograms. Zero is a valid weight.
    pub weight_per_unit: f64,
    pub certifications: Vec<CostLine>,
    /// One-time costs (tooling, samples) not multiplied by quantity.
    pub fixed_costs: Vec<CostLine>,
}

/// Per-calculation knobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSettings {
    pub pricing_mode: PricingMode,
    pub container_type: ContainerChoice,
    pub profit_margin: f64,
    pub profit_margin_mode: AmountMode,
    pub commission_rate: f64,
    pub commission_mode: AmountMode,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        let rates = RateTable::default();
        Self {
            pricing_mode: PricingMode::Exw,
            container_type: ContainerChoice::Auto,
            profit_margin: rates.profit_margin,
            profit_margin_mode: AmountMode::Percentage,
            commission_rate: rates.commission_rate,
            commission_mode: AmountMode::Percentage,
        }
    }
}

/// Shipment-level figures derived from the item list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSummary {
    pub total_items: usize,
    pub total_quantity: f64,
    pub total_cbm: f64,
    pub total_weight: f64,
    pub containers: Vec<ContainerType>,
    pub container_count: usize,
    /// Percentage of the booked capacity actually filled. `0` when there
    /// is no volume at all.
    pub container_utilization: f64,
}

/// Qatar-side clearance charges, all in QAR.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QatarCharges {
    pub customs_duty: f64,
    pub mwani_charges: f64,
    pub delivery_order_fees: f64,
    pub terminal_handling: f64,
    pub container_return: f64,
    pub container_maintenance: f64,
    pub terminal_inspection: f64,
    pub inspection_charge: f64,
    pub clearance_agent_fees: f64,
    pub document_attestation: f64,
    pub local_transport: f64,
}

impl QatarCharges {
    /// Every fee line with its wire name, for summing and validation.
    pub fn fields(&self) -> [(&'static str, f64); 11] {
        [
            ("customsDuty", self.customs_duty),
            ("mwaniCharges", self.mwani_charges),
            ("deliveryOrderFees", self.delivery_order_fees),
            ("terminalHandling", self.terminal_handling),
            ("containerReturn", self.container_return),
            ("containerMaintenance", self.container_maintenance),
            ("terminalInspection", self.terminal_inspection),
            ("inspectionCharge", self.inspection_charge),
            ("clearanceAgentFees", self.clearance_agent_fees),
            ("documentAttestation", self.document_attestation),
            ("localTransport", self.local_transport),
        ]
    }

    pub fn total(&self) -> f64 {
        self.fields().iter().map(|(_, value)| value).sum()
    }

    /// A NaN or negative fee means the rate table itself is broken; any
    /// numbers derived from it would be meaningless.
    pub fn validate(&self) -> Result<(), RateError> {
        for (field, value) in self.fields() {
            if !value.is_finite() {
                return Err(RateError::NonFiniteFee {
                    field: field.to_string(),
                });
            }
            if value < 0.0 {
                return Err(RateError::NegativeFee {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Aggregate cost figures, USD unless suffixed otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub total_exw_cost: f64,
    pub sea_freight: f64,
    pub domestic_china_shipping: f64,
    pub freight_subtotal: f64,
    pub insurance: f64,
    /// Cost + insurance + freight. Equals `total_exw_cost` under CIF
    /// pricing, where the unit prices already carry freight and insurance.
    pub cif_value: f64,
    pub cif_value_qar: f64,
    pub qatar_charges: QatarCharges,
    pub total_qatar_charges_qar: f64,
    pub total_qatar_charges_usd: f64,
    /// Base per-shipment certification charge plus every per-item
    /// certification cost. Not floored: a negative line subtracts.
    pub certification_cost: f64,
    pub fixed_cost_total: f64,
    pub landed_cost_before_margin: f64,
    pub profit_margin: f64,
    pub commission: f64,
    pub ddp_total: f64,
}

/// One valid input item's share of every aggregate cost.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBreakdown {
    pub item_id: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub item_cbm: f64,
    pub value_ratio: f64,
    pub cbm_ratio: f64,
    pub allocated_freight: f64,
    pub allocated_qatar_charges: f64,
    /// Pro-rated share of the base certification charge plus this item's
    /// own certification costs.
    pub allocated_certification: f64,
    pub allocated_insurance: f64,
    pub item_fixed_cost: f64,
    pub item_landed_cost: f64,
    pub item_margin: f64,
    pub item_commission: f64,
    pub item_ddp_total: f64,
    pub ddp_per_unit: f64,
}

/// Full calculation result. Immutable once produced; renderers read it as
/// is, and the per-item DDP totals sum back to `costs.ddp_total` within
/// floating-point tolerance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub summary: ShipmentSummary,
    pub costs: CostBreakdown,
    pub item_breakdowns: Vec<ItemBreakdown>,
    /// The effective merged rate table the figures were computed from.
    pub rates: RateTable,
}
