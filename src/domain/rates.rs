//! Business rate tables: container specs, freight rates, Qatar clearance
//! tariffs and the MOFA attestation schedule, plus override merging and
//! fail-fast validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::entities::ContainerType;

/// One value per sealed container type. Total by construction, so fee
/// lookups cannot miss and need no fallback literals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerContainer<T> {
    #[serde(rename = "20GP")]
    pub gp20: T,
    #[serde(rename = "40GP")]
    pub gp40: T,
    #[serde(rename = "40HC")]
    pub hc40: T,
}

impl<T> PerContainer<T> {
    /// Entry for a sealed type; `None` for LCL, which has no per-type line.
    pub fn get(&self, container: ContainerType) -> Option<&T> {
        match container {
            ContainerType::Gp20 => Some(&self.gp20),
            ContainerType::Gp40 => Some(&self.gp40),
            ContainerType::Hc40 => Some(&self.hc40),
            ContainerType::Lcl => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContainerType, &T)> {
        [
            (ContainerType::Gp20, &self.gp20),
            (ContainerType::Gp40, &self.gp40),
            (ContainerType::Hc40, &self.hc40),
        ]
        .into_iter()
    }
}

/// Physical spec of a sealed container type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    /// Usable volume in cubic meters.
    pub cbm: f64,
    /// Maximum payload in kilograms.
    pub max_weight: f64,
    pub name: String,
}

/// China-to-Qatar sea freight, USD per container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeaFreightRates {
    pub per_container: PerContainer<f64>,
    /// Flat base rate for loose (LCL) cargo.
    pub lcl_base: f64,
}

/// Qatar clearance tariff structure, QAR. Mirrors the shipping line's
/// published schedule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QatarClearanceRates {
    /// Customs duty as a fraction of CIF value.
    pub customs_duty_rate: f64,
    /// Flat harbor (Mwani) charge.
    pub mwani_charges: f64,
    pub delivery_order: PerContainer<f64>,
    pub terminal_handling: PerContainer<f64>,
    pub container_return: PerContainer<f64>,
    pub container_maintenance: PerContainer<f64>,
    pub terminal_inspection: f64,
    pub inspection_charge: f64,
    pub clearance_agent_fees: f64,
}

/// One tier of the MOFA attestation fee schedule. Either a flat fee or a
/// percentage of the invoice value; the final tier has no ceiling.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MofaTier {
    /// Inclusive ceiling in QAR; `None` means unbounded.
    pub max_invoice_value: Option<f64>,
    pub fee: Option<f64>,
    pub percentage: Option<f64>,
}

impl MofaTier {
    /// Boundary values belong to this tier, not the next one.
    pub fn applies_to(&self, invoice_value: f64) -> bool {
        self.max_invoice_value
            .map(|ceiling| invoice_value <= ceiling)
            .unwrap_or(true)
    }

    pub fn charge_for(&self, invoice_value: f64) -> f64 {
        match (self.fee, self.percentage) {
            (Some(fee), _) => fee,
            (None, Some(percentage)) => invoice_value * percentage,
            (None, None) => 0.0,
        }
    }
}

/// The complete rate configuration a calculation runs against. Built from
/// [`RateTable::default`] plus per-field overrides, then validated once.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTable {
    pub container_specs: PerContainer<ContainerSpec>,
    pub sea_freight: SeaFreightRates,
    pub qatar_clearance: QatarClearanceRates,
    pub mofa_tiers: Vec<MofaTier>,
    /// Certificate-of-origin fee (QAR), charged on top of every
    /// attestation tier.
    pub certificate_of_origin_fee: f64,
    /// Local transportation in Qatar (QAR).
    pub local_transport: f64,
    /// Domestic China shipping, USD per CBM.
    pub domestic_china_per_cbm: f64,
    /// Insurance as a fraction of pre-insurance CIF.
    pub insurance_rate: f64,
    /// Base certification cost per shipment (USD).
    pub certification_cost: f64,
    pub usd_to_qar: f64,
    /// Default profit margin fraction.
    pub profit_margin: f64,
    /// Default commission fraction.
    pub commission_rate: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            container_specs: PerContainer {
                gp20: ContainerSpec {
                    cbm: 33.0,
                    max_weight: 28_000.0,
                    name: "20' Standard".to_string(),
                },
                gp40: ContainerSpec {
                    cbm: 67.0,
                    max_weight: 28_000.0,
                    name: "40' Standard".to_string(),
                },
                hc40: ContainerSpec {
                    cbm: 76.0,
                    max_weight: 28_000.0,
                    name: "40' High Cube".to_string(),
                },
            },
            sea_freight: SeaFreightRates {
                per_container: PerContainer {
                    gp20: 1800.0,
                    gp40: 3200.0,
                    hc40: 3400.0,
                },
                lcl_base: 800.0,
            },
            qatar_clearance: QatarClearanceRates {
                customs_duty_rate: 0.05,
                mwani_charges: 160.0,
                delivery_order: PerContainer {
                    gp20: 650.0,
                    gp40: 1000.0,
                    hc40: 1100.0,
                },
                terminal_handling: PerContainer {
                    gp20: 650.0,
                    gp40: 1000.0,
                    hc40: 1100.0,
                },
                container_return: PerContainer {
                    gp20: 150.0,
                    gp40: 300.0,
                    hc40: 380.0,
                },
                container_maintenance: PerContainer {
                    gp20: 20.02,
                    gp40: 40.04,
                    hc40: 40.04,
                },
                terminal_inspection: 35.0,
                inspection_charge: 50.0,
                clearance_agent_fees: 250.0,
            },
            mofa_tiers: vec![
                MofaTier {
                    max_invoice_value: Some(15_000.0),
                    fee: Some(500.0),
                    percentage: None,
                },
                MofaTier {
                    max_invoice_value: Some(100_000.0),
                    fee: Some(1000.0),
                    percentage: None,
                },
                MofaTier {
                    max_invoice_value: Some(250_000.0),
                    fee: Some(2500.0),
                    percentage: None,
                },
                MofaTier {
                    max_invoice_value: Some(1_000_000.0),
                    fee: Some(5000.0),
                    percentage: None,
                },
                // 0.6% of invoice value above 1M
                MofaTier {
                    max_invoice_value: None,
                    fee: None,
                    percentage: Some(0.006),
                },
            ],
            certificate_of_origin_fee: 150.0,
            local_transport: 800.0,
            domestic_china_per_cbm: 15.0,
            insurance_rate: 0.005,
            certification_cost: 150.0,
            usd_to_qar: 3.65,
            profit_margin: 0.15,
            commission_rate: 0.06,
        }
    }
}

/// Sparse per-calculation replacements, merged shallowly over the default
/// table. The three `*_override` totals short-circuit computed figures:
/// a flat domestic-shipping override always wins over a per-CBM override,
/// which wins over the table rate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateOverrides {
    /// Replaces the computed sea-freight total outright.
    pub sea_freight_override: Option<f64>,
    /// Replaces the computed domestic-China-shipping total outright.
    pub domestic_china_shipping_override: Option<f64>,
    pub domestic_china_per_cbm_override: Option<f64>,
    /// Targets `qatar_clearance.customs_duty_rate` without replacing the
    /// whole clearance table.
    pub customs_duty_rate: Option<f64>,
    pub container_specs: Option<PerContainer<ContainerSpec>>,
    pub sea_freight: Option<SeaFreightRates>,
    pub qatar_clearance: Option<QatarClearanceRates>,
    pub mofa_tiers: Option<Vec<MofaTier>>,
    pub certificate_of_origin_fee: Option<f64>,
    pub local_transport: Option<f64>,
    pub domestic_china_per_cbm: Option<f64>,
    pub insurance_rate: Option<f64>,
    pub certification_cost: Option<f64>,
    pub usd_to_qar: Option<f64>,
    pub profit_margin: Option<f64>,
    pub commission_rate: Option<f64>,
}

impl RateTable {
    /// Shallow merge: an override field replaces the corresponding table
    /// field (sub-tables wholesale).
    pub fn with_overrides(&self, overrides: &RateOverrides) -> RateTable {
        let mut rates = self.clone();
        if let Some(specs) = &overrides.container_specs {
            rates.container_specs = specs.clone();
        }
        if let Some(freight) = &overrides.sea_freight {
            rates.sea_freight = freight.clone();
        }
        if let Some(clearance) = &overrides.qatar_clearance {
            rates.qatar_clearance = clearance.clone();
        }
        if let Some(duty_rate) = overrides.customs_duty_rate {
            rates.qatar_clearance.customs_duty_rate = duty_rate;
        }
        if let Some(tiers) = &overrides.mofa_tiers {
            rates.mofa_tiers = tiers.clone();
        }
        if let Some(fee) = overrides.certificate_of_origin_fee {
            rates.certificate_of_origin_fee = fee;
        }
        if let Some(transport) = overrides.local_transport {
            rates.local_transport = transport;
        }
        if let Some(per_cbm) = overrides.domestic_china_per_cbm {
            rates.domestic_china_per_cbm = per_cbm;
        }
        if let Some(rate) = overrides.insurance_rate {
            rates.insurance_rate = rate;
        }
        if let Some(cost) = overrides.certification_cost {
            rates.certification_cost = cost;
        }
        if let Some(rate) = overrides.usd_to_qar {
            rates.usd_to_qar = rate;
        }
        if let Some(margin) = overrides.profit_margin {
            rates.profit_margin = margin;
        }
        if let Some(rate) = overrides.commission_rate {
            rates.commission_rate = rate;
        }
        rates
    }

    /// Reject a table that could ever produce a NaN or negative fee.
    /// Runs once after the override merge, so the fee calculators can
    /// trust every field they read.
    pub fn validate(&self) -> Result<(), RateError> {
        let mut checks: Vec<(String, f64)> = vec![
            ("certificateOfOriginFee".to_string(), self.certificate_of_origin_fee),
            ("localTransport".to_string(), self.local_transport),
            ("domesticChinaPerCbm".to_string(), self.domestic_china_per_cbm),
            ("insuranceRate".to_string(), self.insurance_rate),
            ("certificationCost".to_string(), self.certification_cost),
            ("profitMargin".to_string(), self.profit_margin),
            ("commissionRate".to_string(), self.commission_rate),
            ("seaFreight.lclBase".to_string(), self.sea_freight.lcl_base),
            (
                "qatarClearance.customsDutyRate".to_string(),
                self.qatar_clearance.customs_duty_rate,
            ),
            ("qatarClearance.mwaniCharges".to_string(), self.qatar_clearance.mwani_charges),
            (
                "qatarClearance.terminalInspection".to_string(),
                self.qatar_clearance.terminal_inspection,
            ),
            (
                "qatarClearance.inspectionCharge".to_string(),
                self.qatar_clearance.inspection_charge,
            ),
            (
                "qatarClearance.clearanceAgentFees".to_string(),
                self.qatar_clearance.clearance_agent_fees,
            ),
        ];
        for (container, rate) in self.sea_freight.per_container.iter() {
            checks.push((format!("seaFreight.{}", container.label()), *rate));
        }
        let per_type_tables = [
            ("deliveryOrder", &self.qatar_clearance.delivery_order),
            ("terminalHandling", &self.qatar_clearance.terminal_handling),
            ("containerReturn", &self.qatar_clearance.container_return),
            ("containerMaintenance", &self.qatar_clearance.container_maintenance),
        ];
        for (table_name, table) in per_type_tables {
            for (container, rate) in table.iter() {
                checks.push((
                    format!("qatarClearance.{table_name}.{}", container.label()),
                    *rate,
                ));
            }
        }

        for (field, value) in checks {
            if !value.is_finite() || value < 0.0 {
                warn!(field = %field, value, "rate table rejected");
                return Err(RateError::InvalidField { field, value });
            }
        }

        if !(self.usd_to_qar.is_finite() && self.usd_to_qar > 0.0) {
            return Err(RateError::NonPositiveExchangeRate(self.usd_to_qar));
        }

        for (container, spec) in self.container_specs.iter() {
            if !(spec.cbm.is_finite() && spec.cbm > 0.0) {
                return Err(RateError::NonPositiveCapacity(container.label().to_string()));
            }
        }

        self.validate_mofa_tiers()
    }

    fn validate_mofa_tiers(&self) -> Result<(), RateError> {
        let Some(last_tier) = self.mofa_tiers.last() else {
            return Err(RateError::EmptyFeeSchedule);
        };
        if last_tier.max_invoice_value.is_some() {
            return Err(RateError::MissingUnboundedTier);
        }

        let mut previous_ceiling = f64::NEG_INFINITY;
        let last = self.mofa_tiers.len() - 1;
        for (index, tier) in self.mofa_tiers.iter().enumerate() {
            if tier.fee.is_none() && tier.percentage.is_none() {
                return Err(RateError::IncompleteTier(index));
            }
            for value in [tier.fee, tier.percentage].into_iter().flatten() {
                if !value.is_finite() || value < 0.0 {
                    return Err(RateError::InvalidField {
                        field: format!("mofaTiers[{index}]"),
                        value,
                    });
                }
            }
            match tier.max_invoice_value {
                Some(ceiling) => {
                    // Ceilings must ascend, or the linear scan would shadow
                    // later tiers.
                    if !ceiling.is_finite() || ceiling <= previous_ceiling {
                        return Err(RateError::UnorderedTiers);
                    }
                    previous_ceiling = ceiling;
                }
                None => {
                    // Only the final tier may be unbounded.
                    if index != last {
                        return Err(RateError::MissingUnboundedTier);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Fatal rate-table defects. These abort the calculation: the numbers a
/// broken table would produce are meaningless.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("rate table field `{field}` must be a finite, non-negative number (got {value})")]
    InvalidField { field: String, value: f64 },
    #[error("exchange rate must be positive (got {0})")]
    NonPositiveExchangeRate(f64),
    #[error("container spec `{0}` must have a positive capacity")]
    NonPositiveCapacity(String),
    #[error("attestation fee schedule is empty")]
    EmptyFeeSchedule,
    #[error("attestation fee schedule must end with an unbounded tier")]
    MissingUnboundedTier,
    #[error("attestation tier ceilings must be finite and strictly ascending")]
    UnorderedTiers,
    #[error("attestation tier {0} has neither a flat fee nor a percentage")]
    IncompleteTier(usize),
    #[error("computed fee `{field}` is not finite")]
    NonFiniteFee { field: String },
    #[error("computed fee `{field}` is negative ({value})")]
    NegativeFee { field: String, value: f64 },
}
