//! The landed-cost orchestrator: aggregates the item list, selects
//! containers, assembles every fee, and pro-rates the totals back onto the
//! items so each line's DDP share sums to the shipment's DDP total.

use tracing::debug;

use crate::util::numeric::sanitize;

use super::containers::{container_utilization, select_containers};
use super::entities::{
    AmountMode, ContainerChoice, CostBreakdown, ItemBreakdown, PricingMode, QuoteItem,
    QuoteResult, QuoteSettings, ShipmentSummary,
};
use super::fees;
use super::rates::{RateError, RateOverrides, RateTable};

/// One item after normalization and the validity filter, with its line
/// totals precomputed.
struct NormalizedItem<'a> {
    item: &'a QuoteItem,
    quantity: f64,
    unit_price: f64,
    cbm: f64,
    weight: f64,
    certification_cost: f64,
    fixed_cost: f64,
}

/// A line with non-positive quantity, price or volume is not yet fully
/// specified and stays out of the calculation. Not an error.
fn normalize_item(item: &QuoteItem) -> Option<NormalizedItem<'_>> {
    let quantity = sanitize(item.quantity);
    let unit_price = sanitize(item.unit_price);
    let cbm_per_unit = sanitize(item.cbm_per_unit);
    if quantity <= 0.0 || unit_price <= 0.0 || cbm_per_unit <= 0.0 {
        return None;
    }
    Some(NormalizedItem {
        item,
        quantity,
        unit_price,
        cbm: cbm_per_unit * quantity,
        weight: sanitize(item.weight_per_unit) * quantity,
        certification_cost: item.certifications.iter().map(|line| sanitize(line.cost)).sum(),
        fixed_cost: item.fixed_costs.iter().map(|line| sanitize(line.cost)).sum(),
    })
}

/// Compute the full DDP cost breakdown for a shipment.
///
/// Returns `Ok(None)` when no item survives the validity filter: nothing
/// to compute yet, as opposed to a rate-table defect which is an `Err`.
pub fn calculate_landed_cost(
    items: &[QuoteItem],
    settings: &QuoteSettings,
    overrides: &RateOverrides,
) -> Result<Option<QuoteResult>, RateError> {
    let rates = RateTable::default().with_overrides(overrides);
    rates.validate()?;

    let valid: Vec<NormalizedItem<'_>> = items.iter().filter_map(normalize_item).collect();
    if valid.is_empty() {
        return Ok(None);
    }

    let total_quantity: f64 = valid.iter().map(|entry| entry.quantity).sum();
    let total_exw_cost: f64 = valid.iter().map(|entry| entry.unit_price * entry.quantity).sum();
    let total_cbm: f64 = valid.iter().map(|entry| entry.cbm).sum();
    let total_weight: f64 = valid.iter().map(|entry| entry.weight).sum();
    let total_certification_cost: f64 = valid.iter().map(|entry| entry.certification_cost).sum();
    let total_fixed_cost: f64 = valid.iter().map(|entry| entry.fixed_cost).sum();

    let containers = match settings.container_type {
        ContainerChoice::Forced(container) => vec![container],
        ContainerChoice::Auto => select_containers(total_cbm, &rates.container_specs),
    };
    debug!(total_cbm, plan = ?containers, "container plan");

    // What the unit price already covers depends on the incoterm: CIF
    // prices carry freight and insurance, FOB prices carry the domestic
    // leg.
    let (sea_freight_total, domestic_china_shipping) = match settings.pricing_mode {
        PricingMode::Cif => (0.0, 0.0),
        mode => {
            let sea = overrides
                .sea_freight_override
                .unwrap_or_else(|| fees::sea_freight(&containers, &rates));
            let domestic = if mode == PricingMode::Exw {
                match (
                    overrides.domestic_china_shipping_override,
                    overrides.domestic_china_per_cbm_override,
                ) {
                    (Some(flat), _) => flat,
                    (None, Some(per_cbm)) => total_cbm * per_cbm,
                    (None, None) => total_cbm * rates.domestic_china_per_cbm,
                }
            } else {
                0.0
            };
            (sea, domestic)
        }
    };
    let freight_subtotal = sea_freight_total + domestic_china_shipping;

    let (insurance, cif_value) = match settings.pricing_mode {
        PricingMode::Cif => (0.0, total_exw_cost),
        _ => {
            let insurance = (total_exw_cost + freight_subtotal) * rates.insurance_rate;
            (insurance, total_exw_cost + freight_subtotal + insurance)
        }
    };

    let cif_value_qar = cif_value * rates.usd_to_qar;
    let invoice_value_qar = total_exw_cost * rates.usd_to_qar;

    let qatar_charges = fees::qatar_fees(&containers, cif_value_qar, invoice_value_qar, &rates)?;
    let total_qatar_charges_qar = qatar_charges.total();
    let total_qatar_charges_usd = total_qatar_charges_qar / rates.usd_to_qar;

    // Base certification is a flat per-shipment charge; per-item costs add
    // on top without a floor, so a negative line can pull the total below
    // the base.
    let certification_cost = rates.certification_cost + total_certification_cost;

    let landed_cost_before_margin = total_exw_cost
        + freight_subtotal
        + total_qatar_charges_usd
        + certification_cost
        + total_fixed_cost
        + insurance;

    let profit_margin = match settings.profit_margin_mode {
        AmountMode::Percentage => landed_cost_before_margin * settings.profit_margin,
        AmountMode::Fixed => settings.profit_margin,
    };
    let cost_with_margin = landed_cost_before_margin + profit_margin;

    let commission = match settings.commission_mode {
        AmountMode::Percentage => cost_with_margin * settings.commission_rate,
        AmountMode::Fixed => settings.commission_rate,
    };
    let ddp_total = cost_with_margin + commission;

    let item_breakdowns: Vec<ItemBreakdown> = valid
        .iter()
        .map(|entry| {
            let item_total = entry.unit_price * entry.quantity;
            let value_ratio = if total_exw_cost > 0.0 {
                item_total / total_exw_cost
            } else {
                0.0
            };
            let cbm_ratio = if total_cbm > 0.0 { entry.cbm / total_cbm } else { 0.0 };

            // Volume-driven costs follow the volume ratio; value-driven
            // costs follow the value ratio. The item's own certification
            // and fixed costs are already item-specific and add directly.
            let allocated_freight = freight_subtotal * cbm_ratio;
            let allocated_qatar_charges = total_qatar_charges_usd * value_ratio;
            let allocated_base_certification = rates.certification_cost * value_ratio;
            let allocated_insurance = insurance * value_ratio;

            let item_landed_cost = item_total
                + allocated_freight
                + allocated_qatar_charges
                + allocated_base_certification
                + entry.certification_cost
                + entry.fixed_cost
                + allocated_insurance;

            // Fixed margin/commission amounts distribute by value ratio so
            // the item shares sum back to the aggregate flat amount.
            let item_margin = match settings.profit_margin_mode {
                AmountMode::Percentage => item_landed_cost * settings.profit_margin,
                AmountMode::Fixed => settings.profit_margin * value_ratio,
            };
            let item_with_margin = item_landed_cost + item_margin;

            let item_commission = match settings.commission_mode {
                AmountMode::Percentage => item_with_margin * settings.commission_rate,
                AmountMode::Fixed => settings.commission_rate * value_ratio,
            };

            let item_ddp_total = item_with_margin + item_commission;
            let ddp_per_unit = if entry.quantity > 0.0 {
                item_ddp_total / entry.quantity
            } else {
                0.0
            };

            ItemBreakdown {
                item_id: entry.item.id.clone(),
                description: entry.item.description.clone(),
                quantity: entry.quantity,
                unit_price: entry.unit_price,
                item_cbm: entry.cbm,
                value_ratio,
                cbm_ratio,
                allocated_freight,
                allocated_qatar_charges,
                allocated_certification: allocated_base_certification + entry.certification_cost,
                allocated_insurance,
                item_fixed_cost: entry.fixed_cost,
                item_landed_cost,
                item_margin,
                item_commission,
                item_ddp_total,
                ddp_per_unit,
            }
        })
        .collect();

    let utilization = container_utilization(&containers, total_cbm, &rates.container_specs);

    Ok(Some(QuoteResult {
        summary: ShipmentSummary {
            total_items: valid.len(),
            total_quantity,
            total_cbm,
            total_weight,
            container_count: containers.len(),
            containers,
            container_utilization: utilization,
        },
        costs: CostBreakdown {
            total_exw_cost,
            sea_freight: sea_freight_total,
            domestic_china_shipping,
            freight_subtotal,
            insurance,
            cif_value,
            cif_value_qar,
            qatar_charges,
            total_qatar_charges_qar,
            total_qatar_charges_usd,
            certification_cost,
            fixed_cost_total: total_fixed_cost,
            landed_cost_before_margin,
            profit_margin,
            commission,
            ddp_total,
        },
        item_breakdowns,
        rates,
    }))
}
