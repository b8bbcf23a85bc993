//! Fee calculators: MOFA attestation, sea freight, Qatar clearance.

use super::entities::{ContainerType, QatarCharges};
use super::rates::{PerContainer, RateError, RateTable};

// Loose cargo clears without a dedicated box, so the per-container tariff
// lines do not apply; these flat approximations stand in for them. This is
// the one deliberate degradation the fee layer keeps.
const LCL_DELIVERY_ORDER_QAR: f64 = 200.0;
const LCL_TERMINAL_HANDLING_QAR: f64 = 300.0;
const LCL_CONTAINER_RETURN_QAR: f64 = 50.0;
const LCL_CONTAINER_MAINTENANCE_QAR: f64 = 10.0;

/// MOFA attestation fee for an invoice value in QAR: the first tier whose
/// ceiling covers the value, plus the unconditional certificate-of-origin
/// fee. The schedule's final tier is unbounded, so the scan always lands.
pub fn mofa_fee(invoice_value_qar: f64, rates: &RateTable) -> f64 {
    let attestation = rates
        .mofa_tiers
        .iter()
        .find(|tier| tier.applies_to(invoice_value_qar))
        .map(|tier| tier.charge_for(invoice_value_qar))
        .unwrap_or(0.0);
    rates.certificate_of_origin_fee + attestation
}

/// Total sea freight in USD for a container plan. Sealed containers use
/// their per-type rate; LCL entries add the flat base rate.
pub fn sea_freight(containers: &[ContainerType], rates: &RateTable) -> f64 {
    containers
        .iter()
        .map(|container| {
            rates
                .sea_freight
                .per_container
                .get(*container)
                .copied()
                .unwrap_or(rates.sea_freight.lcl_base)
        })
        .sum()
}

fn per_container_total(
    table: &PerContainer<f64>,
    containers: &[ContainerType],
    lcl_flat: f64,
) -> f64 {
    containers
        .iter()
        .map(|container| table.get(*container).copied().unwrap_or(lcl_flat))
        .sum()
}

/// Qatar clearance breakdown in QAR for a container plan and the declared
/// CIF/invoice values.
///
/// Fails fast if any produced field is NaN or negative; that points at a
/// malformed rate table, not at user input.
pub fn qatar_fees(
    containers: &[ContainerType],
    cif_value_qar: f64,
    invoice_value_qar: f64,
    rates: &RateTable,
) -> Result<QatarCharges, RateError> {
    let clearance = &rates.qatar_clearance;

    let charges = QatarCharges {
        customs_duty: cif_value_qar * clearance.customs_duty_rate,
        mwani_charges: clearance.mwani_charges,
        delivery_order_fees: per_container_total(
            &clearance.delivery_order,
            containers,
            LCL_DELIVERY_ORDER_QAR,
        ),
        terminal_handling: per_container_total(
            &clearance.terminal_handling,
            containers,
            LCL_TERMINAL_HANDLING_QAR,
        ),
        container_return: per_container_total(
            &clearance.container_return,
            containers,
            LCL_CONTAINER_RETURN_QAR,
        ),
        container_maintenance: per_container_total(
            &clearance.container_maintenance,
            containers,
            LCL_CONTAINER_MAINTENANCE_QAR,
        ),
        terminal_inspection: clearance.terminal_inspection,
        inspection_charge: clearance.inspection_charge,
        clearance_agent_fees: clearance.clearance_agent_fees,
        document_attestation: mofa_fee(invoice_value_qar, rates),
        local_transport: rates.local_transport,
    };

    charges.validate()?;
    Ok(charges)
}
