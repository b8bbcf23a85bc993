//! Container plan selection and utilization for a shipment volume.

use super::entities::ContainerType;
use super::rates::{ContainerSpec, PerContainer};

/// Shipments at or below this volume always ship loose; a sealed box is
/// never worth booking for them.
pub const LCL_THRESHOLD_CBM: f64 = 15.0;

/// A single 40GP is preferred over a 20GP + LCL split as long as the total
/// volume stays within this factor of the 20GP capacity.
const SINGLE_40GP_STRETCH: f64 = 1.2;

/// Pick a container multiset for the given total volume.
///
/// Small shipments go LCL, mid-size shipments get the single box they fit
/// in, and everything else is packed greedily largest-first with at most
/// one partially-filled container for the remainder.
pub fn select_containers(
    total_cbm: f64,
    specs: &PerContainer<ContainerSpec>,
) -> Vec<ContainerType> {
    if total_cbm <= LCL_THRESHOLD_CBM {
        return vec![ContainerType::Lcl];
    }
    if total_cbm <= specs.gp20.cbm {
        return vec![ContainerType::Gp20];
    }
    // Just above 20GP capacity, a barely-larger 40GP beats an awkward
    // 20GP + LCL split.
    if total_cbm <= specs.gp40.cbm && total_cbm <= specs.gp20.cbm * SINGLE_40GP_STRETCH {
        return vec![ContainerType::Gp40];
    }

    let mut containers = Vec::new();
    let mut remaining = total_cbm;
    while remaining > 0.0 {
        if remaining >= specs.hc40.cbm {
            containers.push(ContainerType::Hc40);
            remaining -= specs.hc40.cbm;
        } else if remaining >= specs.gp40.cbm {
            containers.push(ContainerType::Gp40);
            remaining -= specs.gp40.cbm;
        } else if remaining >= specs.gp20.cbm {
            containers.push(ContainerType::Gp20);
            remaining -= specs.gp20.cbm;
        } else {
            // One more container for whatever is left.
            if remaining > specs.gp40.cbm / 2.0 {
                containers.push(ContainerType::Hc40);
            } else if remaining > specs.gp20.cbm / 2.0 {
                containers.push(ContainerType::Gp20);
            } else {
                containers.push(ContainerType::Lcl);
            }
            break;
        }
    }
    containers
}

/// Utilization percentage of the booked plan.
///
/// Sealed containers count their full rated capacity. An LCL entry counts
/// only the leftover volume beyond the sealed capacity, since loose cargo
/// has no rated capacity of its own and is always 100% "utilized".
pub fn container_utilization(
    containers: &[ContainerType],
    total_cbm: f64,
    specs: &PerContainer<ContainerSpec>,
) -> f64 {
    let sealed_capacity: f64 = containers
        .iter()
        .filter_map(|container| specs.get(*container))
        .map(|spec| spec.cbm)
        .sum();

    let mut total_capacity = sealed_capacity;
    if containers.contains(&ContainerType::Lcl) {
        total_capacity += total_cbm - sealed_capacity;
    }

    if total_capacity > 0.0 {
        total_cbm / total_capacity * 100.0
    } else {
        0.0
    }
}
