//! Domain logic for landed-cost calculation lives here.

pub mod allocation;
pub mod containers;
pub mod entities;
pub mod fees;
pub mod memo;
pub mod rates;

pub use allocation::calculate_landed_cost;
pub use containers::{container_utilization, select_containers, LCL_THRESHOLD_CBM};
pub use entities::{
    AmountMode, ContainerChoice, ContainerType, CostBreakdown, CostLine, ItemBreakdown,
    PricingMode, QatarCharges, QuoteItem, QuoteResult, QuoteSettings, ShipmentSummary,
};
pub use fees::{mofa_fee, qatar_fees, sea_freight};
pub use memo::CachedCalculator;
pub use rates::{
    ContainerSpec, MofaTier, PerContainer, QatarClearanceRates, RateError, RateOverrides,
    RateTable, SeaFreightRates,
};
