//! Landed-cost (DDP) engine for multi-item China-to-Qatar shipments.
//!
//! Given per-item price/volume/weight, business rate tables and a set of
//! per-calculation overrides, the engine derives total shipment cost, a
//! container-loading plan with utilization, and a per-item cost allocation
//! that sums back to the aggregate, under EXW/FOB/CIF pricing and
//! percentage or fixed margin/commission modes.
//!
//! The whole pipeline is pure and synchronous: no I/O, no clock, no global
//! state. Import/export of quotation documents works at the string level;
//! memoization lives in an explicit [`CachedCalculator`] owned by the
//! caller.

pub mod domain;
pub mod util;

pub use domain::{
    calculate_landed_cost, AmountMode, CachedCalculator, ContainerChoice, ContainerSpec,
    ContainerType, CostBreakdown, CostLine, ItemBreakdown, MofaTier, PerContainer, PricingMode,
    QatarCharges, QatarClearanceRates, QuoteItem, QuoteResult, QuoteSettings, RateError,
    RateOverrides, RateTable, SeaFreightRates, ShipmentSummary,
};
pub use util::document::{
    export_document, generate_template, import_document, validate_document, DocumentError,
    ImportedQuote, DOCUMENT_VERSION,
};
pub use util::numeric::{parse_number_input, parse_number_str};
