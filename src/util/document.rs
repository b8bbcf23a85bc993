//! Versioned quotation documents: validation, string-level import/export,
//! and the boundary adapter that turns duck-typed raw items into the one
//! canonical shape the engine sees.

use semver::Version;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{
    AmountMode, ContainerChoice, CostLine, PricingMode, QuoteItem, QuoteSettings, RateOverrides,
};
use crate::util::generate_id;
use crate::util::numeric::parse_number_input;

/// Document format version written by [`export_document`].
pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid data format")]
    NotAnObject,
    #[error("items data is missing or invalid")]
    MissingItems,
    #[error("settings data is missing or invalid")]
    MissingSettings,
    #[error("item {0} is missing required fields")]
    IncompleteItem(usize),
    #[error("unsupported document version `{0}`")]
    UnsupportedVersion(String),
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to format export timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
}

/// Everything a quotation document carries, adapted to canonical shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedQuote {
    pub items: Vec<QuoteItem>,
    pub settings: QuoteSettings,
    pub overrides: RateOverrides,
    /// Free-text metadata for the downstream renderers; the engine
    /// ignores both.
    pub report_name: String,
    pub manufacturer_name: String,
}

/// Structural checks on a parsed document: `items` must be an array,
/// `settings` an object, and every item needs a quantity, a price under
/// either field name, and a volume per unit. Item indices in errors are
/// 1-based, matching what users see in the form.
pub fn validate_document(value: &Value) -> Result<(), DocumentError> {
    let Some(object) = value.as_object() else {
        return Err(DocumentError::NotAnObject);
    };
    let Some(items) = object.get("items").and_then(Value::as_array) else {
        return Err(DocumentError::MissingItems);
    };
    if !object.get("settings").map(Value::is_object).unwrap_or(false) {
        return Err(DocumentError::MissingSettings);
    }
    for (index, item) in items.iter().enumerate() {
        let Some(fields) = item.as_object() else {
            return Err(DocumentError::IncompleteItem(index + 1));
        };
        let has_price = fields.contains_key("unitPrice") || fields.contains_key("exwPrice");
        if !fields.contains_key("quantity") || !has_price || !fields.contains_key("cbmPerUnit") {
            return Err(DocumentError::IncompleteItem(index + 1));
        }
    }
    Ok(())
}

/// Parse, validate and adapt a JSON quotation document.
pub fn import_document(json: &str) -> Result<ImportedQuote, DocumentError> {
    let value: Value = serde_json::from_str(json)?;
    validate_document(&value)?;
    check_version(&value)?;

    let object = value.as_object().ok_or(DocumentError::NotAnObject)?;
    let items = object
        .get("items")
        .and_then(Value::as_array)
        .map(|raw| raw.iter().map(adapt_item).collect())
        .unwrap_or_default();
    let settings = object
        .get("settings")
        .map(adapt_settings)
        .unwrap_or_default();
    let overrides = match object.get("overrides") {
        Some(raw) if raw.is_object() => serde_json::from_value(raw.clone())?,
        _ => RateOverrides::default(),
    };

    Ok(ImportedQuote {
        items,
        settings,
        overrides,
        report_name: string_field(object.get("reportName")),
        manufacturer_name: string_field(object.get("manufacturerName")),
    })
}

/// Adapt one raw item to the canonical shape.
///
/// This is the only place the legacy `exwPrice` field name is understood:
/// the current `unitPrice` wins whenever it is present. Every numeric
/// field goes through the lenient normalizer, and missing or non-array
/// certification / fixed-cost lists become empty ones.
pub fn adapt_item(raw: &Value) -> QuoteItem {
    let Some(fields) = raw.as_object() else {
        return QuoteItem {
            id: generate_id("item"),
            ..QuoteItem::default()
        };
    };

    let price = fields
        .get("unitPrice")
        .or_else(|| fields.get("exwPrice"))
        .map(parse_number_input)
        .unwrap_or(0.0);

    QuoteItem {
        id: item_id(fields.get("id")),
        description: string_field(fields.get("description")),
        quantity: number_field(fields.get("quantity")),
        unit_price: price,
        cbm_per_unit: number_field(fields.get("cbmPerUnit")),
        weight_per_unit: number_field(fields.get("weightPerUnit")),
        certifications: cost_lines(fields.get("certifications")),
        fixed_costs: cost_lines(fields.get("fixedCosts")),
    }
}

/// Adapt raw settings, falling back to the defaults field by field.
/// Mode labels parse leniently and case-insensitively.
pub fn adapt_settings(raw: &Value) -> QuoteSettings {
    let defaults = QuoteSettings::default();
    let Some(fields) = raw.as_object() else {
        return defaults;
    };
    QuoteSettings {
        pricing_mode: fields
            .get("pricingMode")
            .and_then(Value::as_str)
            .map(PricingMode::from_label)
            .unwrap_or(defaults.pricing_mode),
        container_type: fields
            .get("containerType")
            .and_then(Value::as_str)
            .map(ContainerChoice::from_label)
            .unwrap_or(defaults.container_type),
        profit_margin: optional_number(fields.get("profitMargin")).unwrap_or(defaults.profit_margin),
        profit_margin_mode: fields
            .get("profitMarginMode")
            .and_then(Value::as_str)
            .map(AmountMode::from_label)
            .unwrap_or(defaults.profit_margin_mode),
        commission_rate: optional_number(fields.get("commissionRate"))
            .unwrap_or(defaults.commission_rate),
        commission_mode: fields
            .get("commissionMode")
            .and_then(Value::as_str)
            .map(AmountMode::from_label)
            .unwrap_or(defaults.commission_mode),
    }
}

fn check_version(value: &Value) -> Result<(), DocumentError> {
    let raw = value
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or(DOCUMENT_VERSION);
    let version = parse_loose_version(raw)
        .ok_or_else(|| DocumentError::UnsupportedVersion(raw.to_string()))?;
    if version.major != 1 {
        return Err(DocumentError::UnsupportedVersion(raw.to_string()));
    }
    Ok(())
}

/// Accepts loose tags like "1.0" or "v1" by padding to full semver.
fn parse_loose_version(input: &str) -> Option<Version> {
    let trimmed = input.trim().trim_start_matches(['v', 'V']);
    let mut candidate = trimmed.to_string();
    for _ in 0..3 {
        if let Ok(version) = Version::parse(&candidate) {
            return Some(version);
        }
        candidate.push_str(".0");
    }
    None
}

fn number_field(value: Option<&Value>) -> f64 {
    value.map(parse_number_input).unwrap_or(0.0)
}

/// Missing and `null` are "use the default", unlike `0` which is a value.
fn optional_number(value: Option<&Value>) -> Option<f64> {
    match value {
        None | Some(Value::Null) => None,
        Some(raw) => Some(parse_number_input(raw)),
    }
}

fn string_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Item ids may be strings or bare numbers (legacy exports used epoch
/// millis); anything else gets a fresh generated id.
fn item_id(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => generate_id("item"),
    }
}

fn cost_lines(value: Option<&Value>) -> Vec<CostLine> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let fields = entry.as_object()?;
            Some(CostLine {
                name: string_field(fields.get("name")),
                cost: number_field(fields.get("cost")),
            })
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedDocument<'a> {
    version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    report_name: &'a str,
    manufacturer_name: &'a str,
    items: &'a [QuoteItem],
    settings: &'a QuoteSettings,
    overrides: &'a RateOverrides,
}

/// Serialize the current quotation to a pretty-printed JSON document that
/// [`import_document`] round-trips. The caller supplies the timestamp;
/// this library never reads a clock.
pub fn export_document(
    items: &[QuoteItem],
    settings: &QuoteSettings,
    overrides: &RateOverrides,
    report_name: &str,
    manufacturer_name: &str,
    exported_at: OffsetDateTime,
) -> Result<String, DocumentError> {
    let document = ExportedDocument {
        version: DOCUMENT_VERSION,
        timestamp: Some(exported_at.format(&Rfc3339)?),
        report_name,
        manufacturer_name,
        items,
        settings,
        overrides,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// A filled-in sample document for first-time users: two items with
/// certifications and fixed costs, default settings, empty overrides.
pub fn generate_template() -> Result<String, DocumentError> {
    let items = vec![
        QuoteItem {
            id: "sample-1".to_string(),
            description: "Sample Product A".to_string(),
            quantity: 100.0,
            unit_price: 12.5,
            cbm_per_unit: 0.15,
            weight_per_unit: 5.0,
            certifications: vec![
                CostLine {
                    name: "CE Certification".to_string(),
                    cost: 150.0,
                },
                CostLine {
                    name: "FDA Approval".to_string(),
                    cost: 200.0,
                },
            ],
            fixed_costs: vec![
                CostLine {
                    name: "Tooling".to_string(),
                    cost: 500.0,
                },
                CostLine {
                    name: "Sample Production".to_string(),
                    cost: 100.0,
                },
            ],
        },
        QuoteItem {
            id: "sample-2".to_string(),
            description: "Sample Product B".to_string(),
            quantity: 200.0,
            unit_price: 8.75,
            cbm_per_unit: 0.08,
            weight_per_unit: 3.0,
            certifications: Vec::new(),
            fixed_costs: Vec::new(),
        },
    ];
    let document = ExportedDocument {
        version: DOCUMENT_VERSION,
        timestamp: None,
        report_name: "ABC Trading Company",
        manufacturer_name: "Guangzhou Manufacturing Co., Ltd.",
        items: &items,
        settings: &QuoteSettings::default(),
        overrides: &RateOverrides::default(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
