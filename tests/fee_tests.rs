use ddp_cost_engine::domain::{
    container_utilization, mofa_fee, qatar_fees, sea_freight, select_containers,
};
use ddp_cost_engine::{ContainerType, MofaTier, RateError, RateOverrides, RateTable};

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn mofa_fee_tier_boundaries() {
    let rates = RateTable::default();
    // 150 QAR certificate of origin on top of every tier.
    assert_close(mofa_fee(10_000.0, &rates), 650.0, 1e-9);
    assert_close(mofa_fee(14_999.0, &rates), 650.0, 1e-9);
    assert_close(mofa_fee(15_000.0, &rates), 650.0, 1e-9);
    assert_close(mofa_fee(15_001.0, &rates), 1150.0, 1e-9);
    assert_close(mofa_fee(50_000.0, &rates), 1150.0, 1e-9);
    assert_close(mofa_fee(100_000.0, &rates), 1150.0, 1e-9);
    assert_close(mofa_fee(100_001.0, &rates), 2650.0, 1e-9);
    assert_close(mofa_fee(250_000.0, &rates), 2650.0, 1e-9);
    assert_close(mofa_fee(250_001.0, &rates), 5150.0, 1e-9);
    assert_close(mofa_fee(1_000_000.0, &rates), 5150.0, 1e-9);
    // Above 1M the fee is 0.6% of the invoice value.
    assert_close(mofa_fee(2_000_000.0, &rates), 150.0 + 12_000.0, 1e-9);
}

#[test]
fn sea_freight_sums_per_container_rates() {
    let rates = RateTable::default();
    assert_close(sea_freight(&[ContainerType::Gp20], &rates), 1800.0, 1e-9);
    assert_close(sea_freight(&[ContainerType::Lcl], &rates), 800.0, 1e-9);
    assert_close(
        sea_freight(&[ContainerType::Hc40, ContainerType::Gp20], &rates),
        5200.0,
        1e-9,
    );
    assert_close(
        sea_freight(
            &[ContainerType::Hc40, ContainerType::Gp40, ContainerType::Lcl],
            &rates,
        ),
        7400.0,
        1e-9,
    );
}

#[test]
fn container_selection_is_deterministic() {
    let specs = RateTable::default().container_specs;

    assert_eq!(select_containers(0.0, &specs), vec![ContainerType::Lcl]);
    assert_eq!(select_containers(5.0, &specs), vec![ContainerType::Lcl]);
    assert_eq!(select_containers(15.0, &specs), vec![ContainerType::Lcl]);
    assert_eq!(select_containers(33.0, &specs), vec![ContainerType::Gp20]);
    // Just above 20GP capacity a single 40GP beats a 20GP + LCL split.
    assert_eq!(select_containers(35.0, &specs), vec![ContainerType::Gp40]);
    assert_eq!(select_containers(39.0, &specs), vec![ContainerType::Gp40]);
    assert_eq!(
        select_containers(40.0, &specs),
        vec![ContainerType::Gp20, ContainerType::Lcl]
    );
    assert_eq!(select_containers(67.0, &specs), vec![ContainerType::Gp40]);
    assert_eq!(select_containers(76.0, &specs), vec![ContainerType::Hc40]);
    assert_eq!(
        select_containers(100.0, &specs),
        vec![ContainerType::Hc40, ContainerType::Gp20]
    );

    // Large shipments: full boxes largest-first, one container for the
    // 7 CBM remainder.
    assert_eq!(
        select_containers(150.0, &specs),
        vec![ContainerType::Hc40, ContainerType::Gp40, ContainerType::Lcl]
    );
    // 230 = 76 * 3 + 2: the tail rides loose.
    assert_eq!(
        select_containers(230.0, &specs),
        vec![
            ContainerType::Hc40,
            ContainerType::Hc40,
            ContainerType::Hc40,
            ContainerType::Lcl
        ]
    );
}

#[test]
fn utilization_counts_lcl_as_leftover_only() {
    let specs = RateTable::default().container_specs;

    // Loose-only plans are always fully utilized.
    assert_close(
        container_utilization(&[ContainerType::Lcl], 5.0, &specs),
        100.0,
        1e-9,
    );
    // 100 CBM in 76 + 33 of sealed capacity.
    assert_close(
        container_utilization(&[ContainerType::Hc40, ContainerType::Gp20], 100.0, &specs),
        100.0 / 109.0 * 100.0,
        1e-6,
    );
    // A sealed box plus leftover loose cargo: capacity is 76 + 4.
    assert_close(
        container_utilization(&[ContainerType::Hc40, ContainerType::Lcl], 80.0, &specs),
        100.0,
        1e-9,
    );
    // No volume, no utilization.
    assert_close(container_utilization(&[ContainerType::Lcl], 0.0, &specs), 0.0, 1e-9);
}

#[test]
fn qatar_fees_accumulate_per_container_tariffs() {
    let rates = RateTable::default();
    let containers = [ContainerType::Hc40, ContainerType::Gp20];
    let charges = qatar_fees(&containers, 100_000.0, 80_000.0, &rates)
        .expect("default rates must validate");

    assert_close(charges.customs_duty, 5000.0, 1e-9);
    assert_close(charges.delivery_order_fees, 1100.0 + 650.0, 1e-9);
    assert_close(charges.terminal_handling, 1100.0 + 650.0, 1e-9);
    assert_close(charges.container_return, 380.0 + 150.0, 1e-9);
    assert_close(charges.container_maintenance, 40.04 + 20.02, 1e-9);
    assert_close(charges.document_attestation, 1150.0, 1e-9);
    assert_close(charges.mwani_charges, 160.0, 1e-9);
    assert_close(charges.local_transport, 800.0, 1e-9);

    let field_sum: f64 = charges.fields().iter().map(|(_, value)| value).sum();
    assert_close(charges.total(), field_sum, 1e-9);
}

#[test]
fn qatar_fees_use_flat_approximations_for_lcl() {
    let rates = RateTable::default();
    let charges = qatar_fees(&[ContainerType::Lcl], 10_000.0, 8_000.0, &rates)
        .expect("default rates must validate");

    assert_close(charges.delivery_order_fees, 200.0, 1e-9);
    assert_close(charges.terminal_handling, 300.0, 1e-9);
    assert_close(charges.container_return, 50.0, 1e-9);
    assert_close(charges.container_maintenance, 10.0, 1e-9);
}

#[test]
fn qatar_fees_reject_non_finite_and_negative_fields() {
    let mut rates = RateTable::default();
    rates.qatar_clearance.customs_duty_rate = f64::NAN;
    let error = qatar_fees(&[ContainerType::Gp20], 1000.0, 1000.0, &rates)
        .expect_err("NaN duty must fail fast");
    assert!(matches!(error, RateError::NonFiniteFee { .. }));

    let mut rates = RateTable::default();
    rates.qatar_clearance.mwani_charges = -1.0;
    let error = qatar_fees(&[ContainerType::Gp20], 1000.0, 1000.0, &rates)
        .expect_err("negative fee must fail fast");
    assert!(matches!(error, RateError::NegativeFee { .. }));
}

#[test]
fn rate_table_validation_catches_bad_overrides() {
    let rates = RateTable::default();
    assert!(rates.validate().is_ok());

    let merged = rates.with_overrides(&RateOverrides {
        certification_cost: Some(f64::NAN),
        ..RateOverrides::default()
    });
    assert!(matches!(
        merged.validate(),
        Err(RateError::InvalidField { .. })
    ));

    let merged = rates.with_overrides(&RateOverrides {
        usd_to_qar: Some(0.0),
        ..RateOverrides::default()
    });
    assert!(matches!(
        merged.validate(),
        Err(RateError::NonPositiveExchangeRate(_))
    ));
}

#[test]
fn attestation_schedule_must_end_unbounded() {
    let rates = RateTable::default();

    let merged = rates.with_overrides(&RateOverrides {
        mofa_tiers: Some(vec![MofaTier {
            max_invoice_value: Some(15_000.0),
            fee: Some(500.0),
            percentage: None,
        }]),
        ..RateOverrides::default()
    });
    assert!(matches!(
        merged.validate(),
        Err(RateError::MissingUnboundedTier)
    ));

    let merged = rates.with_overrides(&RateOverrides {
        mofa_tiers: Some(Vec::new()),
        ..RateOverrides::default()
    });
    assert!(matches!(merged.validate(), Err(RateError::EmptyFeeSchedule)));
}

#[test]
fn customs_duty_rate_override_targets_the_clearance_table() {
    let merged = RateTable::default().with_overrides(&RateOverrides {
        customs_duty_rate: Some(0.1),
        ..RateOverrides::default()
    });
    assert_close(merged.qatar_clearance.customs_duty_rate, 0.1, 1e-12);

    let charges = qatar_fees(&[ContainerType::Gp20], 10_000.0, 10_000.0, &merged)
        .expect("overridden table must validate");
    assert_close(charges.customs_duty, 1000.0, 1e-9);
}
