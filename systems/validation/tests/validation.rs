use fortune_wheel_core::{
    Prize, PrizeId, PrizeSet, SelectionModel, ValidationIssue, ValidationWarning,
};
use fortune_wheel_system_validation::validate;

fn probability_set(odds: &[f64]) -> PrizeSet {
    PrizeSet::new(
        odds.iter()
            .enumerate()
            .map(|(index, probability)| {
                Prize::new(PrizeId::new(index as u32 + 1), format!("Prize {index}"))
                    .with_probability(*probability)
            })
            .collect(),
    )
}

fn weight_set(odds: &[f64]) -> PrizeSet {
    PrizeSet::new(
        odds.iter()
            .enumerate()
            .map(|(index, weight)| {
                Prize::new(PrizeId::new(index as u32 + 1), format!("Prize {index}"))
                    .with_weight(*weight)
            })
            .collect(),
    )
}

#[test]
fn probabilities_summing_to_one_hundred_are_valid() {
    let cases: [&[f64]; 4] = [
        &[50.0, 50.0],
        &[5.0, 15.0, 30.0, 50.0],
        &[33.33, 33.33, 33.34],
        &[33.333, 33.333, 33.333],
    ];

    for odds in cases {
        let report = validate(&probability_set(odds), SelectionModel::Probability);
        assert!(report.is_valid(), "{odds:?} should validate: {report:?}");
        assert!(report.errors().is_empty());
    }
}

#[test]
fn probability_sum_outside_tolerance_is_rejected() {
    let report = validate(&probability_set(&[50.0, 49.9]), SelectionModel::Probability);

    assert!(!report.is_valid());
    assert!(
        matches!(
            report.errors(),
            [ValidationIssue::ProbabilityTotal { total }] if (*total - 99.9).abs() < 1e-9
        ),
        "unexpected errors: {:?}",
        report.errors(),
    );
}

#[test]
fn zero_total_weight_is_rejected_with_weight_message() {
    let report = validate(&weight_set(&[0.0, 0.0]), SelectionModel::Weight);

    assert!(!report.is_valid());
    assert!(report.errors().contains(&ValidationIssue::ZeroTotalWeight));
    assert!(report
        .errors()
        .iter()
        .any(|issue| issue.to_string().contains("weight")));
}

#[test]
fn negative_weight_is_rejected() {
    let report = validate(&weight_set(&[3.0, -1.0]), SelectionModel::Weight);

    assert!(!report.is_valid());
    assert_eq!(
        report.errors(),
        &[ValidationIssue::InvalidWeight { index: 1 }]
    );
}

#[test]
fn empty_set_reports_a_single_error() {
    let report = validate(&PrizeSet::default(), SelectionModel::Probability);

    assert!(!report.is_valid());
    assert_eq!(report.errors(), &[ValidationIssue::EmptyPrizeSet]);
    assert!(report.warnings().is_empty());
}

#[test]
fn zero_and_duplicate_ids_are_rejected() {
    let prizes = PrizeSet::new(vec![
        Prize::new(PrizeId::new(0), "zero").with_probability(20.0),
        Prize::new(PrizeId::new(4), "four").with_probability(40.0),
        Prize::new(PrizeId::new(4), "again").with_probability(40.0),
    ]);

    let report = validate(&prizes, SelectionModel::Probability);

    assert!(!report.is_valid());
    assert_eq!(
        report.errors(),
        &[
            ValidationIssue::NonPositiveId { index: 0 },
            ValidationIssue::DuplicateId {
                index: 2,
                id: PrizeId::new(4),
            },
        ]
    );
}

#[test]
fn missing_display_value_is_rejected() {
    let mut prizes = probability_set(&[50.0, 50.0]).as_slice().to_vec();
    prizes[1].display_value = None;

    let report = validate(&PrizeSet::new(prizes), SelectionModel::Probability);

    assert_eq!(
        report.errors(),
        &[ValidationIssue::MissingDisplayValue { index: 1 }]
    );
}

#[test]
fn probability_mode_ignores_weights_and_vice_versa() {
    let prizes = PrizeSet::new(vec![
        Prize::new(PrizeId::new(1), "a")
            .with_probability(60.0)
            .with_weight(0.0),
        Prize::new(PrizeId::new(2), "b")
            .with_probability(40.0)
            .with_weight(0.0),
    ]);

    assert!(validate(&prizes, SelectionModel::Probability).is_valid());
    assert!(!validate(&prizes, SelectionModel::Weight).is_valid());
}

#[test]
fn missing_probability_is_flagged_per_prize() {
    let prizes = PrizeSet::new(vec![
        Prize::new(PrizeId::new(1), "a").with_probability(100.0),
        Prize::new(PrizeId::new(2), "b"),
    ]);

    let report = validate(&prizes, SelectionModel::Probability);

    assert_eq!(
        report.errors(),
        &[ValidationIssue::InvalidProbability { index: 1 }]
    );
}

#[test]
fn size_warnings_keep_the_set_valid() {
    let single = validate(&probability_set(&[100.0]), SelectionModel::Probability);
    assert!(single.is_valid());
    assert_eq!(
        single.warnings(),
        &[ValidationWarning::TooFewPrizes { count: 1 }]
    );

    let crowded = validate(&weight_set(&[1.0; 13]), SelectionModel::Weight);
    assert!(crowded.is_valid());
    assert_eq!(
        crowded.warnings(),
        &[ValidationWarning::TooManyPrizes { count: 13 }]
    );
}

#[test]
fn report_serializes_for_callers() {
    let report = validate(&weight_set(&[0.0]), SelectionModel::Weight);
    let json = serde_json::to_value(&report).expect("report serializes");

    assert_eq!(json["is_valid"], serde_json::json!(false));
    assert_eq!(json["errors"][0], serde_json::json!("zero_total_weight"));
    assert_eq!(
        json["warnings"][0]["too_few_prizes"]["count"],
        serde_json::json!(1)
    );
}

#[test]
fn overflowing_weight_total_is_invalid() {
    let report = validate(&weight_set(&[f64::MAX, f64::MAX]), SelectionModel::Weight);

    assert!(!report.is_valid());
    assert_eq!(report.errors(), &[ValidationIssue::NonFiniteTotalWeight]);
    assert!(ValidationIssue::NonFiniteTotalWeight
        .to_string()
        .contains("weight"));
}
