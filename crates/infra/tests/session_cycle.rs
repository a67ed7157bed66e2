use reorderlab_ai::TrainingConfig;
use reorderlab_infra::{read_csv, to_csv_string, Dashboard, Session, SessionState};
use reorderlab_inventory::generate;

fn session() -> Session {
    Session::new(150, TrainingConfig::default())
}

#[test]
fn full_cycle_scores_every_product() {
    let mut session = session();
    let labels_before: Vec<u8> = session.products().iter().map(|p| p.reorder_label()).collect();

    let report = session.train().expect("training succeeds");

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(report.train_size, 120);
    assert_eq!(report.validation_size, 30);
    assert_eq!(report.epochs.len(), 80);
    assert!(report.final_loss.is_finite());

    let products = session.products();
    assert_eq!(products.len(), 150);
    for (p, label) in products.iter().zip(&labels_before) {
        assert_eq!(p.reorder_label(), *label);
        let score = p.prediction_score().expect("scored");
        assert!((0.0..=1.0).contains(&score));
        assert_eq!(p.predicted_label(), Some(u8::from(score > 0.5)));
    }

    let agreement = Dashboard::from_records(products).agreement().expect("comparison");
    assert!(agreement > 0.9, "agreement {agreement}");
}

#[test]
fn retraining_replaces_every_prediction() {
    const SENTINEL: f64 = 0.123_456_789;
    let seeded = generate(150).into_iter().map(|r| r.with_prediction(SENTINEL)).collect();
    let mut session = Session::with_products(seeded, TrainingConfig::default());

    session.train().unwrap();
    let first = current_scores(&session);

    session.train().unwrap();
    let second = current_scores(&session);

    assert_eq!(second.len(), 150);
    assert!(second.iter().all(|&score| score != SENTINEL));
    // same seed, same features: stale scores on the input change nothing
    assert_eq!(first, second);
}

#[test]
fn retraining_scored_products_under_a_new_seed_replaces_scores() {
    let mut first = session();
    first.train().unwrap();
    let first_scores = current_scores(&first);

    let reseeded = TrainingConfig {
        seed: 7,
        ..TrainingConfig::default()
    };
    let mut second = Session::with_products(first.products().to_vec(), reseeded);
    second.train().unwrap();
    let second_scores = current_scores(&second);

    assert_eq!(second_scores.len(), 150);
    assert_ne!(first_scores, second_scores);
}

/// Scores on the session's records, each checked against the installed model.
fn current_scores(session: &Session) -> Vec<f64> {
    let model = session.model().expect("model installed");
    session
        .products()
        .iter()
        .map(|p| {
            let score = p.prediction_score().expect("scored");
            assert_eq!(score, model.score(p).unwrap());
            score
        })
        .collect()
}

#[test]
fn exported_table_round_trips() {
    let mut session = session();
    session.train().unwrap();

    let csv = to_csv_string(session.products()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("id,name,currentInventory,avgSalesPerWeek,daysToReplenish,serverReorder,prediction,predictionScore")
    );
    assert_eq!(lines.count(), 150);

    let rows = read_csv(csv.as_bytes()).unwrap();
    assert_eq!(rows.len(), 150);
    for (row, product) in rows.iter().zip(session.products()) {
        assert!(row.matches(product), "row {} differs", row.id);
        assert_eq!(row.name, product.name());
        assert_eq!(row.prediction, product.predicted_label());
        let (exported, exact) = (row.prediction_score.unwrap(), product.prediction_score().unwrap());
        assert!((exported - exact).abs() <= 5e-5);
    }
}

#[test]
fn dashboard_tracks_session_lifecycle() {
    let mut session = session();
    let before = Dashboard::from_records(session.products());
    assert_eq!(before.total, 150);
    assert_eq!(before.rule_reorders, 36);
    assert!(before.model.is_none());

    session.train().unwrap();
    let after = Dashboard::from_records(session.products());
    let model = after.model.as_ref().expect("comparison after training");
    assert_eq!(after.rule_reorders, 36);
    assert_eq!(
        model.true_positive + model.false_positive + model.true_negative + model.false_negative,
        150
    );
    assert_eq!(model.disagreements.len(), model.false_positive + model.false_negative);
}
