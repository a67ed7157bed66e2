use anyhow::Context;

use reorderlab_infra::{write_csv_file, Dashboard, DemoConfig, Session};

const PREVIEW_ROWS: usize = 10;

fn main() -> anyhow::Result<()> {
    let config = DemoConfig::from_env().context("loading configuration")?;
    reorderlab_observability::init(config.log_format);

    let mut session = Session::new(config.product_count, config.training.clone());
    tracing::info!(products = session.products().len(), "dataset generated");

    let report = session.train().context("training cycle")?;
    let dashboard = Dashboard::from_records(session.products());

    println!("products:            {}", dashboard.total);
    println!("rule reorders:       {}", dashboard.rule_reorders);
    if let Some(model_reorders) = dashboard.model_reorders() {
        println!("model reorders:      {model_reorders}");
    }
    if let Some(agreement) = dashboard.agreement() {
        println!("agreement:           {:.1}%", agreement * 100.0);
    }
    match report.validation_accuracy {
        Some(acc) => println!("validation accuracy: {:.1}%", acc * 100.0),
        None => println!("validation accuracy: n/a"),
    }
    println!("final loss:          {:.4}", report.final_loss);
    println!();

    println!("{:>4}  {:<14} {:>8} {:>8} {:>5} {:>5} {:>6} {:>7}", "id", "name", "stock", "avg/wk", "days", "rule", "model", "score");
    for p in session.products().iter().take(PREVIEW_ROWS) {
        println!(
            "{:>4}  {:<14} {:>8} {:>8} {:>5} {:>5} {:>6} {:>7}",
            p.id(),
            p.name(),
            p.current_inventory(),
            p.avg_sales_per_week(),
            p.days_to_replenish(),
            p.reorder_label(),
            p.predicted_label().map_or_else(|| "-".to_string(), |l| l.to_string()),
            p.prediction_score().map_or_else(|| "-".to_string(), |s| format!("{s:.4}")),
        );
    }

    if let Some(path) = &config.export_path {
        write_csv_file(path, session.products())
            .with_context(|| format!("exporting to {}", path.display()))?;
        tracing::info!(path = %path.display(), "table exported");
    }

    Ok(())
}
