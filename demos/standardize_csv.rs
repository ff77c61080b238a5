//! Drop identifier columns from a CSV file and standardize the rest.
//!
//! Usage: `cargo run --example standardize_csv -- data.csv id,name`

use pipeline_transforms::data::Frame;
use pipeline_transforms::preprocessing::{
    DropColumns, PersistableTransformer, Pipeline, StandardScaler, UnknownColumns,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: standardize_csv <file.csv> [col1,col2,...]")?;
    let drop: Vec<String> = args
        .next()
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let frame = Frame::from_csv_path(&path)?;
    println!("Loaded {} rows x {} columns", frame.shape().0, frame.shape().1);

    let mut pipeline = Pipeline::new()
        .add_drop_columns(DropColumns::new(drop).on_unknown(UnknownColumns::Ignore))
        .add_standard_scaler(StandardScaler::new());
    pipeline.fit(&frame)?;
    let out = pipeline.transform(&frame)?;

    println!("{}", out.columns().join(","));
    for row in out.values().rows() {
        let cells: Vec<String> = row.iter().map(|v| format!("{:.4}", v)).collect();
        println!("{}", cells.join(","));
    }

    println!("\nFitted pipeline:\n{}", pipeline.to_json()?);
    Ok(())
}
