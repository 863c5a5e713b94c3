use argh::FromArgs;
use std::path::PathBuf;
use weather_insights::{ParquetSink, PipelineConfig, WeatherInsights, WeatherInsightsError};

#[derive(FromArgs)]
/// Aggregate Open-Meteo temperatures for a list of cities and store the selected locations
struct Args {
    /// path to a JSON configuration file, defaults are used when omitted
    #[argh(option, short = 'c')]
    config: Option<PathBuf>,

    /// directory receiving the parquet tables, defaults to the platform data directory
    #[argh(option, short = 'o')]
    output_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), WeatherInsightsError> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let sink = match args.output_dir {
        Some(dir) => ParquetSink::new(dir),
        None => ParquetSink::in_default_dir()?,
    };

    let insights = WeatherInsights::new(config)?;
    let tables = insights.run().call().await?;
    insights.load(&tables, &sink).await?;

    log::info!(
        "Stored {} location(s) in {:?}",
        tables.len(),
        sink.table_path(&insights.config().insights_table)
    );
    Ok(())
}
