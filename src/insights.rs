//! The pipeline entry point: resolve the configured cities, aggregate their hourly
//! temperatures around the run date, enrich the survivors with a year-start snapshot and
//! split the result into the two output tables.

use crate::aggregation::engine::{aggregate_windows, AggregationSettings};
use crate::config::PipelineConfig;
use crate::enrichment::append_historical;
use crate::error::WeatherInsightsError;
use crate::geocoding::nominatim::NominatimGeocoder;
use crate::geocoding::resolver::resolve_cities;
use crate::geocoding::Geocoder;
use crate::output::{split_output, WeatherTables};
use crate::sink::RecordSink;
use crate::types::columns::{LATITUDE, LONGITUDE};
use crate::weather_data::forecast::fetch_forecast_window;
use crate::weather_data::source::{HttpWeatherSource, WeatherSource};
use bon::bon;
use chrono::{Local, NaiveDate};
use log::info;
use polars::prelude::{col, IntoLazy, SortMultipleOptions};

/// Runs the weather insights pipeline against a geocoder and a weather source.
///
/// Every stage is awaited before the next one starts, there is no parallelism inside a run.
///
/// # Examples
///
/// ```rust,no_run
/// # use weather_insights::{PipelineConfig, WeatherInsights, WeatherInsightsError};
/// # async fn run() -> Result<(), WeatherInsightsError> {
/// let insights = WeatherInsights::new(PipelineConfig::default())?;
///
/// let tables = insights.run().call().await?;
/// for record in tables.insight_records()? {
///     println!("{:?}", record);
/// }
/// # Ok(())
/// # }
/// ```
pub struct WeatherInsights {
    config: PipelineConfig,
    geocoder: Box<dyn Geocoder>,
    source: Box<dyn WeatherSource>,
}

#[bon]
impl WeatherInsights {
    /// Creates a pipeline using Nominatim for geocoding and Open-Meteo over HTTP for weather data.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherInsightsError::Config`] if `config` fails validation, or a
    /// resolution/fetch error if an HTTP client cannot be built.
    pub fn new(config: PipelineConfig) -> Result<Self, WeatherInsightsError> {
        let geocoder = NominatimGeocoder::new(&config.geocoding_url, &config.user_agent)?;
        let source = HttpWeatherSource::new()?;
        Self::with_collaborators(config, geocoder, source)
    }

    /// Creates a pipeline with caller supplied collaborators.
    pub fn with_collaborators(
        config: PipelineConfig,
        geocoder: impl Geocoder + 'static,
        source: impl WeatherSource + 'static,
    ) -> Result<Self, WeatherInsightsError> {
        config.validate()?;
        Ok(Self {
            config,
            geocoder: Box::new(geocoder),
            source: Box::new(source),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the pipeline once.
    ///
    /// # Arguments
    ///
    /// * `run_date` - Optional. The day whose local midnight splits the lookback window from
    ///   the forecast window. Defaults to today's local date.
    ///
    /// # Returns
    ///
    /// The city and insight tables, holding the same locations sorted by latitude then longitude.
    /// When no location passes the selection gate, the historical source is not contacted and
    /// both tables are empty.
    ///
    /// # Errors
    ///
    /// Fails on the first stage that fails: an unresolvable city, a failed or malformed
    /// source response, or an output column that cannot be produced.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use weather_insights::{PipelineConfig, WeatherInsights, WeatherInsightsError};
    /// # use chrono::NaiveDate;
    /// # async fn run() -> Result<(), WeatherInsightsError> {
    /// let config = PipelineConfig::builder()
    ///     .cities(vec!["Reykjavík".to_string(), "Lhasa".to_string()])
    ///     .build();
    /// let insights = WeatherInsights::new(config)?;
    ///
    /// let tables = insights
    ///     .run()
    ///     .run_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
    ///     .call()
    ///     .await?;
    /// println!("{} location(s) selected", tables.len());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn run(
        &self,
        run_date: Option<NaiveDate>,
    ) -> Result<WeatherTables, WeatherInsightsError> {
        let run_date = run_date.unwrap_or_else(|| Local::now().date_naive());
        let config = &self.config;
        info!(
            "Running weather insights for {} cities on {}",
            config.cities.len(),
            run_date
        );

        let cities = resolve_cities(self.geocoder.as_ref(), &config.cities).await?;
        let observations = fetch_forecast_window(self.source.as_ref(), config, &cities).await?;

        let settings = AggregationSettings {
            temperature_field: config.temperature_field.clone(),
            average_temp_threshold: config.average_temp_threshold,
            elevation_threshold: config.elevation_threshold,
        };
        let aggregated = aggregate_windows(observations, &settings, run_date)?;
        if aggregated.height() == 0 {
            info!("No location passed the selection gate, skipping the historical snapshot");
            return WeatherTables::empty();
        }

        let enriched = append_historical(self.source.as_ref(), config, aggregated)
            .await?
            .lazy()
            .sort_by_exprs(
                [col(LATITUDE), col(LONGITUDE)],
                SortMultipleOptions::default(),
            )
            .collect()?;
        let tables = split_output(&enriched)?;
        info!("Produced {} weather insight(s)", tables.len());
        Ok(tables)
    }

    /// Appends both tables to `sink` under the configured table names.
    pub async fn load(
        &self,
        tables: &WeatherTables,
        sink: &dyn RecordSink,
    ) -> Result<(), WeatherInsightsError> {
        sink.append(&self.config.cities_table, &tables.cities).await?;
        sink.append(&self.config.insights_table, &tables.insights)
            .await?;
        Ok(())
    }
}
