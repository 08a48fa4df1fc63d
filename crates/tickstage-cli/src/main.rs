mod cli;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use tickstage_core::{
    CommandConverter, ConsoleSink, DataLayout, DatasetConverter, DateRange, DayConverter,
    HttpClient, InstrumentSpec, NoopConverter, NoopHttpClient, Pipeline, ProgressSink, RawFetcher,
    ReqwestHttpClient, RetryPolicy, Symbol, VendorConfig,
};

use crate::cli::Cli;
use crate::error::CliError;

// Single scheduler thread: the conversion retry wait stalls the whole
// pipeline, including the in-flight fetch.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let symbol = Symbol::parse(&cli.symbol)?;
    let range = DateRange::parse(&cli.start_date, &cli.end_date)?;
    let instrument = InstrumentSpec::new(cli.tick_size, cli.lot_size)?;

    let layout = DataLayout::new(&cli.data_dir);
    let progress: Arc<dyn ProgressSink> = Arc::new(ConsoleSink);

    let http: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let converter: Arc<dyn DatasetConverter> = if cli.mock {
        Arc::new(NoopConverter)
    } else {
        Arc::new(CommandConverter::from_env())
    };

    let fetcher = Arc::new(RawFetcher::new(
        http,
        VendorConfig::from_env(),
        layout.clone(),
        Arc::clone(&progress),
    ));
    let day_converter = DayConverter::new(layout, converter, RetryPolicy::default(), progress);

    Pipeline::new(fetcher, day_converter)
        .run(cli.exchange.to_exchange(), symbol, range, instrument)
        .await?;

    Ok(())
}
