use anthro_etl::{cli, errors::AppResult, logging};

fn main() -> AppResult<()> {
    logging::init_logging();
    cli::cli()
}
