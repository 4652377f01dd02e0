use std::net::TcpListener;

use tracing::{error, info};

use yanews::database::init_sqlite_connection;
use yanews::settings::{LoggingSettings, Settings};
use yanews::startup::{startup, AppState};
use yanews::{fixtures, observability};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init dotenv
    dotenvy::dotenv().ok();

    let logging = LoggingSettings::from_env("info");
    let subscriber = observability::get_subscriber("yanews", &logging);
    observability::init_subscriber(subscriber);

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let database = init_sqlite_connection(&settings.database_url).await?;
    let listener = TcpListener::bind(&settings.listen_on)?;
    let state = AppState::new(database, settings)?;

    if let Some(path) = state.settings.fixtures.clone() {
        fixtures::load_news(&state.news, &path).await?;
    }

    info!("Listening on {}", listener.local_addr()?);
    startup(state, listener).await?;

    Ok(())
}
