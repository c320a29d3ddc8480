mod action;
mod app;
mod error;
mod ledger;
mod models;
mod state;
mod storage;
mod tui;

use app::App;

fn main() -> error::Result<()> {
    let mut app = App::new(storage::DEFAULT_DATA_FILE)?;
    app.run()?;
    Ok(())
}
