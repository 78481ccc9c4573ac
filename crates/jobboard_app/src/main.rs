mod app;
mod command;
mod config;
mod effects;
mod logging;
mod persist;
mod render;
mod session;

fn main() -> anyhow::Result<()> {
    app::run()
}
