mod backend;
mod config;
mod error;
mod library;
mod logging;
mod mpris;
mod notify;
mod player;
mod runtime;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
