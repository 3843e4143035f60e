mod app;
mod audio;
mod binder;
mod catalog;
mod config;
mod donation;
mod error;
mod mpris;
mod remote;
mod runtime;
mod session;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
