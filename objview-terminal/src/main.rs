/// objview - terminal wireframe viewer
///
/// Loads an OBJ file (or a unit cube) and draws it as ASCII wireframe.
/// Run with `--help` for the key bindings.
use clap::Parser;
use objview_core::Mesh;
use objview_terminal::{TerminalApp, ViewerConfig};
use std::io;

fn main() -> io::Result<()> {
    env_logger::init();
    let config = ViewerConfig::parse();

    let mesh = match &config.path {
        Some(path) => objview_core::load_with(path, &config.load_options())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => {
            log::info!("no model given, showing the unit cube");
            Mesh::cube()
        }
    };

    let mut app = TerminalApp::new(mesh, config)?;
    app.run()
}
