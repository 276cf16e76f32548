/// Example: Load an OBJ file and print what the loader produced
///
/// Usage: cargo run --example load_obj -- path/to/file.obj [--strict]

use objview_core::{LoadOptions, Transform};
use std::env;
use std::io;

fn main() -> io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let Some(path) = args.get(1) else {
        eprintln!("Usage: {} <obj-file> [--strict]", args[0]);
        return Ok(());
    };
    let options = if args.iter().any(|a| a == "--strict") {
        LoadOptions::strict()
    } else {
        LoadOptions::default()
    };

    let mut mesh = objview_core::load_with(path, &options)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    println!("{}: {} vertices, {} edges", path, mesh.vertex_count(), mesh.edge_count());
    if let Some(bounds) = mesh.bounds() {
        println!("normalized bounds: {:?} .. {:?}", bounds.min, bounds.max);
    }

    Transform::center(&mut mesh);
    Transform::rotate(&mut mesh, 30.0, 45.0, 0.0);
    for (index, vertex) in mesh.vertices().take(8).enumerate() {
        println!("  v{}: {:>8.4} {:>8.4} {:>8.4}", index, vertex.x, vertex.y, vertex.z);
    }

    Ok(())
}
