use mmio::{ErrorKind, MapSize, MappedFileSource};
use std::{env, process};

fn main() {
    env_logger::init();
    let Some(path) = env::args_os().nth(1) else {
        eprintln!("usage: map_file <path> [len]");
        process::exit(2);
    };
    let size = match env::args().nth(2).map(|len| len.parse::<usize>()) {
        Some(Ok(len)) => MapSize::Exact(len),
        Some(Err(err)) => {
            eprintln!("invalid length: {err}");
            process::exit(2);
        }
        None => MapSize::Dynamic,
    };

    let mut file = MappedFileSource::new();
    let result = file.try_open(&path, size);
    if let Some(err) = result.error() {
        let name = path.to_string_lossy();
        match err.kind() {
            ErrorKind::NotFound => eprintln!("{name}: no such file"),
            ErrorKind::PermissionDenied => eprintln!("{name}: permission denied"),
            _ => eprintln!("{name}: {err}"),
        }
        process::exit(1);
    }

    let lines = file.iter().filter(|&&b| b == b'\n').count();
    let checksum = file
        .iter()
        .fold(0u32, |acc, &b| acc.rotate_left(5) ^ b as u32);
    println!("{} bytes, {} lines, checksum {:08x}", file.len(), lines, checksum);
}
