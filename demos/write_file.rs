use mmio::{MapSize, MappedFileSink};
use std::env;

fn main() -> mmio::Result<()> {
    env_logger::init();
    let path = env::args_os()
        .nth(1)
        .unwrap_or_else(|| "mmio-demo.txt".into());
    let text = env::args()
        .nth(2)
        .unwrap_or_else(|| String::from("written through a memory mapping\n"));

    let mut file = MappedFileSink::open(&path, MapSize::Exact(text.len()))?;
    file.copy_from_slice(text.as_bytes());
    file.flush()?;
    println!("wrote {} bytes to {}", file.len(), path.to_string_lossy());
    Ok(())
}
