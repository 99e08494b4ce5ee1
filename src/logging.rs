use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Route `log` output to `path`, filtered by `RUST_LOG` (default `warn`).
///
/// Returns false when the file cannot be opened; logging then stays off.
pub fn init(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
