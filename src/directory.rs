use std::path::{Path, PathBuf};

pub const OUTPUT_EXTENSION: &str = "dds";

/// Where a record called `name` is written under `root`.
///
/// Record names use either `\` or `/` as separator. Empty, `.` and `..`
/// components are dropped so nothing lands outside of `root`.
pub fn output_path(root: &Path, name: &str) -> PathBuf {
    let components: Vec<&str> = name
        .split(&['\\', '/'][..])
        .filter(|c| !matches!(*c, "" | "." | ".."))
        .collect();

    let mut path = root.to_path_buf();
    match components.split_last() {
        Some((file_name, dirs)) => {
            path.extend(dirs);
            path.push(format!("{file_name}.{OUTPUT_EXTENSION}"));
        }
        None => path.push(format!("unnamed.{OUTPUT_EXTENSION}")),
    }

    path
}
