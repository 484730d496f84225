use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

const TABS_DIR: &str = "tabs";

/// `(name, source)` for every `tabs/**/*.json`, sorted by name.
///
/// A tab is named by its path relative to `tabs/` without the extension, so
/// `tabs/tempo-change.json` is `tempo-change`.
fn collect_tabs(root: &Path) -> Vec<(String, String)> {
    let mut tabs = Vec::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let Ok(content) = fs::read_to_string(path) else {
            continue;
        };
        let name = relative.with_extension("").to_string_lossy().replace('\\', "/");
        tabs.push((name, content));
    }

    tabs.sort();
    tabs
}

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("tabs.rs");

    let mut code = String::from("/// Embedded demo tabs as (name, source)\n");
    code.push_str("pub static TABS: &[(&str, &str)] = &[\n");
    for (name, content) in collect_tabs(Path::new(TABS_DIR)) {
        // Debug formatting yields a valid Rust string literal
        code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
    }
    code.push_str("];\n");

    fs::write(&dest_path, code).expect("failed to write embedded tab table");

    println!("cargo:rerun-if-changed={}", TABS_DIR);
}
