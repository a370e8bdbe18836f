use log::{debug, warn};
use pagecraft_sections::{html, validator, ListCache, Page, SectionsError};
use std::env;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let emit_html = args.iter().any(|a| a == "--html");
    let files: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    if files.is_empty() {
        eprintln!("Usage: pagecraft-render [--html] <page.json|page.yaml>...");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  pagecraft-render home.json");
        eprintln!("  pagecraft-render --html about.yaml > about.html");
        process::exit(1);
    }

    let mut exit_code = 0;

    for file_path in files {
        match load_file(file_path) {
            Ok(page) => {
                eprintln!("✓ {} is valid ({} sections)", file_path, page.content.len());
                for warning in validator::page_warnings(&page) {
                    eprintln!("  warning: {}", warning);
                }
                if emit_html {
                    match html::page_to_html(&page, &ListCache::new()) {
                        Ok(document) => print!("{}", document),
                        Err(e) => {
                            eprintln!("✗ {} could not be rendered:", file_path);
                            print_error(&e);
                            exit_code = 1;
                        }
                    }
                }
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file_path);
                print_error(&e);
                exit_code = 1;
            }
        }
    }

    process::exit(exit_code);
}

fn load_file(path: &str) -> Result<Page, SectionsError> {
    let content = fs::read_to_string(path)
        .map_err(|e| SectionsError::ValidationError(format!("Failed to read file: {}", e)))?;

    let is_yaml = matches!(
        Path::new(path).extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    debug!("loading {} as {}", path, if is_yaml { "yaml" } else { "json" });

    let page = if is_yaml {
        Page::from_yaml(&content)?
    } else {
        Page::from_json(&content)?
    };
    validator::validate_page(&page)?;

    let raw = page.content.iter().filter(|s| s.kind().is_none()).count();
    if raw > 0 {
        warn!("{}: {} section(s) of unknown type will render as diagnostics", path, raw);
    }
    Ok(page)
}

fn print_error(error: &SectionsError) {
    match error {
        SectionsError::ValidationError(msg) => {
            eprintln!("  Validation error:");
            eprintln!("    {}", msg);
        }
        SectionsError::DuplicateSectionId { id } => {
            eprintln!("  Duplicate section id '{}'", id);
            eprintln!("    Section ids must be unique within a page");
        }
        SectionsError::DuplicateBlockId { section, id } => {
            eprintln!("  Duplicate block id '{}' in section '{}'", id, section);
        }
        SectionsError::JsonError(msg) => {
            eprintln!("  JSON error:");
            eprintln!("    {}", msg);
        }
        SectionsError::YamlError(msg) => {
            eprintln!("  YAML error:");
            eprintln!("    {}", msg);
        }
        e => {
            eprintln!("  {}", e);
        }
    }
}
