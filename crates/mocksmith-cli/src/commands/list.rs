use std::path::Path;

use mocksmith::discover::{declaration_files, load_contracts};
use mocksmith::model::Contract;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListFormat {
    Text,
    Json,
}

impl ListFormat {
    fn parse(s: &str) -> Result<Self, String> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}', expected 'text' or 'json'")),
        }
    }
}

pub fn run(dir: &Path, recursive: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = ListFormat::parse(format)?;
    let files = declaration_files(dir, recursive)?;
    let loaded = load_contracts(&files);

    match format {
        ListFormat::Text => render_text(&loaded.contracts),
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&loaded.contracts))?),
    }
    for skipped in &loaded.skipped {
        eprintln!("skipped: {skipped}");
    }
    if loaded.skipped.is_empty() {
        Ok(())
    } else {
        Err(format!("{} declaration file(s) could not be loaded", loaded.skipped.len()).into())
    }
}

fn render_text(contracts: &[Contract]) {
    for c in contracts {
        println!("{} ({}, {} methods)", c.name, c.package.path, c.methods.len());
        for m in &c.methods {
            println!("  {}", m.name);
        }
    }
    println!("\n{} interface(s)", contracts.len());
}

fn to_json(contracts: &[Contract]) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = contracts
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "package": c.package.path,
                "source": c.source.as_ref().map(|p| p.display().to_string()),
                "methods": c.methods.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mocksmith::model::{Method, Package};

    #[test]
    fn format_parses() {
        assert_eq!(ListFormat::parse("json").unwrap(), ListFormat::Json);
        assert!(ListFormat::parse("yaml").is_err());
    }

    #[test]
    fn json_lists_methods_in_order() {
        let c = Contract::new("Store", Package::from_path("example.com/store"))
            .method(Method::new("Get"))
            .method(Method::new("Put"));
        let value = to_json(&[c]);
        assert_eq!(value[0]["name"], "Store");
        assert_eq!(value[0]["package"], "example.com/store");
        assert_eq!(value[0]["methods"], serde_json::json!(["Get", "Put"]));
        assert!(value[0]["source"].is_null());
    }
}
