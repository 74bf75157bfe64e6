/// Quickstart example - the simplest possible usage
use serde_json::json;
use std::fs;
use xml2csv::{xml_to_csv, Output};

fn main() -> anyhow::Result<()> {
    println!("=== xml2csv Quick Start ===\n");

    let workdir = std::env::temp_dir().join("xml2csv-quickstart");
    fs::create_dir_all(&workdir)?;

    // Step 1: An XML document
    let catalog = r#"<catalog>
  <item sku="A-1"><name>Pen</name><price>10</price><size><w>1</w><h>14</h></size></item>
  <item sku="B-2"><name>Ink</name><price>20</price></item>
  <item sku="C-3"><name>Pad</name><price>30</price></item>
</catalog>"#;
    fs::write(workdir.join("catalog.xml"), catalog)?;

    // Step 2: A specification - one parent group, four columns
    let spec = json!({
        "input_file": "catalog.xml",
        "root": {
            "parent": [{
                "tag_name": "item",
                "name": "items",
                "children": [
                    {"xpath": "@sku", "name": "sku"},
                    {"xpath": "name"},
                    {"xpath": "price"},
                    {"xpath": "size"}
                ]
            }]
        }
    });
    fs::write(workdir.join("specs.json"), serde_json::to_string_pretty(&spec)?)?;
    println!("Specification:");
    println!("{}\n", serde_json::to_string_pretty(&spec)?);

    // Step 3: Print the rows
    println!("Rows:");
    xml_to_csv(&workdir, Output::Print)?;

    // Step 4: Write them as CSV
    let report = xml_to_csv(&workdir, Output::Csv { dir: workdir.clone() })?;
    println!("\n✓ Done! {} rows written to {}", report.rows_written(), workdir.display());

    Ok(())
}
