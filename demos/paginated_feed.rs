/// Example: Reading a large feed one page at a time
/// Each run takes a window of matches, as a scheduled export would.
use std::fmt::Write as _;
use std::fs;
use xml2csv::{Converter, FieldSpec, ParentGroup, Specification};

fn main() -> anyhow::Result<()> {
    println!("=== Paginating a Feed ===\n");

    let workdir = std::env::temp_dir().join("xml2csv-paginated");
    fs::create_dir_all(&workdir)?;

    // A namespaced feed with 25 orders, every third one flagged
    let mut feed = String::from(r#"<feed xmlns="urn:example:orders">"#);
    for id in 1..=25 {
        let status = if id % 3 == 0 { "flagged" } else { "ok" };
        write!(
            feed,
            "<order id=\"{id}\"><status>{status}</status><total>{}.00</total></order>",
            id * 10
        )?;
    }
    feed.push_str("</feed>");
    let input = workdir.join("orders.xml");
    fs::write(&input, feed)?;

    let base = Specification {
        input_file: input,
        namespace: Some("urn:example:orders".to_string()),
        groups: vec![ParentGroup {
            tag_name: Some("order".to_string()),
            name: Some("orders".to_string()),
            children: vec![
                FieldSpec::new("@id").with_name("id"),
                FieldSpec::new("status"),
                FieldSpec::new("total"),
            ],
        }],
        start_from: 1,
        max_count: None,
    };
    let document = fs::read(&base.input_file)?;

    // Pages of 10 orders
    for page in 0..3u64 {
        let start = page * 10 + 1;
        let spec = base.clone().with_window(Some(start), Some(10))?;
        let tables = Converter::new(spec).tables_from_reader(document.as_slice())?;

        println!("Page {} (from order #{}): {} rows", page + 1, start, tables[0].rows.len());
        for row in &tables[0].rows {
            println!(
                "  order {:>2}  {:<8} {}",
                row.get("id").unwrap_or("?"),
                row.get("status").unwrap_or("?"),
                row.get("total").unwrap_or("?")
            );
        }
    }

    // Skipped matches are counted before the filter, the limit after it:
    // from order #10 on, the first 3 flagged orders
    let mut flagged = base.clone();
    flagged.groups[0].children[1] = FieldSpec::new("status").with_filter(["FLAGGED"]);
    let flagged = flagged.with_window(Some(10), Some(3))?;
    let tables = Converter::new(flagged).tables_from_reader(document.as_slice())?;

    println!("\nFlagged orders from #10:");
    for row in &tables[0].rows {
        println!("  order {}", row.get("id").unwrap_or("?"));
    }

    Ok(())
}
