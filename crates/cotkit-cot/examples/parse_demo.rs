use cotkit_cot::{parse_cot, try_parse_cot, validate_event};

fn main() {
    let cot_xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<event version="2.0" uid="ANDROID-12345678" type="a-f-G" time="2024-01-15T10:30:00Z" start="2024-01-15T10:30:00Z" stale="2024-01-15T10:35:00Z" how="h-e">
    <point lat="37.7749" lon="-122.4194" hae="100.0" ce="10.0" le="5.0"/>
    <detail>
        <contact callsign="Alpha-1"/>
        <__group name="Cyan" role="Team Member"/>
        <remarks>Friendly unit in San Francisco</remarks>
    </detail>
</event>"#;

    println!("Parsing CoT message...\n");

    let event = parse_cot(cot_xml);
    println!("  UID: {}", event.uid);
    println!("  Type: {}", event.event_type);
    println!("  Version: {}", event.version);
    println!("  Time: {}", event.time);
    println!("  Location: {:.4}, {:.4}", event.point.lat, event.point.lon);
    match event.point.altitude() {
        Some(hae) => println!("  Altitude: {:.1}m HAE", hae),
        None => println!("  Altitude: unknown"),
    }

    if let Some(detail) = &event.detail {
        println!("\nDetail tree:");
        for (depth, node) in detail.walk() {
            let attrs: Vec<String> = node
                .attributes()
                .iter()
                .map(|a| format!("{}={:?}", a.name, a.value))
                .collect();
            println!(
                "  {}<{}> {} {}",
                "  ".repeat(depth),
                node.name(),
                attrs.join(" "),
                node.inner_text().unwrap_or_default()
            );
        }
    }

    println!("\nValidating event...");
    match validate_event(&event) {
        Ok(_) => println!("  Event is valid"),
        Err(e) => println!("  Validation error: {}", e),
    }

    println!("\nParsing a message without a uid...");
    match try_parse_cot(r#"<event type="a-f-G"><point lat="0" lon="0"/></event>"#) {
        Ok(event) => println!("  Unexpectedly accepted: {:?}", event.uid),
        Err(e) => println!("  Rejected: {}", e),
    }
}
