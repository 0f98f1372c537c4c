use interfaces::defs::NewRelevantItem;

/// Subject line: the paper's title for a single item, a count otherwise.
pub fn compose_subject(items: &[NewRelevantItem]) -> String {
    match items {
        [only] => format!("New arXiv paper: {}", only.item.title.trim()),
        _ => format!("{} new arXiv papers", items.len()),
    }
}

/// Plain-text body listing title, publication date and link for each item.
/// Abstracts are left out to keep the message short.
pub fn compose_body(items: &[NewRelevantItem]) -> String {
    let mut body = format!("{} newly discovered relevant paper(s):\n\n", items.len());

    for (i, new_item) in items.iter().enumerate() {
        let item = &new_item.item;
        let date = item
            .published_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown date".to_string());

        body.push_str(&format!("{}. {}\n", i + 1, item.title.trim()));
        body.push_str(&format!("   Published: {}\n", date));
        body.push_str(&format!("   Link: {}\n\n", item.permalink()));
    }

    body
}
