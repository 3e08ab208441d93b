//! Plain-text rendering for terminal output.

use product_compare_catalog::{ComparisonView, Notice, NoticeLevel};
use product_compare_core::Product;

const TITLE_WIDTH: usize = 36;
const LABEL_WIDTH: usize = 12;
const COLUMN_WIDTH: usize = 26;

/// Write rendered output to stdout.
#[allow(clippy::print_stdout)]
pub fn print(text: &str) {
    println!("{text}");
}

/// One line per notice, marked by level.
pub fn notice(notice: &Notice) -> String {
    let marker = match notice.level() {
        NoticeLevel::Success => "ok",
        NoticeLevel::Warning => "!!",
    };
    format!("[{marker}] {notice}")
}

/// Catalog listing: one row per product.
pub fn product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products.".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<TITLE_WIDTH$}  {:<16}  {:<16}  {:>10}\n",
        "ID", "Title", "Brand", "Category", "Price"
    );
    for product in products {
        out.push_str(&format!(
            "{:>5}  {:<TITLE_WIDTH$}  {:<16}  {:<16}  {:>10}\n",
            product.id.to_string(),
            truncate(&product.title, TITLE_WIDTH),
            truncate(or_dash(&product.brand), 16),
            truncate(or_dash(&product.category), 16),
            product.price.to_string(),
        ));
    }
    out.pop();
    out
}

/// Single product detail.
pub fn product_detail(product: &Product) -> String {
    let mut out = format!("#{} {}\n", product.id, product.title);
    out.push_str(&format!("  Price:    {}\n", product.price));
    out.push_str(&format!("  Brand:    {}\n", or_dash(&product.brand)));
    out.push_str(&format!("  Category: {}\n", or_dash(&product.category)));
    if !product.description.is_empty() {
        out.push_str(&format!("\n  {}\n", product.description));
    }
    out.pop();
    out
}

/// Side-by-side comparison grid. Unresolved selections are listed below it.
pub fn comparison(view: &ComparisonView) -> String {
    let rows: [(&str, fn(&Product) -> String); 5] = [
        ("Product", |p| p.title.clone()),
        ("Price", |p| p.price.to_string()),
        ("Brand", |p| or_dash(&p.brand).to_string()),
        ("Category", |p| or_dash(&p.category).to_string()),
        ("Description", |p| or_dash(&p.description).to_string()),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{label:<LABEL_WIDTH$}"));
        for product in &view.products {
            out.push_str(&format!(
                " | {:<COLUMN_WIDTH$}",
                truncate(&value(product), COLUMN_WIDTH)
            ));
        }
        out.push('\n');
    }

    if !view.pending.is_empty() {
        let ids: Vec<String> = view.pending.iter().map(ToString::to_string).collect();
        out.push_str(&format!("\nNot loaded: {}\n", ids.join(", ")));
    }
    out.pop();
    out
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

/// Cut `text` to at most `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
