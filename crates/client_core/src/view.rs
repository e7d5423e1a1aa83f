//! Plain-text rendering of the product table and edit forms.

use shared::protocol::{NewProduct, Product};

const HEADERS: [&str; 5] = ["Name", "Description", "Price", "Quantity", "Id"];

fn row_cells(product: &Product) -> [String; 5] {
    [
        product.name.clone(),
        product.description.clone(),
        format!("${}", product.price),
        product.quantity.to_string(),
        product.id.to_string(),
    ]
}

pub fn render_table(products: &[Product]) -> String {
    if products.is_empty() {
        return "(no products)\n".to_string();
    }

    let rows: Vec<[String; 5]> = products.iter().map(row_cells).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS.iter().map(|h| h.to_string()), &widths);
    push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
    for row in rows {
        push_line(&mut out, row.into_iter(), &widths);
    }
    out
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>, widths: &[usize; 5]) {
    let line = cells
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn render_draft(draft: &NewProduct) -> String {
    format!(
        "name={:?} description={:?} price={} quantity={}",
        draft.name, draft.description, draft.price, draft.quantity
    )
}

pub fn render_edit(product: &Product) -> String {
    format!("[{}] {}", product.id, render_draft(&product.to_new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::ProductId;

    fn product(id: &str, name: &str, price: f64, quantity: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.into(),
            description: String::new(),
            price,
            quantity,
        }
    }

    #[test]
    fn empty_list_renders_placeholder() {
        assert_eq!(render_table(&[]), "(no products)\n");
    }

    #[test]
    fn rows_follow_list_order_with_dollar_prices() {
        let table = render_table(&[product("2", "B", 5.0, 1), product("1", "Alpha", 10.5, 2)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name  | Description | Price"));
        assert!(lines[2].starts_with("B "));
        assert!(lines[2].contains("$5"));
        assert!(lines[3].starts_with("Alpha"));
        assert!(lines[3].contains("$10.5"));
    }

    #[test]
    fn nan_price_renders_like_a_number_field() {
        let table = render_table(&[product("9", "X", f64::NAN, 0)]);
        assert!(table.contains("$NaN"));
    }
}
