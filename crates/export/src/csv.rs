use std::borrow::Cow;

use chrono::{DateTime, Utc};

use stockline_core::ProductId;
use stockline_orders::Order;

const HEADER: &str = "ID,Product,Quantity,Status,Shipped At,Created At";

/// Render orders as CSV, one row per order in the given sequence.
///
/// `product_name` resolves a product reference to its display name; when it
/// cannot (a row referencing a product the caller did not load), the raw id
/// is rendered instead so the row is still attributable. An unshipped order
/// leaves the `Shipped At` column empty.
pub fn orders_to_csv<F>(orders: &[Order], product_name: F) -> String
where
    F: Fn(ProductId) -> Option<String>,
{
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\r\n");

    for order in orders {
        let product =
            product_name(order.product_id).unwrap_or_else(|| order.product_id.to_string());
        let shipped_at = order.shipped_at.map(render_timestamp).unwrap_or_default();

        out.push_str(&escape(&order.id.to_string()));
        out.push(',');
        out.push_str(&escape(&product));
        out.push(',');
        out.push_str(&order.quantity.to_string());
        out.push(',');
        out.push_str(order.status.as_str());
        out.push(',');
        out.push_str(&escape(&shipped_at));
        out.push(',');
        out.push_str(&escape(&render_timestamp(order.created_at)));
        out.push_str("\r\n");
    }

    out
}

/// `YYYY-MM-DD HH:MM:SS+00:00`, the format the previous exports used.
fn render_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}

/// RFC 4180 quoting: fields containing a comma, quote or line break are
/// wrapped in quotes, with embedded quotes doubled.
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains(&['"', ',', '\n', '\r'][..]) {
        let mut quoted = String::with_capacity(field.len() + 2);
        quoted.push('"');
        for c in field.chars() {
            if c == '"' {
                quoted.push('"');
            }
            quoted.push(c);
        }
        quoted.push('"');
        Cow::Owned(quoted)
    } else {
        Cow::Borrowed(field)
    }
}
