use super::types::MenuItem;

/// Flatten per-shop items in shop order and sort by price.
///
/// The sort is stable, so equal prices keep discovery order. Items are never
/// merged across shops.
pub fn aggregate(per_shop: Vec<Vec<MenuItem>>) -> Vec<MenuItem> {
    let mut items: Vec<MenuItem> = per_shop.into_iter().flatten().collect();
    items.sort_by(|a, b| a.price.total_cmp(&b.price));
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(shop: &str, name: &str, price: f64) -> MenuItem {
        MenuItem {
            shop_name: shop.to_string(),
            shop_url: format!("https://wolt.com/restaurant/{shop}"),
            item_name: name.to_string(),
            price,
            price_is_placeholder: false,
        }
    }

    #[test]
    fn test_aggregate_sorts_and_keeps_ties_in_order() {
        let result = aggregate(vec![
            vec![item("a", "gyros", 3.5), item("a", "pita", 2.0)],
            vec![item("b", "gyros", 3.5), item("b", "fries", 1.5)],
        ]);

        let order: Vec<_> = result
            .iter()
            .map(|i| format!("{}:{}", i.shop_name, i.item_name))
            .collect();
        assert_eq!(order, vec!["b:fries", "a:pita", "a:gyros", "b:gyros"]);
    }

    #[test]
    fn test_aggregate_keeps_duplicates_across_shops() {
        let result = aggregate(vec![vec![item("a", "gyros", 3.0)], vec![item("b", "gyros", 3.0)]]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(Vec::new()).is_empty());
    }
}
