use std::fmt::Display;
use std::time::Duration;

use tracing::{info, warn};

/// Run `op` over `items` one at a time, sleeping `delay` between calls.
/// A failed item is recorded and the batch moves on; `on_item` sees every
/// result as it lands.
pub fn run_sequential<T, R, E, F, P>(
    items: &[T],
    delay: Duration,
    mut op: F,
    mut on_item: P,
) -> Vec<Result<R, E>>
where
    E: Display,
    F: FnMut(&T) -> Result<R, E>,
    P: FnMut(usize, &T, &Result<R, E>),
{
    let mut results = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let result = op(item);
        match &result {
            Ok(_) => info!(index = i, total = items.len(), "batch item done"),
            Err(e) => warn!(index = i, total = items.len(), error = %e, "batch item failed"),
        }
        on_item(i, item, &result);
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn failure_does_not_stop_the_batch() {
        let items = [1, 2, 3, 4];
        let mut seen = Vec::new();
        let results = run_sequential(
            &items,
            Duration::ZERO,
            |n| if *n == 2 { Err(format!("item {} broke", n)) } else { Ok(n * 10) },
            |i, _, _| seen.push(i),
        );
        assert_eq!(seen, [0, 1, 2, 3]);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0], Ok(10));
        assert_eq!(results[1], Err("item 2 broke".to_string()));
        assert_eq!(results[3], Ok(40));
    }

    #[test]
    fn delay_applies_between_items_only() {
        let items = ["a", "b", "c"];
        let start = Instant::now();
        let results = run_sequential(
            &items,
            Duration::from_millis(20),
            |s| Ok::<_, String>(s.len()),
            |_, _, _| {},
        );
        assert_eq!(results.len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
